// ============================
// backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
use crate::config::HashingSettings;
use scrypt::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Params, Scrypt,
};

/// Length of the derived key stored in the PHC string
const OUTPUT_LEN: usize = 32;

/// Hash a password using scrypt with a fresh random salt
pub fn hash_password(plain: &str, cost: &HashingSettings) -> anyhow::Result<String> {
    let params = Params::new(cost.log_n, cost.r, cost.p, OUTPUT_LEN)
        .map_err(|e| anyhow::anyhow!("invalid scrypt parameters: {e}"))?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt
        .hash_password_customized(plain.as_bytes(), None, None, params, &salt)?
        .to_string();
    Ok(hash)
}

/// Verify a password against a PHC hash string.
///
/// The scrypt parameters are read back from the hash itself, so hashes made
/// under older cost settings keep verifying. A malformed hash never matches.
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
}
