// ============================
// backend-lib/src/auth/token_generator.rs
// ============================
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
/** Secure token generation for authentication
This module provides cryptographically secure opaque bearer tokens
for login sessions. */
use rand::RngCore;

/// Token size in bytes (32 bytes = 256 bits of entropy)
const TOKEN_BYTES: usize = 32;

/// Length of an encoded token: 32 bytes in unpadded base64
pub const TOKEN_LEN: usize = 43;

/** Generate a cryptographically secure random session token
# Returns
A base64 URL-safe encoded string without padding, `TOKEN_LEN` chars long */
pub fn generate_session_token() -> String {
    let mut buffer = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}

/// Cheap shape check run before any session lookup
pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
