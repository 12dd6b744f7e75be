// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Request validation.
//!
//! Raw request bodies from [`quickcare_common`] are turned into validated
//! forms here, before anything reaches the credential service. The service
//! only ever sees a normalized [`Identifier`] and a [`Secret`].

use quickcare_common::{LoginRequest, Role, SignupRequest};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;
use zeroize::Zeroizing;

pub const MAX_IDENTIFIER_LENGTH: usize = 64;
pub const MAX_SECRET_LENGTH: usize = 128;

// Checked after case folding
static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9._@-]*$").unwrap());

/// Possible validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid secret: {0}")]
    InvalidSecret(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Case-folded account identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Trim, lowercase and check an identifier
    pub fn parse(raw: &str) -> ValidationResult<Self> {
        let folded = raw.trim().to_lowercase();

        if folded.is_empty() {
            return Err(ValidationError::MissingField("identifier"));
        }

        if folded.chars().count() > MAX_IDENTIFIER_LENGTH {
            return Err(ValidationError::InvalidIdentifier(format!(
                "must be at most {MAX_IDENTIFIER_LENGTH} characters"
            )));
        }

        if !IDENTIFIER_REGEX.is_match(&folded) {
            return Err(ValidationError::InvalidIdentifier(
                "must start with a letter or digit and contain only letters, digits, '.', '_', '@' or '-'"
                    .to_string(),
            ));
        }

        Ok(Self(folded))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Plaintext secret, wiped from memory on drop
#[derive(Clone)]
pub struct Secret(Zeroizing<String>);

impl Secret {
    pub fn parse(raw: String) -> ValidationResult<Self> {
        let secret = Zeroizing::new(raw);

        if secret.is_empty() {
            return Err(ValidationError::MissingField("secret"));
        }

        if secret.len() > MAX_SECRET_LENGTH {
            return Err(ValidationError::InvalidSecret(format!(
                "must be at most {MAX_SECRET_LENGTH} bytes"
            )));
        }

        Ok(Self(secret))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Validated signup request
#[derive(Debug, Clone)]
pub struct SignupForm {
    pub identifier: Identifier,
    pub secret: Secret,
    pub role: Role,
}

/// Validated login request
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub identifier: Identifier,
    pub secret: Secret,
}

impl SignupForm {
    pub fn new(identifier: &str, secret: &str, role: &str) -> ValidationResult<Self> {
        validate_signup(SignupRequest {
            identifier: Some(identifier.to_string()),
            secret: Some(secret.to_string()),
            role: Some(role.to_string()),
        })
    }
}

impl LoginForm {
    pub fn new(identifier: &str, secret: &str) -> ValidationResult<Self> {
        validate_login(LoginRequest {
            identifier: Some(identifier.to_string()),
            secret: Some(secret.to_string()),
        })
    }
}

fn required(field: Option<String>, name: &'static str) -> ValidationResult<String> {
    field.ok_or(ValidationError::MissingField(name))
}

/// Parse a role name
pub fn validate_role(role: &str) -> ValidationResult<Role> {
    if role.trim().is_empty() {
        return Err(ValidationError::MissingField("role"));
    }
    role.parse()
        .map_err(|e: quickcare_common::UnknownRole| ValidationError::InvalidRole(e.to_string()))
}

/// Validate a signup body
pub fn validate_signup(req: SignupRequest) -> ValidationResult<SignupForm> {
    let identifier = Identifier::parse(&required(req.identifier, "identifier")?)?;
    let secret = Secret::parse(required(req.secret, "secret")?)?;
    let role = validate_role(&required(req.role, "role")?)?;

    Ok(SignupForm {
        identifier,
        secret,
        role,
    })
}

/// Validate a login body
pub fn validate_login(req: LoginRequest) -> ValidationResult<LoginForm> {
    let identifier = Identifier::parse(&required(req.identifier, "identifier")?)?;
    let secret = Secret::parse(required(req.secret, "secret")?)?;

    Ok(LoginForm { identifier, secret })
}
