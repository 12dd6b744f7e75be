// ================
// common/src/lib.rs
// ================
//! Wire types shared between the `QuickCare` auth server and its clients.
//!
//! Request bodies keep every field optional so that a missing field is
//! reported as invalid input by the server instead of a deserialization
//! failure. Both the current field names (`identifier`, `secret`) and the
//! legacy form names (`username`, `password`) are accepted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Capability class of an account
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular patient account
    #[default]
    User,
    /// Doctor account
    Doctor,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Doctor => "doctor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names neither role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role `{}`, expected `user` or `doctor`", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "doctor" => Ok(Role::Doctor),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// Body of `POST /api/auth/signup`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SignupRequest {
    #[serde(default, alias = "username")]
    pub identifier: Option<String>,
    #[serde(default, alias = "password")]
    pub secret: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Body of `POST /api/auth/login`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LoginRequest {
    #[serde(default, alias = "username")]
    pub identifier: Option<String>,
    #[serde(default, alias = "password")]
    pub secret: Option<String>,
}

/// Public view of an account, never carries credential material
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AccountSummary {
    pub identifier: String,
    pub role: Role,
}

/// Reply to a successful signup or login
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionResponse {
    pub message: String,
    pub user: AccountSummary,
    pub token: String,
}

/// Error envelope returned by every failing endpoint
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}
