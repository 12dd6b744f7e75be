// =============
// backend-lib/src/auth/service.rs
// =============
//! The `CredentialService` trait: signup, login and session checks.
use super::session::IssuedSession;
use crate::error::AppError;
use crate::validation::{LoginForm, SignupForm};
use async_trait::async_trait;
use quickcare_common::AccountSummary;

#[async_trait]
pub trait CredentialService: Send + Sync {
    /// Register a new account in the primary namespace and open a session.
    ///
    /// Fails with [`AppError::DuplicateAccount`] if the identifier is taken in
    /// any namespace.
    async fn signup(&self, form: SignupForm) -> Result<IssuedSession, AppError>;

    /// Check credentials and open a session.
    ///
    /// Fails with [`AppError::AccountNotFound`] for an unknown identifier and
    /// [`AppError::InvalidCredentials`] for a wrong secret.
    async fn login(&self, form: LoginForm) -> Result<IssuedSession, AppError>;

    /// Resolve a bearer token to the account it was issued for
    async fn validate(&self, token: &str) -> Result<AccountSummary, AppError>;

    /// Revoke a bearer token
    async fn logout(&self, token: &str) -> Result<(), AppError>;
}
