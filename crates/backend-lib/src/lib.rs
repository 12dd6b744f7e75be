// ============================
// backend-lib/src/lib.rs
// ============================
//! Credential service for the `QuickCare` booking app: signup, login and
//! bearer-session validation over an injected account store.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod router;
pub mod storage;
pub mod validation;

use crate::auth::{AuthRateLimiter, CredentialService, DefaultCredentialService, SessionManager};
use crate::config::{Settings, StorageBackend};
use crate::storage::{AccountStore, FlatFileAccountStore, InMemoryAccountStore};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Credential service
    pub auth: Arc<dyn CredentialService>,
    /// Session registry backing `auth`, exposed for background purging
    pub sessions: SessionManager,
    /// Configuration settings
    pub settings: Arc<Settings>,
    /// Failed-login lockout per client address
    pub auth_rate_limiter: Arc<AuthRateLimiter>,
}

impl AppState {
    /// Create application state over the given account store
    pub fn new<S: AccountStore + 'static>(store: S, config: &Settings) -> Self {
        let sessions = SessionManager::with_ttl_secs(config.session.ttl_secs);
        let auth = Arc::new(DefaultCredentialService::new(
            store,
            sessions.clone(),
            config.hashing.clone(),
        ));
        let auth_rate_limiter = Arc::new(AuthRateLimiter::from(&config.auth_rate_limit));

        Self {
            auth,
            sessions,
            settings: Arc::new(config.clone()),
            auth_rate_limiter,
        }
    }

    /// Create application state with the store named in the settings
    pub fn from_settings(config: &Settings) -> anyhow::Result<Self> {
        let state = match config.storage.backend {
            StorageBackend::Memory => Self::new(InMemoryAccountStore::new(), config),
            StorageBackend::FlatFile => {
                Self::new(FlatFileAccountStore::new(&config.storage.path)?, config)
            },
        };
        Ok(state)
    }
}
