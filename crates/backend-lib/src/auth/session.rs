// ============================
// backend-lib/src/auth/session.rs
// ============================
//! Server-side session registry.
//!
//! Every token handed out by signup or login is recorded here together with
//! the account it was issued for. A token is valid while it is present and
//! unexpired; logout removes it. Nothing is persisted, so restarting the
//! server ends every session.
use super::token_generator::generate_session_token;
use crate::metrics::{SESSIONS_ACTIVE, SESSIONS_EXPIRED, SESSIONS_ISSUED};
use chrono::{DateTime, TimeDelta, Utc};
use metrics::{counter, gauge};
use quickcare_common::AccountSummary;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

/// Default session TTL in seconds (7 days)
pub const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60 * 24 * 7;

/// Session information
#[derive(Clone, Debug)]
pub struct Session {
    pub account: AccountSummary,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// A freshly issued bearer token and the account it speaks for
#[derive(Clone, Debug)]
pub struct IssuedSession {
    pub account: AccountSummary,
    pub token: String,
}

/// Session manager for handling authentication tokens
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: TimeDelta,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::with_ttl_secs(DEFAULT_SESSION_TTL_SECS)
    }
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Create a session manager from a TTL in whole seconds
    pub fn with_ttl_secs(secs: u64) -> Self {
        let ttl = i64::try_from(secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);
        Self::new(ttl)
    }

    /// Issue a new token bound to `account`
    pub async fn issue(&self, account: AccountSummary) -> IssuedSession {
        let token = generate_session_token();
        let now = Utc::now();
        let session = Session {
            account: account.clone(),
            issued_at: now,
            expires_at: now
                .checked_add_signed(self.ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), session);

        counter!(SESSIONS_ISSUED).increment(1);
        gauge!(SESSIONS_ACTIVE).set(sessions.len() as f64);

        IssuedSession { account, token }
    }

    /// Get a live session by token, dropping it if it has expired
    pub async fn get(&self, token: &str) -> Option<Session> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                Some(session) if session.is_live(now) => return Some(session.clone()),
                Some(_) => {},
                None => return None,
            }
        }

        let mut sessions = self.sessions.write().await;
        if sessions.get(token).is_some_and(|s| !s.is_live(now)) {
            sessions.remove(token);
            counter!(SESSIONS_EXPIRED).increment(1);
            gauge!(SESSIONS_ACTIVE).set(sessions.len() as f64);
        }
        None
    }

    /// Revoke a token. Returns whether a live session was removed.
    pub async fn revoke(&self, token: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(token);
        gauge!(SESSIONS_ACTIVE).set(sessions.len() as f64);
        removed.is_some_and(|s| s.is_live(Utc::now()))
    }

    /// Remove every expired session, returning how many were dropped
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before_count = sessions.len();

        sessions.retain(|_, session| session.is_live(now));

        let removed = before_count - sessions.len();
        if removed > 0 {
            counter!(SESSIONS_EXPIRED).increment(removed as u64);
            gauge!(SESSIONS_ACTIVE).set(sessions.len() as f64);
        }
        removed
    }

    /// Number of sessions currently held, expired ones included until purged
    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
