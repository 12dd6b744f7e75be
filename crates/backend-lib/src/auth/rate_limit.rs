// ============================
// backend-lib/src/auth/rate_limit.rs
// ============================
//! Lockout of client addresses after repeated failed logins.

use crate::config::AuthRateLimitSettings;
use crate::metrics::LOGIN_LOCKOUTS;
use dashmap::DashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default number of failed attempts before rate limiting
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default lockout duration (5 minutes)
pub const DEFAULT_LOCKOUT_SECS: u64 = 5 * 60;

/// How long an idle failure record is kept
const STALE_AFTER: Duration = Duration::from_secs(24 * 60 * 60);

/// Stand-in lockout end when `now + lockout_duration` overflows
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Entry in the rate limit map
#[derive(Debug, Clone)]
struct RateLimitEntry {
    /// Number of failed attempts
    failed_attempts: u32,
    /// Time of the last failed attempt
    last_failure: Instant,
    /// When the lockout expires, if one is active
    lockout_expiry: Option<Instant>,
}

/// Rate limiter for authentication attempts
#[derive(Debug, Clone)]
pub struct AuthRateLimiter {
    /// Map of IP addresses to rate limit entries
    attempts: Arc<DashMap<IpAddr, RateLimitEntry>>,
    /// Maximum number of failed attempts before lockout
    max_attempts: u32,
    /// Duration of lockout period
    lockout_duration: Duration,
}

impl Default for AuthRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, Duration::from_secs(DEFAULT_LOCKOUT_SECS))
    }
}

impl From<&AuthRateLimitSettings> for AuthRateLimiter {
    fn from(settings: &AuthRateLimitSettings) -> Self {
        Self::new(settings.max_attempts, Duration::from_secs(settings.lockout_secs))
    }
}

impl AuthRateLimiter {
    /// Create a new auth rate limiter
    pub fn new(max_attempts: u32, lockout_duration: Duration) -> Self {
        Self {
            attempts: Arc::new(DashMap::new()),
            max_attempts,
            lockout_duration,
        }
    }

    /// Record a failed authentication attempt
    pub fn record_failed_attempt(&self, ip: IpAddr) {
        let now = Instant::now();

        let mut entry = self.attempts.entry(ip).or_insert_with(|| RateLimitEntry {
            failed_attempts: 0,
            last_failure: now,
            lockout_expiry: None,
        });

        // A finished lockout starts a fresh count
        if entry.lockout_expiry.is_some_and(|expiry| now >= expiry) {
            entry.failed_attempts = 0;
            entry.lockout_expiry = None;
        }

        entry.failed_attempts = entry.failed_attempts.saturating_add(1);
        entry.last_failure = now;

        if entry.failed_attempts >= self.max_attempts && entry.lockout_expiry.is_none() {
            let expiry = now
                .checked_add(self.lockout_duration)
                .or_else(|| now.checked_add(FAR_FUTURE))
                .unwrap_or(now);
            entry.lockout_expiry = Some(expiry);
            metrics::counter!(LOGIN_LOCKOUTS).increment(1);
            tracing::warn!(
                %ip,
                attempts = entry.failed_attempts,
                "address locked out after failed logins"
            );
        }
    }

    /// Record a successful authentication
    pub fn record_success(&self, ip: IpAddr) {
        self.attempts.remove(&ip);
    }

    /// Check if an IP is allowed to attempt authentication
    pub fn check_rate_limit(&self, ip: IpAddr) -> bool {
        match self.attempts.get(&ip) {
            Some(entry) => entry
                .lockout_expiry
                .map_or(true, |expiry| Instant::now() >= expiry),
            None => true,
        }
    }

    /// Clean up expired lockouts and stale failure records
    pub fn cleanup(&self) {
        let now = Instant::now();

        self.attempts.retain(|_, entry| match entry.lockout_expiry {
            Some(expiry) => now < expiry,
            None => now.duration_since(entry.last_failure) < STALE_AFTER,
        });
    }

    /// Number of addresses with a failure record
    pub fn tracked(&self) -> usize {
        self.attempts.len()
    }
}
