// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for Prometheus metric keys
pub const SIGNUP_CREATED: &str = "auth.signup.created";
pub const SIGNUP_REJECTED: &str = "auth.signup.rejected";
pub const LOGIN_SUCCEEDED: &str = "auth.login.succeeded";
pub const LOGIN_FAILED: &str = "auth.login.failed";
pub const LOGIN_LOCKOUTS: &str = "auth.login.lockouts";
pub const SESSIONS_ISSUED: &str = "session.issued";
pub const SESSIONS_EXPIRED: &str = "session.expired";
pub const SESSIONS_ACTIVE: &str = "session.active";
