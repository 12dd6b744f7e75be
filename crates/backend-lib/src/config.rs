// ============================
// backend-lib/src/config.rs
// ============================
//! Configuration management.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `QUICKCARE_`-prefixed environment variables (`__` separates nested keys,
//! e.g. `QUICKCARE_SESSION__TTL_SECS=3600`).
use crate::auth::rate_limit::{DEFAULT_LOCKOUT_SECS, DEFAULT_MAX_ATTEMPTS};
use crate::auth::session::DEFAULT_SESSION_TTL_SECS;
use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Default config file looked up by [`Settings::load`]
pub const DEFAULT_CONFIG_FILE: &str = "config/default.toml";

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "QUICKCARE_";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const MAX_SESSION_TTL_SECS: u64 = 60 * 60 * 24 * 365;
const MAX_LOCKOUT_SECS: u64 = 60 * 60 * 24;

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub session: SessionSettings,
    pub hashing: HashingSettings,
    pub auth_rate_limit: AuthRateLimitSettings,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Which account store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Process-local map, lost on restart
    Memory,
    /// One JSON document per account under `path`
    FlatFile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Session lifetime in seconds
    pub ttl_secs: u64,
}

/// scrypt cost parameters for new password hashes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashingSettings {
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRateLimitSettings {
    /// Failed logins from one address before it is locked out
    pub max_attempts: u32,
    /// Lockout length in seconds
    pub lockout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            storage: StorageSettings::default(),
            session: SessionSettings::default(),
            hashing: HashingSettings::default(),
            auth_rate_limit: AuthRateLimitSettings::default(),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::FlatFile,
            path: PathBuf::from("data"),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}

impl Default for HashingSettings {
    fn default() -> Self {
        Self { log_n: 15, r: 8, p: 1 }
    }
}

impl Default for AuthRateLimitSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            lockout_secs: DEFAULT_LOCKOUT_SECS,
        }
    }
}

impl Settings {
    /// Load settings from `config/default.toml` (if present) and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load settings from a specific TOML file (if present) and the environment
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_figment(Self::figment(path.as_ref()))
    }

    /// The provider stack used by [`Settings::load_from`]
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Extract and validate settings from an arbitrary figment
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let settings: Settings = figment.extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            bail!("unknown log level `{}`", self.log_level);
        }
        if self.session.ttl_secs == 0 || self.session.ttl_secs > MAX_SESSION_TTL_SECS {
            bail!(
                "session.ttl_secs must be between 1 and {MAX_SESSION_TTL_SECS}, got {}",
                self.session.ttl_secs
            );
        }
        if !(1..=20).contains(&self.hashing.log_n) || self.hashing.r == 0 || self.hashing.p == 0 {
            bail!("hashing parameters out of range: {:?}", self.hashing);
        }
        if self.auth_rate_limit.max_attempts == 0 {
            bail!("auth_rate_limit.max_attempts must be at least 1");
        }
        if self.auth_rate_limit.lockout_secs > MAX_LOCKOUT_SECS {
            bail!(
                "auth_rate_limit.lockout_secs must be at most {MAX_LOCKOUT_SECS}, got {}",
                self.auth_rate_limit.lockout_secs
            );
        }
        Ok(())
    }

    /// Socket address the HTTP server binds to
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port).parse()?;
        Ok(addr)
    }
}
