//! Server configuration
//!
//! Defaults, overridden by an optional TOML file, then by environment
//! variables. The binary applies CLI flags last.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the API server binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// SQLite database file
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// bcrypt work factor for new password hashes
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    /// Minimum accepted password length at registration
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,

    /// Allow any origin (the terminal client does not need CORS, browsers do)
    #[serde(default = "default_true")]
    pub cors_permissive: bool,

    /// Limits on the credential endpoints
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_db_path() -> String {
    "profrate.db".to_string()
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_min_password_length() -> usize {
    8
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            db_path: default_db_path(),
            bcrypt_cost: default_bcrypt_cost(),
            min_password_length: default_min_password_length(),
            cors_permissive: true,
            rate_limit: RateLimitSettings::default(),
        }
    }
}

impl Config {
    /// Load from TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Load from `PROFRATE_CONFIG` (or `profrate.toml`) and apply env overrides.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn from_env() -> Result<Self> {
        let path = env::var("PROFRATE_CONFIG").unwrap_or_else(|_| "profrate.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            Self::load(&path)?
        } else {
            tracing::debug!("No config file at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `BIND_ADDR`, `DB_PATH`, `BCRYPT_COST`, `MIN_PASSWORD_LENGTH` and
    /// `RATE_LIMIT_ENABLED` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("BIND_ADDR") {
            if !v.trim().is_empty() {
                self.bind_addr = v;
            }
        }
        if let Ok(v) = env::var("DB_PATH") {
            if !v.trim().is_empty() {
                self.db_path = v;
            }
        }
        if let Some(cost) = env::var("BCRYPT_COST")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
        {
            self.bcrypt_cost = cost;
        }
        if let Some(len) = env::var("MIN_PASSWORD_LENGTH")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
        {
            self.min_password_length = len;
        }
        if let Ok(v) = env::var("RATE_LIMIT_ENABLED") {
            self.rate_limit.enabled = matches!(v.as_str(), "1" | "true" | "TRUE" | "on" | "ON");
        }
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(4..=31).contains(&self.bcrypt_cost) {
            anyhow::bail!("bcrypt_cost must be between 4 and 31, got {}", self.bcrypt_cost);
        }
        if self.rate_limit.enabled && self.rate_limit.window_secs == 0 {
            anyhow::bail!("rate_limit.window_secs must be positive");
        }
        Ok(())
    }
}

/// Per-IP limits on the credential endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Requests allowed per window
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Extra requests tolerated above `max_requests` before rejecting
    #[serde(default = "default_burst")]
    pub burst: u32,
}

fn default_max_requests() -> u32 {
    20
}

fn default_window_secs() -> u64 {
    60
}

fn default_burst() -> u32 {
    5
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            burst: default_burst(),
        }
    }
}

impl RateLimitSettings {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}
