//! Application configuration management.
//!
//! Configuration covers session lifetimes, the login and fallback pages, and
//! optional paths to a route table and credential directory.
//!
//! Configuration is stored at `~/.config/plantdesk/config.json`. The
//! `PLANTDESK_CONFIG` environment variable points at an alternative file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
const APP_NAME: &str = "plantdesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "PLANTDESK_CONFIG";

/// Upper bounds for session settings. Values outside `1..=MAX` are rejected
/// at load time and clamped by the accessors.
const MAX_SHORT_SESSION_HOURS: i64 = 24 * 366;
const MAX_LONG_SESSION_DAYS: i64 = 3660;
const MAX_IDLE_TIMEOUT_MINUTES: i64 = 60 * 24 * 366;
const MAX_ACTIVITY_WRITE_INTERVAL_SECONDS: i64 = 3600;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub session: SessionConfig,
    pub routing: RoutingConfig,
    /// JSON credential directory used by the shell's verifier.
    pub users_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Lifetime of a session created without "remember me".
    pub short_session_hours: i64,
    /// Lifetime of a session created with "remember me".
    pub long_session_days: i64,
    /// Maximum gap between interactions before the session is dropped.
    pub idle_timeout_minutes: i64,
    /// Period of the background idle check.
    pub check_interval_seconds: u64,
    /// Minimum advance of the activity timestamp before it is written back
    /// to storage. Bumps closer together only update memory.
    pub activity_write_interval_seconds: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            short_session_hours: 8,
            long_session_days: 30,
            idle_timeout_minutes: 30,
            check_interval_seconds: 60,
            activity_write_interval_seconds: 1,
        }
    }
}

impl SessionConfig {
    pub fn short_session(&self) -> Duration {
        Duration::hours(self.short_session_hours.clamp(1, MAX_SHORT_SESSION_HOURS))
    }

    pub fn long_session(&self) -> Duration {
        Duration::days(self.long_session_days.clamp(1, MAX_LONG_SESSION_DAYS))
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::minutes(self.idle_timeout_minutes.clamp(1, MAX_IDLE_TIMEOUT_MINUTES))
    }

    pub fn check_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.check_interval_seconds.max(1))
    }

    pub fn activity_write_interval(&self) -> Duration {
        Duration::seconds(
            self.activity_write_interval_seconds
                .clamp(0, MAX_ACTIVITY_WRITE_INTERVAL_SECONDS),
        )
    }

    /// Session lifetime for the given duration class.
    pub fn lifetime(&self, remember_me: bool) -> Duration {
        if remember_me {
            self.long_session()
        } else {
            self.short_session()
        }
    }

    /// Reject settings that would produce empty or unrepresentable sessions.
    pub fn validate(&self) -> Result<()> {
        check_range("short_session_hours", self.short_session_hours, 1, MAX_SHORT_SESSION_HOURS)?;
        check_range("long_session_days", self.long_session_days, 1, MAX_LONG_SESSION_DAYS)?;
        check_range(
            "idle_timeout_minutes",
            self.idle_timeout_minutes,
            1,
            MAX_IDLE_TIMEOUT_MINUTES,
        )?;
        check_range(
            "activity_write_interval_seconds",
            self.activity_write_interval_seconds,
            0,
            MAX_ACTIVITY_WRITE_INTERVAL_SECONDS,
        )?;
        Ok(())
    }
}

fn check_range(name: &str, value: i64, min: i64, max: i64) -> Result<()> {
    if !(min..=max).contains(&value) {
        anyhow::bail!("session.{} must be between {} and {}, got {}", name, min, max, value);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub login_path: String,
    pub fallback_path: String,
    /// Replaces the built-in route table when set.
    pub routes_file: Option<PathBuf>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            login_path: "/auth/login".to_string(),
            fallback_path: "/dashboard".to_string(),
            routes_file: None,
        }
    }
}

impl AppConfig {
    /// Load from `PLANTDESK_CONFIG` if set, else the default location.
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_ENV_VAR) {
            Some(p) => PathBuf::from(p),
            None => Self::config_path()?,
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&contents)?;
            config
                .session
                .validate()
                .with_context(|| format!("Invalid config: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the persisted session keys and logs.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}
