use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::{Backoff, RetryConfigError, RetryPolicy};

/// Backoff schedule name as written in config.toml.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    #[default]
    Fixed,
    Exponential,
}

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt (0 = attempt once).
    pub max_retry_count: u32,
    /// Sleep before each retry in milliseconds (at least 1).
    pub before_retry_sleep_ms: u64,
    /// "fixed" (default) or "exponential".
    #[serde(default)]
    pub backoff: BackoffKind,
    /// Upper bound on the sleep for exponential backoff, in milliseconds.
    #[serde(default = "default_max_sleep_ms")]
    pub max_sleep_ms: u64,
}

fn default_max_sleep_ms() -> u64 {
    30_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retry_count: 3,
            before_retry_sleep_ms: 500,
            backoff: BackoffKind::Fixed,
            max_sleep_ms: default_max_sleep_ms(),
        }
    }
}

impl RetryConfig {
    /// Validate and build the policy. Fails before any operation is attempted.
    pub fn to_policy(&self) -> Result<RetryPolicy, RetryConfigError> {
        let sleep = Duration::from_millis(self.before_retry_sleep_ms);
        let backoff = match self.backoff {
            BackoffKind::Fixed => Backoff::Fixed,
            BackoffKind::Exponential => Backoff::Exponential {
                max_sleep: Duration::from_millis(self.max_sleep_ms),
            },
        };
        RetryPolicy::with_backoff(self.max_retry_count, sleep, backoff)
    }
}

/// Global configuration loaded from `~/.config/tally/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TallyConfig {
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Unit name used in cardinality messages when none is given (default "line").
    #[serde(default)]
    pub default_unit: Option<String>,
}

impl TallyConfig {
    pub fn retry_or_default(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }

    pub fn unit_or_default(&self) -> &str {
        self.default_unit.as_deref().unwrap_or("line")
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("tally")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<TallyConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = TallyConfig {
            retry: Some(RetryConfig::default()),
            default_unit: None,
        };
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}

/// Load configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<TallyConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: TallyConfig = toml::from_str(&data)?;
    Ok(cfg)
}
