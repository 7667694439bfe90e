//! Configuration management

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_COMPLETION_TIMEOUT_MS, DEFAULT_DB_PATH, DEFAULT_DB_POOL_SIZE, SWEEPS_PER_TIMEOUT,
};
use crate::errors::{Result, SearchLogError};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Where finished searches are stored.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Completion timeout and derived sweep period.
    #[serde(default)]
    pub dedup: DedupConfig,
    /// Log filter and output format for the binary.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file.
    pub path: String,
    /// Maximum pooled connections.
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: DEFAULT_DB_PATH.to_string(), pool_size: DEFAULT_DB_POOL_SIZE }
    }
}

/// Deduplication configuration.
///
/// The completion timeout is the only knob: it is both how long a prefix must
/// stay unextended before it can be persisted and, halved, the sweep period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Quiet period in milliseconds before a typed word counts as finished.
    pub completion_timeout_ms: u64,
}

impl DedupConfig {
    /// Build a configuration from a timeout duration.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { completion_timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX) }
    }

    /// How long a prefix must go unextended before it is considered finished.
    pub fn completion_timeout(&self) -> Duration {
        Duration::from_millis(self.completion_timeout_ms)
    }

    /// Period of the background sweep.
    pub fn sweep_interval(&self) -> Duration {
        self.completion_timeout() / SWEEPS_PER_TIMEOUT
    }

    /// Reject configurations the sweeper cannot run with.
    ///
    /// # Errors
    /// Returns `SearchLogError::Config` when the timeout is too small to yield
    /// a non-zero sweep period.
    pub fn validate(&self) -> Result<()> {
        if self.sweep_interval().is_zero() {
            return Err(SearchLogError::Config(format!(
                "completion timeout must be greater than zero, got {}ms",
                self.completion_timeout_ms
            )));
        }
        Ok(())
    }
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self { completion_timeout_ms: DEFAULT_COMPLETION_TIMEOUT_MS }
    }
}

/// Log output format for the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = SearchLogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(SearchLogError::Config(format!("Invalid log format: {other}"))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Human-readable or JSON lines.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Text }
    }
}
