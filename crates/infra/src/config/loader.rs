//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! Every loaded configuration is validated before it is returned.
//!
//! ## Environment Variables
//! - `SEARCHLOG_DB_PATH`: Database file path (required)
//! - `SEARCHLOG_COMPLETION_TIMEOUT_MS`: Completion timeout in milliseconds
//!   (required)
//! - `SEARCHLOG_DB_POOL_SIZE`: Connection pool size (optional)
//! - `SEARCHLOG_LOG_LEVEL`: Default log filter when `RUST_LOG` is unset
//!   (optional)
//! - `SEARCHLOG_LOG_FORMAT`: `text` or `json` (optional)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.{json,toml}` or `./searchlog.{json,toml}` (current working
//!    directory)
//! 2. `../config.{json,toml}` and `../../config.{json,toml}`
//! 3. The same names relative to the executable location

use std::path::{Path, PathBuf};

use searchlog_domain::{
    Config, DatabaseConfig, DedupConfig, LogFormat, LoggingConfig, Result, SearchLogError,
};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["config.json", "config.toml", "searchlog.json", "searchlog.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `SearchLogError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The completion timeout is zero
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Like [`load`], but falls back to [`Config::default`] when neither the
/// environment nor any probed file provides a configuration.
///
/// A config file that exists but fails to parse is still an error.
///
/// # Errors
/// Returns `SearchLogError::Config` for unreadable or invalid files.
pub fn load_or_default() -> Result<Config> {
    if let Ok(config) = load_from_env() {
        tracing::info!("Configuration loaded from environment variables");
        return Ok(config);
    }

    match probe_config_paths() {
        Some(path) => load_from_file(Some(path)),
        None => {
            tracing::info!("No configuration found, using defaults");
            let config = Config::default();
            config.dedup.validate()?;
            Ok(config)
        }
    }
}

/// Load configuration from environment variables
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `SearchLogError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("SEARCHLOG_DB_PATH")?;
    let completion_timeout_ms = env_var("SEARCHLOG_COMPLETION_TIMEOUT_MS").and_then(|s| {
        s.parse::<u64>()
            .map_err(|e| SearchLogError::Config(format!("Invalid completion timeout: {e}")))
    })?;
    let pool_size = match std::env::var("SEARCHLOG_DB_POOL_SIZE") {
        Ok(s) => s
            .parse::<u32>()
            .map_err(|e| SearchLogError::Config(format!("Invalid pool size: {e}")))?,
        Err(_) => DatabaseConfig::default().pool_size,
    };

    let mut logging = LoggingConfig::default();
    if let Ok(level) = std::env::var("SEARCHLOG_LOG_LEVEL") {
        logging.level = level;
    }
    if let Ok(format) = std::env::var("SEARCHLOG_LOG_FORMAT") {
        logging.format = format.parse::<LogFormat>()?;
    }

    let config = Config {
        database: DatabaseConfig { path: db_path, pool_size },
        dedup: DedupConfig { completion_timeout_ms },
        logging,
    };
    config.dedup.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `SearchLogError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SearchLogError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SearchLogError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SearchLogError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.dedup.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SearchLogError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SearchLogError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(SearchLogError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        roots.push(exe_dir);
    }

    roots
        .iter()
        .flat_map(|root| candidate_paths(root))
        .find(|path| path.exists())
}

fn candidate_paths(root: &Path) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> =
        CONFIG_FILE_NAMES.iter().map(|name| root.join(name)).collect();
    for parent in ["..", "../.."] {
        candidates.push(root.join(parent).join("config.json"));
        candidates.push(root.join(parent).join("config.toml"));
    }
    candidates
}

/// Get required environment variable
///
/// # Errors
/// Returns `SearchLogError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        SearchLogError::Config(format!("Missing required environment variable: {key}"))
    })
}
