//! Application constants
//!
//! Centralized location for domain-level defaults.

/// Completion timeout applied when no configuration overrides it.
pub const DEFAULT_COMPLETION_TIMEOUT_MS: u64 = 2_000;

/// The sweeper runs this many times per completion timeout.
pub const SWEEPS_PER_TIMEOUT: u32 = 2;

// Database defaults
/// Database file used when no path is configured.
pub const DEFAULT_DB_PATH: &str = "searchlog.db";
/// Pool size used when none is configured.
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;
