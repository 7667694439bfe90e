//! Integration tests for configuration types
//!
//! Covers the serde surface used by config files and the validation rules
//! the sweeper depends on.

use std::time::Duration;

use searchlog_domain::{Config, DedupConfig, LogFormat, SearchLogError};

// ============================================================================
// Serde Tests
// ============================================================================

#[test]
fn test_empty_sections_use_defaults() {
    let config: Config =
        serde_json::from_str(r#"{ "database": {}, "dedup": {}, "logging": {} }"#).expect("parses");
    assert_eq!(config, Config::default());
}

#[test]
fn test_log_format_round_trips_lowercase() {
    let json = serde_json::to_string(&LogFormat::Json).expect("serializes");
    assert_eq!(json, r#""json""#);
    assert_eq!("PRETTY".parse::<LogFormat>().expect("parses"), LogFormat::Text);
    assert!(matches!("yaml".parse::<LogFormat>(), Err(SearchLogError::Config(_))));
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn test_default_timeout_is_valid() {
    let dedup = DedupConfig::default();
    assert!(dedup.validate().is_ok());
    assert_eq!(dedup.sweep_interval(), dedup.completion_timeout() / 2);
}

#[test]
fn test_sub_millisecond_sweep_is_still_positive() {
    let dedup = DedupConfig::with_timeout(Duration::from_millis(1));
    assert!(dedup.validate().is_ok());
    assert_eq!(dedup.sweep_interval(), Duration::from_micros(500));
}

#[test]
fn test_zero_timeout_message_names_value() {
    let err = DedupConfig { completion_timeout_ms: 0 }.validate().expect_err("rejected");
    assert_eq!(
        err,
        SearchLogError::Config("completion timeout must be greater than zero, got 0ms".into())
    );
}
