//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for SearchLog
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum SearchLogError {
    /// Store or connection failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown record.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rejected caller input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Background sweeper lifecycle failure.
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// Anything else (task joins, subscriber setup).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SearchLogError {
    /// Stable label suitable for metrics and structured log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Scheduler(_) => "scheduler",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for SearchLog operations
pub type Result<T> = std::result::Result<T, SearchLogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_category_prefix() {
        let err = SearchLogError::Database("record with id 7 not found".into());
        assert_eq!(err.to_string(), "Database error: record with id 7 not found");
    }

    #[test]
    fn serializes_as_tagged_enum() {
        let err = SearchLogError::Config("timeout must be positive".into());
        let json = serde_json::to_string(&err).expect("serializes");
        assert_eq!(json, r#"{"type":"Config","message":"timeout must be positive"}"#);

        let back: SearchLogError = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, err);
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(SearchLogError::Scheduler(String::new()).label(), "scheduler");
        assert_eq!(SearchLogError::NotFound(String::new()).label(), "not_found");
    }
}
