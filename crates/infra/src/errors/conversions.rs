//! Conversions from external infrastructure errors into domain errors.

use r2d2::Error as PoolError;
use rusqlite::Error as SqlError;
use searchlog_domain::SearchLogError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SearchLogError);

impl From<InfraError> for SearchLogError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SearchLogError> for InfraError {
    fn from(value: SearchLogError) -> Self {
        InfraError(value)
    }
}

trait IntoSearchLogError {
    fn into_searchlog(self) -> SearchLogError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → SearchLogError */
/* -------------------------------------------------------------------------- */

impl IntoSearchLogError for SqlError {
    fn into_searchlog(self) -> SearchLogError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        SearchLogError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        SearchLogError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => SearchLogError::Database(format!(
                        "search word already stored (searches.word must be unique): {message}"
                    )),
                    (ErrorCode::CannotOpen, _) => {
                        SearchLogError::Database(format!("unable to open database: {message}"))
                    }
                    _ => SearchLogError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => SearchLogError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                SearchLogError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                SearchLogError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => {
                SearchLogError::Database("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidPath(path) => SearchLogError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => SearchLogError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_searchlog())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → SearchLogError */
/* -------------------------------------------------------------------------- */

impl IntoSearchLogError for PoolError {
    fn into_searchlog(self) -> SearchLogError {
        let message = self.to_string();
        if message.to_ascii_lowercase().contains("timed out") {
            SearchLogError::Database("timed out waiting for a pooled connection".into())
        } else {
            SearchLogError::Database(format!("connection pool error: {message}"))
        }
    }
}

impl From<PoolError> for InfraError {
    fn from(value: PoolError) -> Self {
        InfraError(value.into_searchlog())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use rusqlite::ffi::{Error as FfiError, ErrorCode};
    use rusqlite::Error as SqlError;

    use super::*;

    #[test]
    fn sqlite_busy_maps_to_database_error() {
        let err = SqlError::SqliteFailure(
            FfiError { code: ErrorCode::DatabaseBusy, extended_code: 5 },
            Some("database is locked".into()),
        );

        let mapped: SearchLogError = InfraError::from(err).into();
        match mapped {
            SearchLogError::Database(msg) => assert!(msg.contains("busy")),
            other => panic!("expected database error, got {:?}", other),
        }
    }

    #[test]
    fn unique_violation_is_labelled() {
        let err = SqlError::SqliteFailure(
            FfiError { code: ErrorCode::ConstraintViolation, extended_code: 2067 },
            Some("UNIQUE constraint failed: searches.word".into()),
        );

        let mapped: SearchLogError = InfraError::from(err).into();
        assert_eq!(
            mapped,
            SearchLogError::Database(
                "search word already stored (searches.word must be unique): \
                 UNIQUE constraint failed: searches.word"
                    .into()
            )
        );
    }

    #[test]
    fn missing_row_maps_to_not_found() {
        let mapped: SearchLogError = InfraError::from(SqlError::QueryReturnedNoRows).into();
        assert!(matches!(mapped, SearchLogError::NotFound(_)));
    }

    #[test]
    fn domain_errors_pass_through_unchanged() {
        let original = SearchLogError::Config("bad timeout".into());
        let roundtrip: SearchLogError = InfraError::from(original.clone()).into();
        assert_eq!(roundtrip, original);
    }
}
