//! Tracing subscriber setup for the binary.

use searchlog_domain::{LogFormat, LoggingConfig, SearchLogError};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.level`. A second call fails with
/// `SearchLogError::Internal`.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), SearchLogError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|err| SearchLogError::Config(format!("Invalid log filter: {err}")))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let installed = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };

    installed.map_err(|err| SearchLogError::Internal(format!("tracing already set: {err}")))
}
