//! Observability infrastructure for sweep metrics
//!
//! Counters are plain atomics; recent tick durations live in a small ring
//! buffer behind a poison-safe mutex.
//!
//! All record methods return `MetricsResult<()>` so callers handle them the
//! same way everywhere:
//!
//! ```rust
//! use searchlog_core::SweepReport;
//! use searchlog_infra::observability::metrics::SweepMetrics;
//!
//! let metrics = SweepMetrics::new();
//! if let Err(e) = metrics.record_sweep(&SweepReport::default(), std::time::Duration::ZERO) {
//!     tracing::warn!("Failed to record metric: {}", e);
//! }
//! ```

pub mod metrics;

/// Metrics error type
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Empty data set - cannot calculate aggregate metric
    #[error("Empty data: cannot calculate {metric}")]
    EmptyData {
        /// Metric name that failed (e.g., "average", "P95")
        metric: &'static str,
    },
}

/// Result type for metrics operations
pub type MetricsResult<T> = Result<T, MetricsError>;
