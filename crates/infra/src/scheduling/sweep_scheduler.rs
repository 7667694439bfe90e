//! Sweep scheduler driving the completion timeout.
//!
//! Runs [`DedupEngine::sweep`] on a fixed period (half the completion
//! timeout by default) from a background tokio task with explicit lifecycle
//! management.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use searchlog_core::DedupEngine;
//! use searchlog_infra::database::InMemorySearchStore;
//! use searchlog_infra::observability::metrics::SweepMetrics;
//! use searchlog_infra::scheduling::SweepScheduler;
//!
//! # async fn example() -> Result<(), searchlog_infra::scheduling::SchedulerError> {
//! let engine = Arc::new(DedupEngine::new(
//!     Arc::new(InMemorySearchStore::new()),
//!     Duration::from_secs(2),
//! ));
//! let mut scheduler =
//!     SweepScheduler::new(engine, Duration::from_secs(1), Arc::new(SweepMetrics::new()));
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use searchlog_core::DedupEngine;
use searchlog_domain::DedupConfig;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::observability::metrics::SweepMetrics;
use crate::observability::MetricsResult;
use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

const JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Periodic sweeper for a [`DedupEngine`].
pub struct SweepScheduler {
    engine: Arc<DedupEngine>,
    interval: Duration,
    metrics: Arc<SweepMetrics>,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
}

impl SweepScheduler {
    /// Create a scheduler that sweeps `engine` every `interval`.
    pub fn new(engine: Arc<DedupEngine>, interval: Duration, metrics: Arc<SweepMetrics>) -> Self {
        Self {
            engine,
            interval,
            metrics,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a scheduler with the period derived from `config`.
    pub fn from_config(
        engine: Arc<DedupEngine>,
        config: &DedupConfig,
        metrics: Arc<SweepMetrics>,
    ) -> Self {
        Self::new(engine, config.sweep_interval(), metrics)
    }

    /// Sweep period.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start the scheduler
    ///
    /// Spawns a background task that sweeps periodically. The first sweep
    /// happens one period after start.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is already running or the period is zero
    #[instrument(skip(self), fields(interval = ?self.interval))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }
        if self.interval.is_zero() {
            return Err(SchedulerError::InvalidConfig("sweep interval must be non-zero".into()));
        }

        info!("Starting sweep scheduler");

        // Create a new cancellation token (supports restart after stop)
        self.cancellation_token = CancellationToken::new();

        let engine = Arc::clone(&self.engine);
        let metrics = Arc::clone(&self.metrics);
        let interval = self.interval;
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::sweep_loop(engine, metrics, interval, cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);

        info!("Sweep scheduler started");
        log_metric(self.metrics.record_start(), "scheduler.sweep.start");

        Ok(())
    }

    /// Stop the scheduler gracefully
    ///
    /// Cancels the background task and awaits completion. A sweep already in
    /// progress finishes first.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is not running
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        info!("Stopping sweep scheduler");

        self.cancellation_token.cancel();

        if let Some(handle) = self.task_handle.lock().await.take() {
            tokio::time::timeout(JOIN_TIMEOUT, handle)
                .await
                .map_err(|source| SchedulerError::Timeout { duration: JOIN_TIMEOUT, source })??;
        }

        info!("Sweep scheduler stopped");
        log_metric(self.metrics.record_stop(), "scheduler.sweep.stop");

        Ok(())
    }

    /// Check if scheduler is running
    ///
    /// A scheduler is considered running if it has an active task handle that
    /// hasn't finished.
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    /// Background sweep loop
    async fn sweep_loop(
        engine: Arc<DedupEngine>,
        metrics: Arc<SweepMetrics>,
        period: Duration,
        cancel: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!("Sweep loop cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    let started = Instant::now();
                    let report = engine.sweep().await;
                    let elapsed = started.elapsed();

                    if report.failed > 0 {
                        warn!(
                            failed = report.failed,
                            persisted = report.persisted,
                            "Sweep completed with store failures"
                        );
                    } else if report.wrote_anything() {
                        info!(
                            persisted = report.persisted,
                            relinked = report.relinked,
                            candidates = report.candidates,
                            "Sweep completed"
                        );
                    } else {
                        debug!(candidates = report.candidates, "Sweep found nothing to persist");
                    }

                    log_metric(metrics.record_sweep(&report, elapsed), "scheduler.sweep.tick");
                }
            }
        }
    }
}

fn log_metric(result: MetricsResult<()>, metric: &'static str) {
    if let Err(err) = result {
        warn!(metric = metric, error = ?err, "Failed to record scheduler metric");
    }
}

/// Ensure the background task is cancelled when dropped
impl Drop for SweepScheduler {
    fn drop(&mut self) {
        if self.is_running() && !self.cancellation_token.is_cancelled() {
            warn!("SweepScheduler dropped while running; cancelling");
            self.cancellation_token.cancel();
        }
    }
}
