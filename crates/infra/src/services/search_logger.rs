//! Search logger facade.
//!
//! Owns a [`DedupEngine`] and the [`SweepScheduler`] that drives it, and
//! exposes the small surface callers need: submit fragments, list what was
//! stored, shut down.
//!
//! # Lifecycle
//!
//! - `start` rebuilds the prefix index from the store, then starts sweeping.
//! - `shutdown` stops the sweeper, then closes the store. Words still inside
//!   their quiet period are not flushed.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use searchlog_domain::DedupConfig;
//! use searchlog_infra::database::InMemorySearchStore;
//! use searchlog_infra::services::SearchLogger;
//!
//! # async fn example() -> searchlog_domain::Result<()> {
//! let logger =
//!     SearchLogger::start(&DedupConfig::default(), Arc::new(InMemorySearchStore::new())).await?;
//!
//! for fragment in ["b", "bu", "bus", "busi", "business"] {
//!     logger.submit(fragment).await?;
//! }
//!
//! logger.shutdown().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use searchlog_core::{Clock, DedupEngine, SearchStore, SystemClock};
use searchlog_domain::{DedupConfig, Result as DomainResult, SearchLogError, SearchRecord};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::observability::metrics::SweepMetrics;
use crate::scheduling::{SchedulerError, SweepScheduler};

/// Running search logger: engine plus background sweeper.
pub struct SearchLogger {
    engine: Arc<DedupEngine>,
    scheduler: Mutex<SweepScheduler>,
    metrics: Arc<SweepMetrics>,
    shut_down: AtomicBool,
}

impl SearchLogger {
    /// Build the engine, load stored words and start sweeping.
    ///
    /// # Errors
    /// Returns `SearchLogError::Config` for a zero timeout, or the store's
    /// error if the initial load fails.
    pub async fn start(config: &DedupConfig, store: Arc<dyn SearchStore>) -> DomainResult<Self> {
        Self::start_with_clock(config, store, Arc::new(SystemClock)).await
    }

    /// Same as [`SearchLogger::start`] with an explicit clock.
    ///
    /// # Errors
    /// See [`SearchLogger::start`].
    #[instrument(skip(store, clock), fields(timeout_ms = config.completion_timeout_ms))]
    pub async fn start_with_clock(
        config: &DedupConfig,
        store: Arc<dyn SearchStore>,
        clock: Arc<dyn Clock>,
    ) -> DomainResult<Self> {
        config.validate()?;

        let engine =
            Arc::new(DedupEngine::with_clock(store, config.completion_timeout(), clock));
        let loaded = engine.load_existing().await?;

        let metrics = Arc::new(SweepMetrics::new());
        let mut scheduler =
            SweepScheduler::from_config(Arc::clone(&engine), config, Arc::clone(&metrics));
        scheduler.start().await?;

        info!(loaded, "Search logger started");

        Ok(Self {
            engine,
            scheduler: Mutex::new(scheduler),
            metrics,
            shut_down: AtomicBool::new(false),
        })
    }

    /// Record one typed fragment.
    ///
    /// # Errors
    /// Returns `SearchLogError::InvalidInput` after shutdown, or the store's
    /// error when renaming an extended word fails.
    pub async fn submit(&self, word: &str) -> DomainResult<()> {
        self.ensure_running()?;
        self.engine.submit(word).await
    }

    /// Every word currently stored.
    ///
    /// # Errors
    /// Propagates store errors (including "store closed" after shutdown).
    pub async fn list_stored_words(&self) -> DomainResult<Vec<String>> {
        self.engine.list_stored_words().await
    }

    /// Every stored record including visit counts.
    ///
    /// # Errors
    /// Propagates store errors.
    pub async fn list_records(&self) -> DomainResult<Vec<SearchRecord>> {
        self.engine.list_records().await
    }

    /// Stop the sweeper and close the store. Later calls are no-ops.
    ///
    /// The store is closed even when the sweeper fails to stop in time; its
    /// task is cancelled and exits once the sweep in flight returns.
    ///
    /// # Errors
    /// Returns the scheduler's error if stopping failed, otherwise the
    /// store's error.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> DomainResult<()> {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let stopped = match self.scheduler.lock().await.stop().await {
            Ok(()) | Err(SchedulerError::NotRunning) => Ok(()),
            Err(err) => {
                warn!(error = %err, "Sweep scheduler did not stop cleanly; closing store anyway");
                Err(SearchLogError::from(err))
            }
        };

        let closed = self.engine.store().close().await;
        if let Err(err) = &closed {
            warn!(error = %err, "Failed to close search store");
        }

        stopped.and(closed)?;
        info!("Search logger shut down");
        Ok(())
    }

    /// Returns `true` until [`SearchLogger::shutdown`] is called.
    pub fn is_running(&self) -> bool {
        !self.shut_down.load(Ordering::Acquire)
    }

    /// Engine, for diagnostics.
    pub fn engine(&self) -> &Arc<DedupEngine> {
        &self.engine
    }

    /// Sweep metrics.
    pub fn metrics(&self) -> &Arc<SweepMetrics> {
        &self.metrics
    }

    fn ensure_running(&self) -> DomainResult<()> {
        if self.is_running() {
            Ok(())
        } else {
            Err(SearchLogError::InvalidInput("search logger has been shut down".into()))
        }
    }
}
