//! Sweep metrics for the background timeout sweeper
//!
//! ## Design
//! - **Atomic counters** for everything summed across ticks
//! - **VecDeque ring buffer** of the last tick durations for percentiles
//! - **Poison-safe locking** with explicit match pattern (no .expect())

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use searchlog_core::SweepReport;
use serde::Serialize;

use crate::observability::{MetricsError, MetricsResult};

const MAX_SAMPLES: usize = 256;

/// Point-in-time copy of the sweep counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepStats {
    /// Completed sweep passes.
    pub ticks: u64,
    /// Timed-out words seen across all passes.
    pub candidates: u64,
    /// Words upserted.
    pub persisted: u64,
    /// Words that took over an ancestor's record.
    pub relinked: u64,
    /// Stepping-stone prefixes passed over.
    pub skipped: u64,
    /// Store calls that failed.
    pub failures: u64,
    /// Duration of the latest pass.
    pub last_tick_micros: u64,
    /// Scheduler starts.
    pub scheduler_starts: u64,
    /// Scheduler stops.
    pub scheduler_stops: u64,
}

/// Counters updated by the sweeper on every tick.
#[derive(Debug, Default)]
pub struct SweepMetrics {
    ticks: AtomicU64,
    candidates: AtomicU64,
    persisted: AtomicU64,
    relinked: AtomicU64,
    skipped: AtomicU64,
    failures: AtomicU64,
    last_tick_micros: AtomicU64,
    scheduler_starts: AtomicU64,
    scheduler_stops: AtomicU64,
    tick_micros: Mutex<VecDeque<u64>>,
}

impl SweepMetrics {
    /// Create zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one sweep report into the counters.
    pub fn record_sweep(&self, report: &SweepReport, elapsed: Duration) -> MetricsResult<()> {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        self.candidates.fetch_add(as_u64(report.candidates), Ordering::Relaxed);
        self.persisted.fetch_add(as_u64(report.persisted), Ordering::Relaxed);
        self.relinked.fetch_add(as_u64(report.relinked), Ordering::Relaxed);
        self.skipped.fetch_add(as_u64(report.skipped), Ordering::Relaxed);
        self.failures.fetch_add(as_u64(report.failed), Ordering::Relaxed);

        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.last_tick_micros.store(micros, Ordering::Relaxed);

        let mut samples = match self.tick_micros.lock() {
            Ok(guard) => guard,
            Err(poison_err) => {
                tracing::warn!(
                    metric = "SweepMetrics::tick_micros",
                    "Mutex poisoned during tick recording, recovering data"
                );
                poison_err.into_inner()
            }
        };
        samples.push_back(micros);
        if samples.len() > MAX_SAMPLES {
            samples.pop_front();
        }

        Ok(())
    }

    /// Count a scheduler start.
    pub fn record_start(&self) -> MetricsResult<()> {
        self.scheduler_starts.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Count a scheduler stop.
    pub fn record_stop(&self) -> MetricsResult<()> {
        self.scheduler_stops.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Mean duration of the recent ticks.
    ///
    /// # Errors
    /// `MetricsError::EmptyData` before the first tick.
    pub fn average_tick(&self) -> MetricsResult<Duration> {
        let samples = match self.tick_micros.lock() {
            Ok(guard) => guard,
            Err(poison_err) => poison_err.into_inner(),
        };
        if samples.is_empty() {
            return Err(MetricsError::EmptyData { metric: "average" });
        }
        let total: u64 = samples.iter().sum();
        Ok(Duration::from_micros(total / as_u64(samples.len())))
    }

    /// Copy every counter.
    pub fn snapshot(&self) -> SweepStats {
        SweepStats {
            ticks: self.ticks.load(Ordering::Relaxed),
            candidates: self.candidates.load(Ordering::Relaxed),
            persisted: self.persisted.load(Ordering::Relaxed),
            relinked: self.relinked.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            last_tick_micros: self.last_tick_micros.load(Ordering::Relaxed),
            scheduler_starts: self.scheduler_starts.load(Ordering::Relaxed),
            scheduler_stops: self.scheduler_stops.load(Ordering::Relaxed),
        }
    }
}

fn as_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
