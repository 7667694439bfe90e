//! Time abstraction for testability
//!
//! The engine reads "now" through [`Clock`] so timeout rules can be exercised
//! without sleeping.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use searchlog_core::clock::{Clock, MockClock};
//!
//! let mock = MockClock::new();
//! let start = mock.now();
//! mock.advance(Duration::from_secs(5));
//! assert_eq!(mock.now().duration_since(start), Duration::from_secs(5));
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Source of monotonic and wall-clock time.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Monotonic timestamp used for typing activity and timeouts.
    fn now(&self) -> Instant;

    /// Wall-clock timestamp handed to the store.
    fn utc_now(&self) -> DateTime<Utc>;

    /// Wall-clock time corresponding to an earlier monotonic reading.
    fn utc_at(&self, instant: Instant) -> DateTime<Utc> {
        let age = self.now().saturating_duration_since(instant);
        chrono::Duration::from_std(age)
            .ok()
            .and_then(|age| self.utc_now().checked_sub_signed(age))
            .unwrap_or_else(|| self.utc_now())
    }
}

/// Real system clock. Use this in production code.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Mock clock for deterministic testing.
///
/// Starts at the real current time and only moves when advanced. Clones share
/// the same elapsed time.
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    base_utc: DateTime<Utc>,
    elapsed: Arc<Mutex<Duration>>,
}

impl MockClock {
    /// Create a new mock clock.
    pub fn new() -> Self {
        Self { start: Instant::now(), base_utc: Utc::now(), elapsed: Arc::new(Mutex::new(Duration::ZERO)) }
    }

    /// Simulate time passing without waiting.
    pub fn advance(&self, duration: Duration) {
        *self.elapsed.lock() += duration;
    }

    /// Time simulated since the clock was created.
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        chrono::Duration::from_std(self.elapsed())
            .ok()
            .and_then(|elapsed| self.base_utc.checked_add_signed(elapsed))
            .unwrap_or(self.base_utc)
    }
}
