//! Scheduling infrastructure for the background timeout sweep
//!
//! The sweep scheduler follows the runtime rules used across this crate:
//! - Explicit lifecycle management (start/stop)
//! - Join handles for spawned tasks
//! - Cancellation token support
//! - Timeout wrapping when joining the task
//! - Structured tracing with `SweepMetrics` integration

pub mod error;
pub mod sweep_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use sweep_scheduler::SweepScheduler;
