//! Metrics collection modules

pub mod sweep;

pub use sweep::{SweepMetrics, SweepStats};
