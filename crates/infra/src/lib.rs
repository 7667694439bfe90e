//! # SearchLog Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Search stores (SQLite via r2d2, in-memory)
//! - Configuration loading (environment, TOML files)
//! - The background sweep scheduler and its metrics
//! - The `SearchLogger` service facade
//!
//! ## Architecture
//! - Implements traits defined in `searchlog-core`
//! - Depends on `searchlog-domain` and `searchlog-core`
//! - Contains all "impure" code (I/O, timers, threads)

pub mod config;
pub mod database;
pub mod errors;
pub mod observability;
pub mod scheduling;
pub mod services;

// Re-export commonly used items
pub use database::{DbManager, InMemorySearchStore, SqliteSearchStore};
pub use errors::InfraError;
pub use observability::metrics::{SweepMetrics, SweepStats};
pub use scheduling::{SchedulerError, SweepScheduler};
pub use services::SearchLogger;
