//! # SearchLog Domain
//!
//! Domain types shared by every SearchLog crate.
//!
//! This crate contains:
//! - The domain error type and `Result` alias
//! - Stored search record types
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other SearchLog crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
