//! # SearchLog API
//!
//! Application layer - context wiring and the `searchlog` binary.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - The scripted demo replay
//! - Logging setup for the binary
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod context;
pub mod demo;
pub mod utils;

// Re-export for convenience
pub use context::*;
