//! Keystroke deduplication
//!
//! - [`tree`]: arena-backed prefix tree, structural operations only
//! - [`engine`]: submit/sweep/load orchestration under a single lock
//! - [`ports`]: the storage contract the engine persists finished words to

pub mod engine;
pub mod ports;
pub mod tree;
