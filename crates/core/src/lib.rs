//! # SearchLog Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The prefix tree that absorbs every typed fragment
//! - The deduplication engine (submit, extension detection, timeout sweep)
//! - The `SearchStore` port implemented by storage adapters
//! - A clock abstraction so timing rules can be tested deterministically
//!
//! ## Architecture Principles
//! - Only depends on `searchlog-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod clock;
pub mod dedup;

// Re-export specific items to avoid ambiguity
pub use clock::{Clock, MockClock, SystemClock};
pub use dedup::engine::{normalize_query, DedupEngine, SweepReport};
pub use dedup::ports::SearchStore;
pub use dedup::tree::{NodeId, PrefixNode, PrefixTree, TreeStats};
