//! Service layer implementations.
//!
//! Services wire core engines to infrastructure adapters and own their
//! background tasks.

pub mod search_logger;

pub use search_logger::SearchLogger;
