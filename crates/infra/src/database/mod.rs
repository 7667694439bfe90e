//! Database implementations

pub mod manager;
pub mod memory_store;
pub mod search_store;

pub use manager::*;
pub use memory_store::*;
pub use search_store::*;
