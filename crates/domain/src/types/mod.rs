//! Domain types
//!
//! - [`record`]: stored search records and their identifiers

pub mod record;

pub use record::{RecordId, SearchRecord, StoredWord};
