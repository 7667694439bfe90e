//! Stored search record types
//!
//! A record is the durable representation of one finished search term. The
//! in-memory prefix index only keeps the [`RecordId`] of the record that
//! currently represents a word.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a stored search record.
///
/// Stable across renames: extending a stored word rewrites the record's text
/// but keeps its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl RecordId {
    /// Raw database value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A stored word together with the id of its record.
///
/// Returned by the store's listing so the startup load can restore references
/// onto the prefix index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredWord {
    /// Record holding the word.
    pub id: RecordId,
    /// Normalized search text.
    pub word: String,
}

/// Full search record as persisted by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    /// Stable identifier, kept across renames.
    pub id: RecordId,
    /// Current (longest) form of the search.
    pub word: String,
    /// When the earliest merged form was first typed.
    pub first_searched_at: DateTime<Utc>,
    /// Last upsert or rename.
    pub last_updated_at: DateTime<Utc>,
    /// Number of upserts and renames that touched this record.
    pub search_count: u32,
}

impl SearchRecord {
    /// Create a freshly inserted record.
    pub fn new(
        id: RecordId,
        word: impl Into<String>,
        first_searched_at: DateTime<Utc>,
        last_updated_at: DateTime<Utc>,
    ) -> Self {
        Self { id, word: word.into(), first_searched_at, last_updated_at, search_count: 1 }
    }

    /// Project the record onto the id/word pair used by the startup load.
    pub fn to_stored_word(&self) -> StoredWord {
        StoredWord { id: self.id, word: self.word.clone() }
    }
}
