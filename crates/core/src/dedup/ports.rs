//! Port interface for search record storage
//!
//! The engine depends on storage only through this trait. Each call is
//! assumed to be independently atomic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use searchlog_domain::{RecordId, Result, SearchRecord, StoredWord};

/// Durable storage for finished search words.
#[async_trait]
pub trait SearchStore: Send + Sync {
    /// Insert `word`, or bump the visit counter of the record that already
    /// holds exactly this text. Returns the record's stable id.
    async fn upsert(
        &self,
        word: &str,
        first_seen_at: DateTime<Utc>,
        last_seen_at: DateTime<Utc>,
    ) -> Result<RecordId>;

    /// Rewrite the text of record `id` to `new_word` in place.
    ///
    /// When another record already holds `new_word` the two are merged and
    /// the existing record's id survives. Returns the id now carrying
    /// `new_word`. An unknown `id` is `SearchLogError::NotFound`.
    async fn rename(
        &self,
        id: RecordId,
        new_word: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<RecordId>;

    /// Every stored word with its record id, ordered by word.
    async fn list_all(&self) -> Result<Vec<StoredWord>>;

    /// Every stored record, ordered by word.
    async fn list_records(&self) -> Result<Vec<SearchRecord>>;

    /// Release resources. Later calls fail with `SearchLogError::Database`.
    async fn close(&self) -> Result<()>;
}
