//! Recording in-memory `SearchStore` for engine tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use searchlog_core::SearchStore;
use searchlog_domain::{
    RecordId, Result as DomainResult, SearchLogError, SearchRecord, StoredWord,
};

#[derive(Default)]
struct State {
    next_id: i64,
    records: BTreeMap<RecordId, SearchRecord>,
    closed: bool,
}

/// In-memory store that counts calls and can be told to fail.
///
/// Mirrors the SQLite adapter: upsert is keyed by word text, rename keeps the
/// id and merges into an existing record holding the new text.
#[derive(Default)]
pub struct RecordingStore {
    state: Mutex<State>,
    upserts: AtomicUsize,
    renames: AtomicUsize,
    failing_upserts: AtomicUsize,
    failing_renames: AtomicUsize,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing the call counters.
    pub fn seed(&self, word: &str) -> RecordId {
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = RecordId(state.next_id);
        let now = Utc::now();
        state.records.insert(id, SearchRecord::new(id, word, now, now));
        id
    }

    /// Make the next `count` upserts fail.
    pub fn fail_next_upserts(&self, count: usize) {
        self.failing_upserts.store(count, Ordering::SeqCst);
    }

    /// Make the next `count` renames fail.
    pub fn fail_next_renames(&self, count: usize) {
        self.failing_renames.store(count, Ordering::SeqCst);
    }

    pub fn upsert_calls(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub fn rename_calls(&self) -> usize {
        self.renames.load(Ordering::SeqCst)
    }

    /// Stored words in lexicographic order.
    pub fn words(&self) -> Vec<String> {
        let state = self.state.lock();
        let mut words: Vec<String> = state.records.values().map(|r| r.word.clone()).collect();
        words.sort();
        words
    }

    pub fn record(&self, word: &str) -> Option<SearchRecord> {
        self.state.lock().records.values().find(|r| r.word == word).cloned()
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl SearchStore for RecordingStore {
    async fn upsert(
        &self,
        word: &str,
        first_seen_at: DateTime<Utc>,
        last_seen_at: DateTime<Utc>,
    ) -> DomainResult<RecordId> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.failing_upserts) {
            return Err(SearchLogError::Database("injected upsert failure".into()));
        }

        let mut state = self.state.lock();
        if state.closed {
            return Err(SearchLogError::Database("store closed".into()));
        }
        if let Some(existing) = state.records.values_mut().find(|r| r.word == word) {
            existing.search_count += 1;
            existing.last_updated_at = last_seen_at;
            return Ok(existing.id);
        }

        state.next_id += 1;
        let id = RecordId(state.next_id);
        state.records.insert(id, SearchRecord::new(id, word, first_seen_at, last_seen_at));
        Ok(id)
    }

    async fn rename(
        &self,
        id: RecordId,
        new_word: &str,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<RecordId> {
        self.renames.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.failing_renames) {
            return Err(SearchLogError::Database("injected rename failure".into()));
        }

        let mut state = self.state.lock();
        if state.closed {
            return Err(SearchLogError::Database("store closed".into()));
        }
        let Some(mut renamed) = state.records.remove(&id) else {
            return Err(SearchLogError::NotFound(format!("search record {id}")));
        };

        if let Some(existing) = state.records.values_mut().find(|r| r.word == new_word) {
            existing.search_count += renamed.search_count;
            existing.first_searched_at = existing.first_searched_at.min(renamed.first_searched_at);
            existing.last_updated_at = updated_at;
            return Ok(existing.id);
        }

        renamed.word = new_word.to_string();
        renamed.search_count += 1;
        renamed.last_updated_at = updated_at;
        state.records.insert(id, renamed);
        Ok(id)
    }

    async fn list_all(&self) -> DomainResult<Vec<StoredWord>> {
        let mut words: Vec<StoredWord> =
            self.list_records().await?.iter().map(SearchRecord::to_stored_word).collect();
        words.sort_by(|a, b| a.word.cmp(&b.word));
        Ok(words)
    }

    async fn list_records(&self) -> DomainResult<Vec<SearchRecord>> {
        let state = self.state.lock();
        if state.closed {
            return Err(SearchLogError::Database("store closed".into()));
        }
        let mut records: Vec<SearchRecord> = state.records.values().cloned().collect();
        records.sort_by(|a, b| a.word.cmp(&b.word));
        Ok(records)
    }

    async fn close(&self) -> DomainResult<()> {
        self.state.lock().closed = true;
        Ok(())
    }
}
