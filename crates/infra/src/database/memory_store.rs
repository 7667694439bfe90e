//! In-memory search store.
//!
//! Same semantics as [`super::SqliteSearchStore`] without touching disk. Used
//! by the demo replay and by tests that do not care about durability.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use searchlog_core::SearchStore;
use searchlog_domain::{
    RecordId, Result as DomainResult, SearchLogError, SearchRecord, StoredWord,
};

#[derive(Debug, Default)]
struct Records {
    next_id: i64,
    by_id: BTreeMap<RecordId, SearchRecord>,
    by_word: BTreeMap<String, RecordId>,
}

/// Search store kept entirely in process memory.
#[derive(Debug, Default)]
pub struct InMemorySearchStore {
    records: RwLock<Records>,
    closed: AtomicBool,
}

impl InMemorySearchStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().by_id.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_open(&self) -> DomainResult<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(SearchLogError::Database("store closed".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SearchStore for InMemorySearchStore {
    async fn upsert(
        &self,
        word: &str,
        first_seen_at: DateTime<Utc>,
        last_seen_at: DateTime<Utc>,
    ) -> DomainResult<RecordId> {
        self.ensure_open()?;
        let mut guard = self.records.write();
        let records = &mut *guard;

        if let Some(&id) = records.by_word.get(word) {
            if let Some(existing) = records.by_id.get_mut(&id) {
                existing.search_count += 1;
                existing.last_updated_at = last_seen_at;
            }
            return Ok(id);
        }

        records.next_id += 1;
        let id = RecordId(records.next_id);
        records.by_id.insert(id, SearchRecord::new(id, word, first_seen_at, last_seen_at));
        records.by_word.insert(word.to_string(), id);
        Ok(id)
    }

    async fn rename(
        &self,
        id: RecordId,
        new_word: &str,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<RecordId> {
        self.ensure_open()?;
        let mut guard = self.records.write();
        let records = &mut *guard;

        if !records.by_id.contains_key(&id) {
            return Err(SearchLogError::NotFound(format!("search record {id}")));
        }

        match records.by_word.get(new_word).copied() {
            Some(existing) if existing != id => {
                let Some(merged) = records.by_id.remove(&id) else {
                    return Err(SearchLogError::NotFound(format!("search record {id}")));
                };
                records.by_word.remove(&merged.word);
                if let Some(target) = records.by_id.get_mut(&existing) {
                    target.search_count += merged.search_count;
                    target.first_searched_at = target.first_searched_at.min(merged.first_searched_at);
                    target.last_updated_at = updated_at;
                }
                Ok(existing)
            }
            _ => {
                if let Some(record) = records.by_id.get_mut(&id) {
                    let old_word = std::mem::replace(&mut record.word, new_word.to_string());
                    record.search_count += 1;
                    record.last_updated_at = updated_at;
                    records.by_word.remove(&old_word);
                    records.by_word.insert(new_word.to_string(), id);
                }
                Ok(id)
            }
        }
    }

    async fn list_all(&self) -> DomainResult<Vec<StoredWord>> {
        self.ensure_open()?;
        let records = self.records.read();
        Ok(records
            .by_word
            .iter()
            .map(|(word, &id)| StoredWord { id, word: word.clone() })
            .collect())
    }

    async fn list_records(&self) -> DomainResult<Vec<SearchRecord>> {
        self.ensure_open()?;
        let records = self.records.read();
        Ok(records.by_word.values().filter_map(|id| records.by_id.get(id).cloned()).collect())
    }

    async fn close(&self) -> DomainResult<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
