//! SQLite-backed search store.
//!
//! Implements the `SearchStore` port on top of [`DbManager`]. All database
//! operations run in `spawn_blocking` to avoid blocking the async runtime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use searchlog_core::SearchStore;
use searchlog_domain::{
    RecordId, Result as DomainResult, SearchLogError, SearchRecord, StoredWord,
};
use tokio::task;
use tracing::{debug, info};

use super::manager::DbManager;
use crate::errors::InfraError;

/// SQLite-backed search store.
///
/// Words are unique: upserting an existing word bumps its counter, and a
/// rename onto an existing word merges the two rows.
#[derive(Debug)]
pub struct SqliteSearchStore {
    db: Arc<DbManager>,
    closed: AtomicBool,
}

impl SqliteSearchStore {
    /// Create a new store over an already migrated database.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db, closed: AtomicBool::new(false) }
    }

    /// Open the database at `config.path`, run migrations and wrap it.
    pub fn open(config: &searchlog_domain::DatabaseConfig) -> DomainResult<Self> {
        let db = DbManager::from_config(config)?;
        db.run_migrations()?;
        Ok(Self::new(Arc::new(db)))
    }

    /// Borrow the database manager.
    pub fn db(&self) -> &Arc<DbManager> {
        &self.db
    }

    fn ensure_open(&self) -> DomainResult<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(SearchLogError::Database("store closed".into()))
        } else {
            Ok(())
        }
    }

    /// Run `op` on a pooled connection inside `spawn_blocking`.
    async fn with_connection<T, F>(&self, op: F) -> DomainResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, InfraError> + Send + 'static,
    {
        self.ensure_open()?;
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<T> {
            let mut conn = db.get_connection()?;
            op(&mut conn).map_err(SearchLogError::from)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl SearchStore for SqliteSearchStore {
    async fn upsert(
        &self,
        word: &str,
        first_seen_at: DateTime<Utc>,
        last_seen_at: DateTime<Utc>,
    ) -> DomainResult<RecordId> {
        let word = word.to_string();
        self.with_connection(move |conn| upsert_search(conn, &word, first_seen_at, last_seen_at))
            .await
    }

    async fn rename(
        &self,
        id: RecordId,
        new_word: &str,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<RecordId> {
        let new_word = new_word.to_string();
        self.with_connection(move |conn| rename_search(conn, id, &new_word, updated_at)).await
    }

    async fn list_all(&self) -> DomainResult<Vec<StoredWord>> {
        self.with_connection(query_stored_words).await
    }

    async fn list_records(&self) -> DomainResult<Vec<SearchRecord>> {
        self.with_connection(query_records).await
    }

    async fn close(&self) -> DomainResult<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!(db_path = %self.db.path().display(), "search store closed");
        }
        Ok(())
    }
}

// ============================================================================
// Synchronous SQL Operations (called inside spawn_blocking)
// ============================================================================

/// Insert `word` or bump the counter of the row already holding it.
fn upsert_search(
    conn: &Connection,
    word: &str,
    first_seen_at: DateTime<Utc>,
    last_seen_at: DateTime<Utc>,
) -> Result<RecordId, InfraError> {
    let id = conn.query_row(
        "INSERT INTO searches (word, first_searched_at, last_updated_at, search_count)
         VALUES (?1, ?2, ?3, 1)
         ON CONFLICT(word) DO UPDATE SET
            search_count = search_count + 1,
            last_updated_at = excluded.last_updated_at
         RETURNING id",
        params![word, first_seen_at.timestamp_millis(), last_seen_at.timestamp_millis()],
        |row| row.get::<_, i64>(0),
    )?;

    debug!(word, record = id, "search upserted");
    Ok(RecordId(id))
}

/// Rename row `id` to `new_word`, merging into an existing row with that
/// text. Returns the id of the surviving row.
fn rename_search(
    conn: &mut Connection,
    id: RecordId,
    new_word: &str,
    updated_at: DateTime<Utc>,
) -> Result<RecordId, InfraError> {
    let tx = conn.transaction()?;
    let updated_ms = updated_at.timestamp_millis();

    let current: Option<(i64, i64)> = tx
        .query_row(
            "SELECT search_count, first_searched_at FROM searches WHERE id = ?1",
            params![id.get()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    let Some((count, first_searched_at)) = current else {
        return Err(InfraError(SearchLogError::NotFound(format!("search record {id}"))));
    };

    let existing: Option<i64> = tx
        .query_row("SELECT id FROM searches WHERE word = ?1", params![new_word], |row| row.get(0))
        .optional()?;

    let surviving = match existing {
        Some(existing) if existing != id.get() => {
            tx.execute(
                "UPDATE searches SET
                    search_count = search_count + ?1,
                    first_searched_at = MIN(first_searched_at, ?2),
                    last_updated_at = ?3
                 WHERE id = ?4",
                params![count, first_searched_at, updated_ms, existing],
            )?;
            tx.execute("DELETE FROM searches WHERE id = ?1", params![id.get()])?;
            RecordId(existing)
        }
        _ => {
            tx.execute(
                "UPDATE searches SET
                    word = ?1,
                    search_count = search_count + 1,
                    last_updated_at = ?2
                 WHERE id = ?3",
                params![new_word, updated_ms, id.get()],
            )?;
            id
        }
    };

    tx.commit()?;
    debug!(record = %surviving, new_word, "search renamed");
    Ok(surviving)
}

fn query_stored_words(conn: &mut Connection) -> Result<Vec<StoredWord>, InfraError> {
    let mut stmt = conn.prepare("SELECT id, word FROM searches ORDER BY word")?;
    let words = stmt
        .query_map(params![], |row| Ok(StoredWord { id: RecordId(row.get(0)?), word: row.get(1)? }))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(words)
}

fn query_records(conn: &mut Connection) -> Result<Vec<SearchRecord>, InfraError> {
    let mut stmt = conn.prepare(
        "SELECT id, word, first_searched_at, last_updated_at, search_count
         FROM searches
         ORDER BY word",
    )?;
    let records = stmt.query_map(params![], record_from_row)?.collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<SearchRecord> {
    Ok(SearchRecord {
        id: RecordId(row.get(0)?),
        word: row.get(1)?,
        first_searched_at: from_millis(row.get(2)?),
        last_updated_at: from_millis(row.get(3)?),
        search_count: row.get(4)?,
    })
}

fn from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Map JoinError from spawn_blocking to SearchLogError.
fn map_join_error(err: task::JoinError) -> SearchLogError {
    if err.is_cancelled() {
        SearchLogError::Internal("blocking task cancelled".into())
    } else {
        SearchLogError::Internal(format!("blocking task failed: {err}"))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tempfile::TempDir;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).single().expect("valid timestamp")
    }

    #[tokio::test]
    async fn upsert_is_keyed_by_word() {
        let (store, _dir) = setup();

        let first = store.upsert("dog", at(0), at(1)).await.expect("insert");
        let again = store.upsert("dog", at(5), at(6)).await.expect("update");
        assert_eq!(first, again);

        let records = store.list_records().await.expect("records");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].search_count, 2);
        assert_eq!(records[0].first_searched_at, at(0));
        assert_eq!(records[0].last_updated_at, at(6));
    }

    #[tokio::test]
    async fn rename_keeps_id_and_first_seen() {
        let (store, _dir) = setup();
        let id = store.upsert("business", at(0), at(0)).await.expect("insert");

        let renamed = store.rename(id, "businesses", at(10)).await.expect("rename");
        assert_eq!(renamed, id);

        let records = store.list_records().await.expect("records");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].word, "businesses");
        assert_eq!(records[0].first_searched_at, at(0));
        assert_eq!(records[0].last_updated_at, at(10));
        assert_eq!(records[0].search_count, 2);
    }

    #[tokio::test]
    async fn rename_onto_existing_word_merges_rows() {
        let (store, _dir) = setup();
        let short = store.upsert("bus", at(0), at(0)).await.expect("insert");
        let long = store.upsert("business", at(5), at(5)).await.expect("insert");

        let surviving = store.rename(short, "business", at(9)).await.expect("merge");
        assert_eq!(surviving, long);

        let records = store.list_records().await.expect("records");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, long);
        assert_eq!(records[0].first_searched_at, at(0));
        assert_eq!(records[0].search_count, 2);
    }

    #[tokio::test]
    async fn rename_of_unknown_id_is_not_found() {
        let (store, _dir) = setup();
        let err = store.rename(RecordId(404), "ghost", at(0)).await.expect_err("missing row");
        assert!(matches!(err, SearchLogError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_all_is_ordered_by_word() {
        let (store, _dir) = setup();
        for word in ["dog", "apple", "cats"] {
            store.upsert(word, at(0), at(0)).await.expect("insert");
        }

        let words: Vec<String> =
            store.list_all().await.expect("list").into_iter().map(|w| w.word).collect();
        assert_eq!(words, vec!["apple", "cats", "dog"]);
    }

    #[tokio::test]
    async fn calls_after_close_fail() {
        let (store, _dir) = setup();
        store.close().await.expect("close");
        store.close().await.expect("second close is a no-op");

        let err = store.upsert("dog", at(0), at(0)).await.expect_err("closed");
        assert_eq!(err, SearchLogError::Database("store closed".into()));
        assert!(store.list_all().await.is_err());
    }

    #[tokio::test]
    async fn data_survives_reopening() {
        let dir = TempDir::new().expect("temp dir created");
        let config = searchlog_domain::DatabaseConfig {
            path: dir.path().join("searches.db").to_string_lossy().into_owned(),
            pool_size: 2,
        };

        let id = {
            let store = SqliteSearchStore::open(&config).expect("open");
            store.upsert("business", at(0), at(0)).await.expect("insert")
        };

        let reopened = SqliteSearchStore::open(&config).expect("reopen");
        let stored = reopened.list_all().await.expect("list");
        assert_eq!(stored, vec![StoredWord { id, word: "business".into() }]);
    }

    fn setup() -> (SqliteSearchStore, TempDir) {
        let temp_dir = TempDir::new().expect("temp dir created");
        let db_path = temp_dir.path().join("searches.db");

        let mgr = Arc::new(DbManager::new(&db_path, 2).expect("db manager created"));
        mgr.run_migrations().expect("migrations run");

        (SqliteSearchStore::new(mgr), temp_dir)
    }
}
