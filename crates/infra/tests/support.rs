use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use searchlog_domain::{DatabaseConfig, DedupConfig};
use searchlog_infra::database::{DbManager, SqliteSearchStore};
use tempfile::TempDir;

/// Completion timeout used by the real-timer integration tests.
pub const TIMEOUT: Duration = Duration::from_millis(100);

/// Temporary database directory that keeps the file alive for the duration
/// of a test run.
pub struct TestDatabase {
    pub config: DatabaseConfig,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new temporary database location.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let path: PathBuf = temp_dir.path().join("searches.db");
        let config = DatabaseConfig { path: path.to_string_lossy().into_owned(), pool_size: 4 };

        Self { config, _temp_dir: temp_dir }
    }

    /// Open (or reopen) a store over the database file.
    pub fn open_store(&self) -> Arc<SqliteSearchStore> {
        Arc::new(SqliteSearchStore::open(&self.config).expect("store should open"))
    }

    /// Raw manager for assertions that bypass the store.
    pub fn manager(&self) -> DbManager {
        DbManager::from_config(&self.config).expect("db manager should be created")
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

pub fn dedup_config() -> DedupConfig {
    DedupConfig::with_timeout(TIMEOUT)
}

/// Long enough for a word to pass the timeout and be picked up by a sweep.
pub async fn settle() {
    tokio::time::sleep(TIMEOUT * 3).await;
}

/// Each proper and full prefix of `word`, shortest first.
pub fn prefixes(word: &str) -> Vec<String> {
    word.char_indices()
        .map(|(i, ch)| word[..i + ch.len_utf8()].to_string())
        .collect()
}
