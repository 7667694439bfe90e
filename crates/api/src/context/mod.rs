//! Application context - dependency injection container

use std::sync::Arc;

use searchlog_core::SearchStore;
use searchlog_domain::{Config, Result};
use searchlog_infra::{InMemorySearchStore, SearchLogger, SqliteSearchStore};
use tracing::info;

/// Application context - holds the logger and the store it writes to
pub struct AppContext {
    /// Configuration the context was built from.
    pub config: Config,
    /// Store shared by the logger.
    pub store: Arc<dyn SearchStore>,
    /// Running logger; stopped by [`AppContext::shutdown`].
    pub logger: Arc<SearchLogger>,
}

impl AppContext {
    /// Create a context backed by the SQLite database at `config.database`.
    ///
    /// Runs migrations before the logger loads stored words.
    pub async fn new(config: Config) -> Result<Self> {
        let store = Arc::new(SqliteSearchStore::open(&config.database)?);
        info!(db_path = %config.database.path, "Opened search database");
        Self::with_store(config, store).await
    }

    /// Create a context backed by a fresh in-memory store.
    pub async fn new_in_memory(config: Config) -> Result<Self> {
        Self::with_store(config, Arc::new(InMemorySearchStore::new())).await
    }

    /// Create a context around an existing store.
    pub async fn with_store(config: Config, store: Arc<dyn SearchStore>) -> Result<Self> {
        let logger = SearchLogger::start(&config.dedup, Arc::clone(&store)).await?;
        Ok(Self { config, store, logger: Arc::new(logger) })
    }

    /// Stop the sweeper and close the store.
    ///
    /// Idempotent (can be called multiple times safely). Words still inside
    /// their quiet period are dropped.
    pub async fn shutdown(&self) -> Result<()> {
        info!("shutdown called on AppContext");
        self.logger.shutdown().await
    }
}
