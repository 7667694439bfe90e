//! Integration tests for AppContext lifecycle
//!
//! Tests verify that AppContext can be created against a real database, used,
//! and shut down gracefully.

use std::time::Duration;

use searchlog_api::context::AppContext;
use searchlog_domain::{Config, DatabaseConfig, DedupConfig};
use tempfile::TempDir;

/// Create a context over a temporary database.
///
/// Returns both the context and temp directory to keep temp_dir alive.
async fn create_test_context(temp_dir: &TempDir) -> searchlog_domain::Result<AppContext> {
    let config = Config {
        database: DatabaseConfig {
            path: temp_dir.path().join("searchlog.db").to_string_lossy().to_string(),
            pool_size: 2,
        },
        dedup: DedupConfig::with_timeout(Duration::from_millis(60)),
        ..Config::default()
    };

    AppContext::new(config).await
}

#[tokio::test(flavor = "multi_thread")]
async fn test_context_creation_succeeds() {
    let temp_dir = TempDir::new().expect("failed to create temporary test directory");
    let result = create_test_context(&temp_dir).await;

    assert!(result.is_ok(), "AppContext creation should succeed, got error: {:?}", result.err());
    let ctx = result.expect("checked above");
    assert!(ctx.logger.is_running());
    ctx.shutdown().await.expect("shutdown");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_shutdown_is_idempotent() {
    let temp_dir = TempDir::new().expect("failed to create temporary test directory");
    let ctx = create_test_context(&temp_dir).await.expect("context");

    ctx.shutdown().await.expect("first shutdown");
    ctx.shutdown().await.expect("second shutdown");
    assert!(!ctx.logger.is_running());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_words_survive_context_restart() {
    let temp_dir = TempDir::new().expect("failed to create temporary test directory");

    {
        let ctx = create_test_context(&temp_dir).await.expect("context");
        for fragment in ["c", "ca", "cat"] {
            ctx.logger.submit(fragment).await.expect("submit");
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(ctx.logger.list_stored_words().await.expect("list"), vec!["cat"]);
        ctx.shutdown().await.expect("shutdown");
    }

    let ctx = create_test_context(&temp_dir).await.expect("context after restart");
    ctx.logger.submit("cats").await.expect("submit");
    assert_eq!(ctx.logger.list_stored_words().await.expect("list"), vec!["cats"]);
    ctx.shutdown().await.expect("shutdown");
}
