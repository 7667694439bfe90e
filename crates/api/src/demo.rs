//! Scripted typing sessions that exercise every deduplication path.
//!
//! Pacing is derived from the completion timeout: keystrokes arrive well
//! inside the quiet period and each phase waits long enough for the sweeper
//! to pick the finished words up.

use std::time::Duration;

use searchlog_domain::Result;
use searchlog_infra::SearchLogger;
use tracing::info;

/// Words submitted whole, as if pasted.
const SEED_WORDS: [&str; 4] = ["apple", "application", "banana", "band"];

/// Words typed one keystroke at a time after the seed.
const TYPED_WORDS: [&str; 3] = ["Business", "cats", "dog"];

/// Final extension of an already stored word.
const EXTENSION: &str = "Businesses";

/// Words the demo leaves in the store.
pub const EXPECTED_WORDS: [&str; 7] =
    ["apple", "application", "banana", "band", "businesses", "cats", "dog"];

/// Delays used by [`run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoPacing {
    /// Gap between fragments of one word.
    pub keystroke: Duration,
    /// Wait after a session so the sweeper persists it.
    pub settle: Duration,
}

impl DemoPacing {
    /// Keystrokes at a tenth of the timeout, settling for two timeouts.
    pub fn from_timeout(timeout: Duration) -> Self {
        Self { keystroke: timeout / 10, settle: timeout * 2 }
    }
}

/// Replay the demo sessions and return the stored words.
pub async fn run(logger: &SearchLogger, pacing: DemoPacing) -> Result<Vec<String>> {
    info!("Session 1: 'Business' typed in order");
    type_in_order(logger, "Business", pacing).await?;
    tokio::time::sleep(pacing.settle).await;

    info!("Session 2: 'business' typed again");
    type_in_order(logger, "business", pacing).await?;

    info!("Session 3: 'business' arriving out of order");
    for fragment in prefixes("business").into_iter().rev() {
        logger.submit(fragment).await?;
        tokio::time::sleep(pacing.keystroke).await;
    }
    tokio::time::sleep(pacing.settle).await;

    info!("Session 4: whole words");
    for word in SEED_WORDS {
        logger.submit(word).await?;
    }
    for word in TYPED_WORDS {
        type_in_order(logger, word, pacing).await?;
    }
    tokio::time::sleep(pacing.settle).await;

    info!(extension = EXTENSION, "Session 5: extending a stored word");
    logger.submit(EXTENSION).await?;
    tokio::time::sleep(pacing.settle).await;

    logger.list_stored_words().await
}

async fn type_in_order(logger: &SearchLogger, word: &str, pacing: DemoPacing) -> Result<()> {
    for fragment in prefixes(word) {
        logger.submit(fragment).await?;
        tokio::time::sleep(pacing.keystroke).await;
    }
    Ok(())
}

/// Each non-empty prefix of `word`, shortest first.
fn prefixes(word: &str) -> Vec<&str> {
    word.char_indices().map(|(i, ch)| &word[..i + ch.len_utf8()]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_follow_char_boundaries() {
        assert_eq!(prefixes("dög"), vec!["d", "dö", "dög"]);
        assert!(prefixes("").is_empty());
    }

    #[test]
    fn pacing_scales_with_timeout() {
        let pacing = DemoPacing::from_timeout(Duration::from_millis(200));
        assert_eq!(pacing.keystroke, Duration::from_millis(20));
        assert_eq!(pacing.settle, Duration::from_millis(400));
    }
}
