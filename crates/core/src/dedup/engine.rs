//! Deduplication engine - core business logic
//!
//! Every keystroke arrives as a fresh fragment. The engine records each one in
//! a [`PrefixTree`], persists a word once it has been quiet for the completion
//! timeout, and, when a longer word later extends a persisted one, renames the
//! stored record instead of writing a second one.
//!
//! One exclusive lock guards the tree. `submit` and `sweep` hold it across
//! their store calls, so a slow store throttles both. Listing goes straight to
//! the store and never touches the tree.

use std::sync::Arc;
use std::time::{Duration, Instant};

use searchlog_domain::{RecordId, Result, SearchRecord};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::ports::SearchStore;
use super::tree::{NodeId, PrefixTree, TreeStats};
use crate::clock::{Clock, SystemClock};

/// Trim surrounding whitespace and lowercase. `None` when nothing remains.
pub fn normalize_query(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Typed words whose quiet period has elapsed.
    pub candidates: usize,
    /// Words written to the store by this pass.
    pub persisted: usize,
    /// Words that took over the record of a persisted ancestor.
    pub relinked: usize,
    /// Stepping stones: a longer word was typed after them.
    pub skipped: usize,
    /// Words that already hold a record.
    pub already_persisted: usize,
    /// Store calls that failed; retried on the next pass.
    pub failed: usize,
}

impl SweepReport {
    /// Returns `true` if the pass changed the store.
    pub fn wrote_anything(&self) -> bool {
        self.persisted > 0 || self.relinked > 0
    }
}

/// Prefix-aware deduplication of typed search queries.
pub struct DedupEngine {
    tree: RwLock<PrefixTree>,
    store: Arc<dyn SearchStore>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl std::fmt::Debug for DedupEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DedupEngine")
            .field("timeout", &self.timeout)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl DedupEngine {
    /// Create an engine driven by the system clock.
    pub fn new(store: Arc<dyn SearchStore>, timeout: Duration) -> Self {
        Self::with_clock(store, timeout, Arc::new(SystemClock))
    }

    /// Create an engine with an explicit clock (tests use [`crate::MockClock`]).
    pub fn with_clock(store: Arc<dyn SearchStore>, timeout: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { tree: RwLock::new(PrefixTree::new()), store, clock, timeout }
    }

    /// Quiet period after which a word counts as finished.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Store the engine writes to.
    pub fn store(&self) -> &Arc<dyn SearchStore> {
        &self.store
    }

    /// Record one typed fragment.
    ///
    /// When the fragment extends a word that is already stored, that record
    /// is renamed to the fragment before this returns. A failed rename is
    /// returned as-is; the fragment stays recorded and the rename is retried
    /// by the next submit of the same word or by the sweep.
    pub async fn submit(&self, raw: &str) -> Result<()> {
        let Some(word) = normalize_query(raw) else {
            debug!("Ignoring empty query fragment");
            return Ok(());
        };

        let mut tree = self.tree.write().await;
        let path = tree.insert_path(&word);
        let Some(&target) = path.last() else {
            return Ok(());
        };
        tree.node_mut(target).touch(self.clock.now());

        self.relink_superseded(&mut tree, &path, &word).await?;
        Ok(())
    }

    /// Move the record of every completed proper prefix on `path` onto the
    /// node for `word`. Returns how many records were moved.
    async fn relink_superseded(
        &self,
        tree: &mut PrefixTree,
        path: &[NodeId],
        word: &str,
    ) -> Result<usize> {
        let Some((&target, ancestors)) = path.split_last() else {
            return Ok(0);
        };

        let mut moved = 0;
        for (depth, &ancestor) in ancestors.iter().enumerate() {
            let node = tree.node(ancestor);
            let Some(record) = node.record().filter(|_| node.is_completed()) else {
                continue;
            };

            let surviving = self.store.rename(record, word, self.clock.utc_now()).await?;
            tree.node_mut(ancestor).take_record();
            let target_node = tree.node_mut(target);
            target_node.set_record(surviving);
            target_node.mark_completed();
            moved += 1;

            info!(
                from = prefix_chars(word, depth + 1),
                to = word,
                record = %surviving,
                "Stored search extended"
            );
        }

        Ok(moved)
    }

    /// Persist every word that has been quiet for at least the timeout.
    ///
    /// Store failures are logged and counted per word; the word stays
    /// eligible and is retried on the next pass.
    #[instrument(skip(self))]
    pub async fn sweep(&self) -> SweepReport {
        let mut tree = self.tree.write().await;
        let now = self.clock.now();
        let timeout = self.timeout;
        let due = tree.collect_typed(|last| now.saturating_duration_since(last) >= timeout);

        let mut report = SweepReport { candidates: due.len(), ..SweepReport::default() };

        for (word, id) in due {
            if tree.node(id).record().is_some() {
                report.already_persisted += 1;
                continue;
            }
            if tree.has_typed_descendant(id) {
                report.skipped += 1;
                continue;
            }

            match self.complete_word(&mut tree, &word, id).await {
                Ok(Completion::Relinked) => report.relinked += 1,
                Ok(Completion::Persisted(record)) => {
                    report.persisted += 1;
                    info!(word = %word, record = %record, "Search persisted");
                }
                Err(err) => {
                    report.failed += 1;
                    warn!(word = %word, error = %err, "Failed to persist search; will retry");
                }
            }
        }

        report
    }

    async fn complete_word(
        &self,
        tree: &mut PrefixTree,
        word: &str,
        id: NodeId,
    ) -> Result<Completion> {
        // An ancestor still holding a record means an earlier rename failed.
        if let Some(path) = tree.path(word) {
            if self.relink_superseded(tree, &path, word).await? > 0 {
                return Ok(Completion::Relinked);
            }
        }

        let node = tree.node(id);
        let last = node.last_typed().unwrap_or_else(|| self.clock.now());
        let first = node.first_typed().unwrap_or(last);
        let first_seen = self.clock.utc_at(first);
        let last_seen = self.clock.utc_at(last);

        tree.node_mut(id).mark_completed();
        let record = self.store.upsert(word, first_seen, last_seen).await?;
        tree.node_mut(id).set_record(record);
        Ok(Completion::Persisted(record))
    }

    /// Rebuild the tree from the store. Call once before the first submit.
    ///
    /// Each stored word becomes a completed, typed node holding its record.
    /// When two stored words lie on one path the shorter one is renamed onto
    /// the longer (the store merges them). Returns the number of words read.
    #[instrument(skip(self))]
    pub async fn load_existing(&self) -> Result<usize> {
        let stored = self.store.list_all().await?;
        let mut tree = self.tree.write().await;
        let now = self.clock.now();

        let mut words = Vec::with_capacity(stored.len());
        for entry in stored {
            let Some(word) = normalize_query(&entry.word) else {
                warn!(record = %entry.id, "Skipping stored search with empty text");
                continue;
            };
            let path = tree.insert_path(&word);
            let Some(&target) = path.last() else {
                continue;
            };
            let node = tree.node_mut(target);
            node.touch(now);
            node.mark_completed();
            node.set_record(entry.id);
            words.push((word, path));
        }

        words.sort_by_key(|(word, _)| word.chars().count());
        for (word, path) in &words {
            if let Err(err) = self.relink_superseded(&mut tree, path, word).await {
                warn!(word = %word, error = %err, "Failed to merge stored prefix duplicate");
            }
        }

        info!(count = words.len(), "Loaded stored searches");
        Ok(words.len())
    }

    /// Every word currently in the store.
    ///
    /// Each store call is atomic, so a rename is never observed half applied.
    pub async fn list_stored_words(&self) -> Result<Vec<String>> {
        let stored = self.store.list_all().await?;
        Ok(stored.into_iter().map(|entry| entry.word).collect())
    }

    /// Every stored record including visit counts.
    pub async fn list_records(&self) -> Result<Vec<SearchRecord>> {
        self.store.list_records().await
    }

    /// Returns `true` if a longer word starting with `raw` has been typed.
    pub async fn is_prefix_of_any_active_word(&self, raw: &str) -> bool {
        let Some(word) = normalize_query(raw) else {
            return false;
        };
        let tree = self.tree.read().await;
        tree.find(&word).is_some_and(|id| tree.has_typed_descendant(id))
    }

    /// Counters describing the in-memory tree.
    pub async fn stats(&self) -> TreeStats {
        self.tree.read().await.counts()
    }

    /// Every word whose node currently holds a record, in lexicographic order.
    pub async fn persisted_words(&self) -> Vec<(String, RecordId)> {
        let tree = self.tree.read().await;
        tree.collect_typed(|_| true)
            .into_iter()
            .filter_map(|(word, id)| tree.node(id).record().map(|record| (word, record)))
            .collect()
    }

    /// When `raw` was last submitted, if ever.
    pub async fn last_typed(&self, raw: &str) -> Option<Instant> {
        let word = normalize_query(raw)?;
        let tree = self.tree.read().await;
        tree.find(&word).and_then(|id| tree.node(id).last_typed())
    }
}

enum Completion {
    Persisted(RecordId),
    Relinked,
}

/// The first `count` characters of `word`.
fn prefix_chars(word: &str, count: usize) -> &str {
    word.char_indices().nth(count).map_or(word, |(end, _)| &word[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_query("  Business \n"), Some("business".to_string()));
        assert_eq!(normalize_query("ÉCOLE"), Some("école".to_string()));
        assert_eq!(normalize_query("   "), None);
        assert_eq!(normalize_query(""), None);
    }

    #[test]
    fn prefix_chars_respects_char_boundaries() {
        assert_eq!(prefix_chars("business", 3), "bus");
        assert_eq!(prefix_chars("café", 4), "café");
        assert_eq!(prefix_chars("naïve", 3), "naï");
    }

    #[test]
    fn report_flags_writes() {
        assert!(!SweepReport::default().wrote_anything());
        assert!(SweepReport { relinked: 1, ..SweepReport::default() }.wrote_anything());
        assert!(SweepReport { persisted: 2, ..SweepReport::default() }.wrote_anything());
    }
}
