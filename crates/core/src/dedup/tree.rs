//! Prefix tree of every fragment ever submitted.
//!
//! ## Layout
//! Nodes live inside a `Vec<PrefixNode>` and reference children through
//! [`NodeId`] handles, so each node has exactly one parent and the tree never
//! needs pointer juggling. Index `0` is the root (the empty prefix).
//!
//! ## Complexity
//! - `insert_path` and `find` run in `O(m)` for `m` characters.
//! - `has_typed_descendant` and `collect_typed` walk the affected subtree
//!   with an explicit stack, so deep words cannot overflow the call stack.
//!
//! ## Unicode considerations
//! Strings are iterated with `chars()`; each Unicode scalar value is one
//! edge. Callers normalize input before it reaches the tree.
//!
//! The tree has no locking or timing policy of its own. Nodes are never
//! removed.

use std::collections::HashMap;
use std::time::Instant;

use searchlog_domain::RecordId;

/// Handle of a node inside a [`PrefixTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// State attached to one prefix.
#[derive(Debug, Clone, Default)]
pub struct PrefixNode {
    children: HashMap<char, NodeId>,
    completed: bool,
    first_typed: Option<Instant>,
    last_typed: Option<Instant>,
    record: Option<RecordId>,
}

impl PrefixNode {
    /// True once this prefix was treated as a finished word.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// When this exact string was last submitted, if ever.
    pub fn last_typed(&self) -> Option<Instant> {
        self.last_typed
    }

    /// When this exact string was first submitted, if ever.
    pub fn first_typed(&self) -> Option<Instant> {
        self.first_typed
    }

    /// Id of the stored record currently representing this word.
    pub fn record(&self) -> Option<RecordId> {
        self.record
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Record that this exact string was submitted at `at`.
    pub fn touch(&mut self, at: Instant) {
        self.first_typed.get_or_insert(at);
        self.last_typed = Some(at);
    }

    /// Flag the prefix as a finished word.
    pub fn mark_completed(&mut self) {
        self.completed = true;
    }

    /// Attach the id of the record representing this word.
    pub fn set_record(&mut self, id: RecordId) {
        self.record = Some(id);
    }

    /// Detach and return the record id, if any.
    pub fn take_record(&mut self) -> Option<RecordId> {
        self.record.take()
    }
}

/// Counters describing the current tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Nodes excluding the root.
    pub nodes: usize,
    /// Nodes whose exact string was submitted or loaded.
    pub typed: usize,
    /// Nodes flagged as finished words.
    pub completed: usize,
    /// Nodes holding a record reference.
    pub persisted: usize,
}

/// Arena-backed prefix tree.
#[derive(Debug, Clone)]
pub struct PrefixTree {
    nodes: Vec<PrefixNode>,
}

impl Default for PrefixTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefixTree {
    const ROOT: NodeId = NodeId(0);

    /// Creates a tree holding only the root.
    pub fn new() -> Self {
        Self { nodes: vec![PrefixNode::default()] }
    }

    /// Handle of the root node (the empty prefix).
    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    /// Walks `word` from the root, creating missing nodes one character at a
    /// time. Returns the node of every prefix of `word`, shortest first; the
    /// last element is the node for `word` itself.
    pub fn insert_path(&mut self, word: &str) -> Vec<NodeId> {
        let mut path = Vec::with_capacity(word.len());
        let mut current = Self::ROOT;

        for ch in word.chars() {
            let next = match self.nodes[current.0].children.get(&ch) {
                Some(&id) => id,
                None => {
                    let id = NodeId(self.nodes.len());
                    self.nodes.push(PrefixNode::default());
                    self.nodes[current.0].children.insert(ch, id);
                    id
                }
            };
            path.push(next);
            current = next;
        }

        path
    }

    /// Node chain of `word` without creating anything. `None` when some
    /// prefix of `word` was never inserted.
    pub fn path(&self, word: &str) -> Option<Vec<NodeId>> {
        let mut path = Vec::with_capacity(word.len());
        let mut current = Self::ROOT;
        for ch in word.chars() {
            current = *self.nodes[current.0].children.get(&ch)?;
            path.push(current);
        }
        Some(path)
    }

    /// Node for `word`, if it was ever inserted.
    pub fn find(&self, word: &str) -> Option<NodeId> {
        let mut current = Self::ROOT;
        for ch in word.chars() {
            current = *self.nodes[current.0].children.get(&ch)?;
        }
        Some(current)
    }

    /// Shared access to a node.
    pub fn node(&self, id: NodeId) -> &PrefixNode {
        &self.nodes[id.0]
    }

    /// Exclusive access to a node.
    pub fn node_mut(&mut self, id: NodeId) -> &mut PrefixNode {
        &mut self.nodes[id.0]
    }

    /// Returns `true` if any strict descendant of `id` was ever typed.
    pub fn has_typed_descendant(&self, id: NodeId) -> bool {
        let mut stack: Vec<NodeId> = self.nodes[id.0].children.values().copied().collect();
        while let Some(current) = stack.pop() {
            let node = &self.nodes[current.0];
            if node.last_typed.is_some() {
                return true;
            }
            stack.extend(node.children.values().copied());
        }
        false
    }

    /// Depth-first enumeration of every typed node whose last activity
    /// satisfies `is_due`, paired with its full string. Siblings are visited
    /// in character order, so the output is lexicographic.
    pub fn collect_typed<F>(&self, is_due: F) -> Vec<(String, NodeId)>
    where
        F: Fn(Instant) -> bool,
    {
        let mut due = Vec::new();
        let mut stack = vec![(Self::ROOT, String::new())];

        while let Some((id, prefix)) = stack.pop() {
            let node = &self.nodes[id.0];
            if node.last_typed.is_some_and(&is_due) {
                due.push((prefix.clone(), id));
            }

            let mut children: Vec<(char, NodeId)> =
                node.children.iter().map(|(&ch, &child)| (ch, child)).collect();
            children.sort_unstable_by(|a, b| b.0.cmp(&a.0));
            for (ch, child) in children {
                let mut next = prefix.clone();
                next.push(ch);
                stack.push((child, next));
            }
        }

        due
    }

    /// Number of nodes excluding the root.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Returns `true` if nothing was ever inserted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of nodes whose exact string was submitted or loaded.
    pub fn typed_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.last_typed.is_some()).count()
    }

    /// Counters over every node.
    pub fn counts(&self) -> TreeStats {
        self.nodes.iter().skip(1).fold(
            TreeStats { nodes: self.len(), ..TreeStats::default() },
            |mut counts, node| {
                counts.typed += usize::from(node.last_typed.is_some());
                counts.completed += usize::from(node.completed);
                counts.persisted += usize::from(node.record.is_some());
                counts
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn insert_path_creates_one_node_per_character() {
        let mut tree = PrefixTree::new();
        let path = tree.insert_path("bus");
        assert_eq!(path.len(), 3);
        assert_eq!(tree.len(), 3);

        let again = tree.insert_path("business");
        assert_eq!(&again[..3], &path[..]);
        assert_eq!(tree.len(), 8);
    }

    #[test]
    fn find_and_path_do_not_create_nodes() {
        let mut tree = PrefixTree::new();
        tree.insert_path("cat");

        assert!(tree.find("ca").is_some());
        assert!(tree.find("cats").is_none());
        assert!(tree.path("dog").is_none());
        assert_eq!(tree.path("cat").map(|p| p.len()), Some(3));
        assert_eq!(tree.find(""), Some(tree.root()));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn multibyte_characters_are_single_edges() {
        let mut tree = PrefixTree::new();
        let path = tree.insert_path("café");
        assert_eq!(path.len(), 4);
        assert!(tree.find("caf\u{e9}").is_some());
    }

    #[test]
    fn typed_descendant_ignores_untyped_intermediate_nodes() {
        let mut tree = PrefixTree::new();
        let now = Instant::now();
        tree.insert_path("application");
        let app = tree.find("app").expect("app exists");
        assert!(!tree.has_typed_descendant(app));

        let leaf = tree.find("application").expect("leaf exists");
        tree.node_mut(leaf).touch(now);
        assert!(tree.has_typed_descendant(app));
        assert!(!tree.has_typed_descendant(leaf));
    }

    #[test]
    fn collect_typed_returns_lexicographic_due_words() {
        let mut tree = PrefixTree::new();
        let start = Instant::now();
        for word in ["banana", "apple", "band", "app"] {
            let id = *tree.insert_path(word).last().expect("non-empty word");
            tree.node_mut(id).touch(start);
        }
        let fresh = tree.find("band").expect("band exists");
        tree.node_mut(fresh).touch(start + Duration::from_secs(10));

        let cutoff = start + Duration::from_secs(1);
        let due: Vec<String> =
            tree.collect_typed(|at| at < cutoff).into_iter().map(|(word, _)| word).collect();
        assert_eq!(due, vec!["app", "apple", "banana"]);
    }

    #[test]
    fn touch_keeps_first_typed() {
        let mut node = PrefixNode::default();
        let first = Instant::now();
        let later = first + Duration::from_secs(5);
        node.touch(first);
        node.touch(later);
        assert_eq!(node.first_typed(), Some(first));
        assert_eq!(node.last_typed(), Some(later));
    }

    #[test]
    fn counts_track_node_state() {
        let mut tree = PrefixTree::new();
        let id = *tree.insert_path("dog").last().expect("non-empty word");
        tree.node_mut(id).touch(Instant::now());
        tree.node_mut(id).mark_completed();
        tree.node_mut(id).set_record(RecordId(9));

        assert_eq!(tree.counts(), TreeStats { nodes: 3, typed: 1, completed: 1, persisted: 1 });
        assert_eq!(tree.typed_count(), 1);
        assert_eq!(tree.node_mut(id).take_record(), Some(RecordId(9)));
        assert_eq!(tree.counts().persisted, 0);
    }
}
