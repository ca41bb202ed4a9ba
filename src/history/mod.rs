//! Linear undo/redo history over committed trees
//!
//! Entries are whole-tree snapshots taken only at balanced, idle states.
//! Layout:
//!   entries[0]          initial tree (empty at session start)
//!   entries[cursor]     tree currently shown to the user
//!   entries[cursor+1..] redo tail, dropped by the next commit

use std::fmt;

use tracing::{debug, info};

use crate::tree::AvlTree;
use crate::EngineError;

/// Immutable committed tree
#[derive(Clone, PartialEq, Eq)]
pub struct TreeSnapshot {
    tree: AvlTree,
    fingerprint: blake3::Hash,
}

impl TreeSnapshot {
    /// Capture a tree; display markers are stripped
    pub fn capture(tree: &AvlTree) -> Self {
        let mut tree = tree.clone();
        tree.clear_markers();
        let fingerprint = blake3::hash(&tree.encode());
        Self { tree, fingerprint }
    }

    /// Snapshotted tree
    pub fn tree(&self) -> &AvlTree {
        &self.tree
    }

    /// Hash of the canonical encoding
    pub fn fingerprint(&self) -> &blake3::Hash {
        &self.fingerprint
    }
}

impl fmt::Debug for TreeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeSnapshot")
            .field("size", &self.tree.len())
            .field("height", &self.tree.height())
            .field("fingerprint", &self.fingerprint.to_hex().as_str())
            .finish()
    }
}

/// Undo/redo manager
#[derive(Debug)]
pub struct History {
    entries: Vec<TreeSnapshot>,
    cursor: usize,
}

impl History {
    /// Start a history whose oldest entry is `initial`
    pub fn new(initial: &AvlTree) -> Self {
        Self {
            entries: vec![TreeSnapshot::capture(initial)],
            cursor: 0,
        }
    }

    /// Record a committed tree
    ///
    /// Drops any redo tail first. Returns `false` (and records nothing) when
    /// the tree is identical to the current entry.
    pub fn commit(&mut self, tree: &AvlTree) -> bool {
        let snapshot = TreeSnapshot::capture(tree);
        if snapshot.fingerprint == self.current().fingerprint {
            debug!("commit skipped, tree unchanged");
            return false;
        }
        let dropped = self.entries.len() - self.cursor - 1;
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        self.cursor += 1;
        info!(entry = self.cursor, dropped, "history commit");
        true
    }

    /// Step back one entry and return its tree
    pub fn undo(&mut self) -> Result<AvlTree, EngineError> {
        if !self.can_undo() {
            return Err(EngineError::NothingToUndo);
        }
        self.cursor -= 1;
        debug!(entry = self.cursor, "undo");
        Ok(self.current().tree.clone())
    }

    /// Step forward one entry and return its tree
    pub fn redo(&mut self) -> Result<AvlTree, EngineError> {
        if !self.can_redo() {
            return Err(EngineError::NothingToRedo);
        }
        self.cursor += 1;
        debug!(entry = self.cursor, "redo");
        Ok(self.current().tree.clone())
    }

    /// Entry under the cursor
    pub fn current(&self) -> &TreeSnapshot {
        &self.entries[self.cursor]
    }

    /// Check if an older entry exists
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Check if a newer entry exists
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Number of entries (including the initial one)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never empty; provided for API symmetry
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor position
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Key;

    fn tree_of(values: &[Key]) -> AvlTree {
        let mut tree = AvlTree::new();
        for &v in values {
            tree.insert_raw(v).unwrap();
        }
        tree
    }

    #[test]
    fn test_undo_redo_walks_entries() {
        let mut history = History::new(&AvlTree::new());
        assert!(history.commit(&tree_of(&[1])));
        assert!(history.commit(&tree_of(&[1, 2])));
        assert_eq!(history.len(), 3);

        assert_eq!(history.undo().unwrap(), tree_of(&[1]));
        assert_eq!(history.undo().unwrap(), AvlTree::new());
        assert!(matches!(history.undo(), Err(EngineError::NothingToUndo)));

        assert_eq!(history.redo().unwrap(), tree_of(&[1]));
        assert_eq!(history.redo().unwrap(), tree_of(&[1, 2]));
        assert!(matches!(history.redo(), Err(EngineError::NothingToRedo)));
    }

    #[test]
    fn test_commit_after_undo_truncates_redo_tail() {
        let mut history = History::new(&AvlTree::new());
        history.commit(&tree_of(&[1]));
        history.commit(&tree_of(&[1, 2]));
        history.undo().unwrap();

        assert!(history.commit(&tree_of(&[1, 3])));
        assert!(!history.can_redo());
        assert_eq!(history.len(), 3);
        assert_eq!(history.current().tree(), &tree_of(&[1, 3]));
    }

    #[test]
    fn test_identical_commit_is_ignored() {
        let mut history = History::new(&AvlTree::new());
        history.commit(&tree_of(&[5]));
        let mut marked = tree_of(&[5]);
        marked.refresh_markers(Some(5));
        assert!(!history.commit(&marked));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_snapshots_are_independent_of_live_tree() {
        let mut live = tree_of(&[10]);
        let mut history = History::new(&AvlTree::new());
        history.commit(&live);
        live.insert_raw(20).unwrap();
        assert_eq!(history.current().tree().len(), 1);
    }
}
