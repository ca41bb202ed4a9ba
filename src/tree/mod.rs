//! Binary search tree container
//!
//! Raw structural operations only: insert and delete keep the BST ordering
//! and the cached heights correct, but never rebalance. Rebalancing is
//! decided by the oracle and carried out through the rotation algebra.

mod node;
mod traversal;

pub use node::{height_of, Link, Marker, Node};
pub use traversal::{collect, for_each_post_order, TraversalOrder};

use crate::EngineError;
use std::cmp::Ordering;

/// Tree key
pub type Key = i64;

/// AVL tree (single ownership hierarchy rooted at `root`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvlTree {
    root: Link,
    size: usize,
}

impl AvlTree {
    /// Create empty tree
    pub fn new() -> Self {
        Self { root: None, size: 0 }
    }

    /// Root node, if any
    pub fn root(&self) -> Option<&Node> {
        self.root.as_deref()
    }

    /// Root link (for read-only walkers such as the renderer)
    pub fn root_link(&self) -> &Link {
        &self.root
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.size
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Tree height (empty = 0)
    pub fn height(&self) -> usize {
        height_of(&self.root)
    }

    /// Look up a node by key
    pub fn find(&self, value: Key) -> Option<&Node> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match value.cmp(&node.value) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(node),
            };
        }
        None
    }

    /// Check membership
    pub fn contains(&self, value: Key) -> bool {
        self.find(value).is_some()
    }

    /// Smallest key
    pub fn min(&self) -> Option<Key> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some(node.value)
    }

    /// Largest key
    pub fn max(&self) -> Option<Key> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some(node.value)
    }

    /// Standard BST insert (no rebalancing)
    pub fn insert_raw(&mut self, value: Key) -> Result<(), EngineError> {
        if self.contains(value) {
            return Err(EngineError::DuplicateValue(value));
        }
        insert_node(&mut self.root, value);
        self.size += 1;
        debug_assert!(self.check_invariants(), "insert_raw broke BST invariants");
        Ok(())
    }

    /// Standard BST delete (no rebalancing)
    ///
    /// A node with two children takes its in-order successor's value and the
    /// successor is unlinked instead. Returns the anchor: the lowest
    /// surviving node whose subtree lost a node (the parent of the physically
    /// removed node), or `None` when no ancestor was affected.
    pub fn delete_raw(&mut self, value: Key) -> Result<Option<Key>, EngineError> {
        let anchor = self.removal_anchor(value)?;
        delete_node(&mut self.root, value);
        self.size -= 1;
        debug_assert!(self.check_invariants(), "delete_raw broke BST invariants");
        Ok(anchor)
    }

    /// Keys from `value` up to the root (bottom-up); empty if absent
    pub fn find_path_to_root(&self, value: Key) -> Vec<Key> {
        let mut path = Vec::new();
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            path.push(node.value);
            current = match value.cmp(&node.value) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => {
                    path.reverse();
                    return path;
                }
            };
        }
        Vec::new()
    }

    /// Keys in the requested DFS order
    pub fn traverse(&self, order: TraversalOrder) -> Vec<Key> {
        collect(&self.root, order)
    }

    /// Mutable access to the link slot holding `value`
    ///
    /// Rotations replace the box in place, which re-links the new subtree
    /// root into the parent (or the tree root) without parent pointers.
    pub(crate) fn slot_mut(&mut self, value: Key) -> Option<&mut Box<Node>> {
        let mut current = self.root.as_mut()?;
        loop {
            match value.cmp(&current.value) {
                Ordering::Less => current = current.left.as_mut()?,
                Ordering::Greater => current = current.right.as_mut()?,
                Ordering::Equal => return Some(current),
            }
        }
    }

    /// Recompute heights on the root-to-`value` path, bottom-up
    pub(crate) fn refresh_heights_to(&mut self, value: Key) {
        refresh_path(&mut self.root, value);
    }

    /// Remove every node
    pub fn clear(&mut self) {
        self.root = None;
        self.size = 0;
    }

    /// Reset markers, then flag unbalanced nodes and the recent insertion
    pub fn refresh_markers(&mut self, recent: Option<Key>) {
        self.for_each_node_mut(|node| {
            node.marker = if Some(node.value) == recent {
                Marker::RecentlyAdded
            } else if node.balance_factor().abs() > 1 {
                Marker::Unbalanced
            } else {
                Marker::None
            };
        });
    }

    /// Reset every marker to `Marker::None`
    pub fn clear_markers(&mut self) {
        self.for_each_node_mut(|node| node.marker = Marker::None);
    }

    /// Preorder (value, height) pairs; equal shapes mean structurally
    /// identical trees since a BST is determined by its preorder
    pub fn shape(&self) -> Vec<(Key, usize)> {
        let mut out = Vec::with_capacity(self.size);
        let mut stack: Vec<&Node> = self.root.as_deref().into_iter().collect();
        while let Some(node) = stack.pop() {
            out.push((node.value, node.height));
            if let Some(r) = node.right.as_deref() {
                stack.push(r);
            }
            if let Some(l) = node.left.as_deref() {
                stack.push(l);
            }
        }
        out
    }

    /// Canonical byte encoding (preorder, presence tag, key, height)
    ///
    /// Markers are excluded: two trees with the same structure encode to the
    /// same bytes regardless of display emphasis.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.size * 13);
        let mut stack: Vec<Option<&Node>> = vec![self.root.as_deref()];
        while let Some(entry) = stack.pop() {
            match entry {
                None => out.push(0),
                Some(node) => {
                    out.push(1);
                    out.extend_from_slice(&node.value.to_le_bytes());
                    out.extend_from_slice(&(node.height as u32).to_le_bytes());
                    stack.push(node.right.as_deref());
                    stack.push(node.left.as_deref());
                }
            }
        }
        out
    }

    /// Heights, ordering and size all consistent
    pub fn check_invariants(&self) -> bool {
        match self.root.as_deref() {
            None => self.size == 0,
            Some(root) => {
                root.check_consistency(None, None).is_some() && root.subtree_len() == self.size
            }
        }
    }

    /// Every node within [-1, 1]
    pub fn is_balanced(&self) -> bool {
        let mut balanced = true;
        for_each_post_order(&self.root, |node| {
            balanced &= node.balance_factor().abs() <= 1;
        });
        balanced
    }

    fn for_each_node_mut(&mut self, mut visit: impl FnMut(&mut Node)) {
        let mut stack: Vec<&mut Node> = self.root.as_deref_mut().into_iter().collect();
        while let Some(node) = stack.pop() {
            visit(node);
            let Node { left, right, .. } = node;
            if let Some(l) = left.as_deref_mut() {
                stack.push(l);
            }
            if let Some(r) = right.as_deref_mut() {
                stack.push(r);
            }
        }
    }

    /// Parent of the node that `delete_raw(value)` will physically unlink
    fn removal_anchor(&self, value: Key) -> Result<Option<Key>, EngineError> {
        let mut parent = None;
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            match value.cmp(&node.value) {
                Ordering::Less => {
                    parent = Some(node.value);
                    current = node.left.as_deref();
                }
                Ordering::Greater => {
                    parent = Some(node.value);
                    current = node.right.as_deref();
                }
                Ordering::Equal => {
                    let (Some(_), Some(right)) = (node.left.as_deref(), node.right.as_deref())
                    else {
                        return Ok(parent);
                    };
                    // Two children: the successor is unlinked
                    if right.left.is_none() {
                        // Successor is the right child; its parent now holds its key
                        return Ok(Some(right.value));
                    }
                    let mut succ_parent = right;
                    while let Some(next) = succ_parent.left.as_deref() {
                        if next.left.is_none() {
                            break;
                        }
                        succ_parent = next;
                    }
                    return Ok(Some(succ_parent.value));
                }
            }
        }
        Err(EngineError::NotFound(value))
    }
}

fn insert_node(link: &mut Link, value: Key) {
    match link {
        None => *link = Some(Node::leaf(value)),
        Some(node) => {
            if value < node.value {
                insert_node(&mut node.left, value);
            } else {
                insert_node(&mut node.right, value);
            }
            node.update_height();
        }
    }
}

fn delete_node(link: &mut Link, value: Key) {
    let Some(mut node) = link.take() else {
        return;
    };
    match value.cmp(&node.value) {
        Ordering::Less => delete_node(&mut node.left, value),
        Ordering::Greater => delete_node(&mut node.right, value),
        Ordering::Equal => match (node.left.take(), node.right.take()) {
            (Some(left), Some(right)) => {
                let (successor, rest) = take_min(right);
                node.value = successor;
                node.left = Some(left);
                node.right = rest;
            }
            (Some(only), None) | (None, Some(only)) => {
                *link = Some(only);
                return;
            }
            (None, None) => return,
        },
    }
    node.update_height();
    *link = Some(node);
}

/// Unlink the minimum of a subtree; returns its key and the remaining subtree
fn take_min(mut node: Box<Node>) -> (Key, Link) {
    match node.left.take() {
        Some(left) => {
            let (min, rest) = take_min(left);
            node.left = rest;
            node.update_height();
            (min, Some(node))
        }
        None => (node.value, node.right.take()),
    }
}

fn refresh_path(link: &mut Link, value: Key) {
    if let Some(node) = link {
        match value.cmp(&node.value) {
            Ordering::Less => refresh_path(&mut node.left, value),
            Ordering::Greater => refresh_path(&mut node.right, value),
            Ordering::Equal => {}
        }
        node.update_height();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_of(values: &[Key]) -> AvlTree {
        let mut tree = AvlTree::new();
        for &v in values {
            tree.insert_raw(v).unwrap();
        }
        tree
    }

    #[test]
    fn test_insert_raw_keeps_order_without_rebalancing() {
        let tree = tree_of(&[30, 20, 10]);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.height(), 3);
        assert_eq!(tree.root().unwrap().value, 30);
        assert_eq!(tree.root().unwrap().balance_factor(), 2);
        assert_eq!(tree.traverse(TraversalOrder::InOrder), vec![10, 20, 30]);
    }

    #[test]
    fn test_insert_duplicate_rejected() {
        let mut tree = tree_of(&[5]);
        let err = tree.insert_raw(5).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateValue(5)));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_delete_missing_reports_not_found() {
        let mut tree = tree_of(&[5, 3]);
        assert!(matches!(tree.delete_raw(9), Err(EngineError::NotFound(9))));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_delete_leaf_anchor_is_parent() {
        let mut tree = tree_of(&[20, 10, 30, 5]);
        assert_eq!(tree.delete_raw(5).unwrap(), Some(10));
        assert_eq!(tree.traverse(TraversalOrder::InOrder), vec![10, 20, 30]);
        assert!(tree.check_invariants());
    }

    #[test]
    fn test_delete_two_children_uses_successor() {
        //      20
        //   10     30
        //        25  35
        //          28
        let mut tree = tree_of(&[20, 10, 30, 25, 35, 28]);
        // Successor of 20 is 25, whose parent is 30
        assert_eq!(tree.delete_raw(20).unwrap(), Some(30));
        assert_eq!(tree.root().unwrap().value, 25);
        assert_eq!(tree.traverse(TraversalOrder::PreOrder), vec![25, 10, 30, 28, 35]);
        assert!(tree.check_invariants());
    }

    #[test]
    fn test_delete_two_children_direct_successor() {
        let mut tree = tree_of(&[20, 10, 30, 35]);
        // Successor is the right child itself; it moves up into 20's place
        assert_eq!(tree.delete_raw(20).unwrap(), Some(30));
        assert_eq!(tree.traverse(TraversalOrder::PreOrder), vec![30, 10, 35]);
    }

    #[test]
    fn test_delete_root_leaf() {
        let mut tree = tree_of(&[1]);
        assert_eq!(tree.delete_raw(1).unwrap(), None);
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn test_path_to_root_is_bottom_up() {
        let tree = tree_of(&[50, 30, 70, 20, 40]);
        assert_eq!(tree.find_path_to_root(40), vec![40, 30, 50]);
        assert!(tree.find_path_to_root(99).is_empty());
    }

    #[test]
    fn test_min_max() {
        let tree = tree_of(&[50, 30, 70, -20, 40]);
        assert_eq!(tree.min(), Some(-20));
        assert_eq!(tree.max(), Some(70));
        assert_eq!(AvlTree::new().min(), None);
    }

    #[test]
    fn test_markers() {
        let mut tree = tree_of(&[30, 20, 10]);
        tree.refresh_markers(Some(10));
        assert_eq!(tree.find(10).unwrap().marker, Marker::RecentlyAdded);
        assert_eq!(tree.find(30).unwrap().marker, Marker::Unbalanced);
        assert_eq!(tree.find(20).unwrap().marker, Marker::None);

        tree.clear_markers();
        assert_eq!(tree.find(30).unwrap().marker, Marker::None);
    }

    #[test]
    fn test_encode_ignores_markers() {
        let mut a = tree_of(&[2, 1, 3]);
        let b = tree_of(&[2, 1, 3]);
        a.refresh_markers(Some(1));
        assert_eq!(a.encode(), b.encode());
        assert_ne!(a.encode(), tree_of(&[1, 2, 3]).encode());
    }
}
