//! Rotation algebra
//!
//! Rotations restructure a subtree in place: the caller hands over the
//! link slot that owns the subtree root, and on return that slot holds the
//! new root. Because the slot is the parent's child link (or the tree root),
//! re-linking is implicit and no parent pointers are needed.
//!
//! ```text
//!        y                x
//!       / \   right      / \
//!      x   C  ----->    A   y
//!     / \     <-----       / \
//!    A   B     left       B   C
//! ```
//!
//! Every rotation checks its preconditions before touching anything, so a
//! failed rotation leaves the subtree exactly as it was.

mod kind;

pub use kind::{ParseRotationKindError, RotationKind};

use crate::tree::{AvlTree, Key, Node};
use crate::EngineError;
use tracing::debug;

/// Check that `kind` can be applied to `node` without mutating anything
pub fn check_applicable(node: &Node, kind: RotationKind) -> Result<(), EngineError> {
    let invalid = |reason: &'static str| EngineError::InvalidRotation {
        node: node.value,
        kind,
        reason,
    };
    match kind {
        RotationKind::Right => node.left.as_ref().map(|_| ()).ok_or(invalid("no left child")),
        RotationKind::Left => node.right.as_ref().map(|_| ()).ok_or(invalid("no right child")),
        RotationKind::LeftRight => match node.left.as_deref() {
            None => Err(invalid("no left child")),
            Some(left) if left.right.is_none() => Err(invalid("left child has no right child")),
            Some(_) => Ok(()),
        },
        RotationKind::RightLeft => match node.right.as_deref() {
            None => Err(invalid("no right child")),
            Some(right) if right.left.is_none() => Err(invalid("right child has no left child")),
            Some(_) => Ok(()),
        },
    }
}

/// Promote the left child; returns the new subtree root key
pub fn rotate_right(slot: &mut Box<Node>) -> Result<Key, EngineError> {
    let Some(mut pivot) = slot.left.take() else {
        return Err(EngineError::InvalidRotation {
            node: slot.value,
            kind: RotationKind::Right,
            reason: "no left child",
        });
    };
    slot.left = pivot.right.take();
    slot.update_height();
    std::mem::swap(slot, &mut pivot);
    // `slot` now holds the promoted child, `pivot` the demoted old root
    slot.right = Some(pivot);
    slot.update_height();
    Ok(slot.value)
}

/// Promote the right child; returns the new subtree root key
pub fn rotate_left(slot: &mut Box<Node>) -> Result<Key, EngineError> {
    let Some(mut pivot) = slot.right.take() else {
        return Err(EngineError::InvalidRotation {
            node: slot.value,
            kind: RotationKind::Left,
            reason: "no right child",
        });
    };
    slot.right = pivot.left.take();
    slot.update_height();
    std::mem::swap(slot, &mut pivot);
    slot.left = Some(pivot);
    slot.update_height();
    Ok(slot.value)
}

/// Left on the left child, then right on the node
pub fn rotate_left_right(slot: &mut Box<Node>) -> Result<Key, EngineError> {
    check_applicable(slot, RotationKind::LeftRight)?;
    if let Some(left) = slot.left.as_mut() {
        rotate_left(left)?;
    }
    slot.update_height();
    rotate_right(slot)
}

/// Right on the right child, then left on the node
pub fn rotate_right_left(slot: &mut Box<Node>) -> Result<Key, EngineError> {
    check_applicable(slot, RotationKind::RightLeft)?;
    if let Some(right) = slot.right.as_mut() {
        rotate_right(right)?;
    }
    slot.update_height();
    rotate_left(slot)
}

/// Dispatch on kind
pub fn rotate(slot: &mut Box<Node>, kind: RotationKind) -> Result<Key, EngineError> {
    match kind {
        RotationKind::Left => rotate_left(slot),
        RotationKind::Right => rotate_right(slot),
        RotationKind::LeftRight => rotate_left_right(slot),
        RotationKind::RightLeft => rotate_right_left(slot),
    }
}

impl AvlTree {
    /// Rotate the subtree rooted at `value` and fix ancestor heights
    ///
    /// Returns the key of the subtree's new root.
    pub fn rotate_at(&mut self, value: Key, kind: RotationKind) -> Result<Key, EngineError> {
        let slot = self.slot_mut(value).ok_or(EngineError::NotFound(value))?;
        let new_root = rotate(slot, kind)?;
        self.refresh_heights_to(new_root);
        debug!(node = value, %kind, new_root, "rotation applied");
        debug_assert!(self.check_invariants(), "rotation broke BST invariants");
        Ok(new_root)
    }

    /// Validate a rotation on `value` without applying it
    pub fn check_rotation(&self, value: Key, kind: RotationKind) -> Result<(), EngineError> {
        let node = self.find(value).ok_or(EngineError::NotFound(value))?;
        check_applicable(node, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TraversalOrder;

    fn raw(values: &[Key]) -> AvlTree {
        let mut tree = AvlTree::new();
        for &v in values {
            tree.insert_raw(v).unwrap();
        }
        tree
    }

    #[test]
    fn test_rotate_right_at_root() {
        let mut tree = raw(&[30, 20, 10]);
        assert_eq!(tree.rotate_at(30, RotationKind::Right).unwrap(), 20);
        assert_eq!(tree.traverse(TraversalOrder::PreOrder), vec![20, 10, 30]);
        assert_eq!(tree.height(), 2);
        assert!(tree.is_balanced());
    }

    #[test]
    fn test_rotate_left_relinks_into_parent() {
        // 50 -> left 20 -> right 30 -> right 40 (right chain under 20)
        let mut tree = raw(&[50, 60, 20, 30, 40]);
        assert_eq!(tree.height(), 4);
        assert_eq!(tree.rotate_at(20, RotationKind::Left).unwrap(), 30);
        assert_eq!(tree.root().unwrap().value, 50);
        assert_eq!(tree.root().unwrap().left.as_ref().unwrap().value, 30);
        assert_eq!(tree.height(), 3);
        assert!(tree.check_invariants());
    }

    #[test]
    fn test_double_rotations() {
        let mut lr = raw(&[30, 10, 20]);
        assert_eq!(lr.rotate_at(30, RotationKind::LeftRight).unwrap(), 20);
        assert_eq!(lr.traverse(TraversalOrder::PreOrder), vec![20, 10, 30]);

        let mut rl = raw(&[10, 30, 20]);
        assert_eq!(rl.rotate_at(10, RotationKind::RightLeft).unwrap(), 20);
        assert_eq!(rl.traverse(TraversalOrder::PreOrder), vec![20, 10, 30]);
    }

    #[test]
    fn test_invalid_rotation_leaves_tree_unchanged() {
        let mut tree = raw(&[10, 20]);
        let before = tree.clone();
        let err = tree.rotate_at(10, RotationKind::Right).unwrap_err();
        assert!(matches!(err, EngineError::InvalidRotation { node: 10, .. }));
        let err = tree.rotate_at(10, RotationKind::RightLeft).unwrap_err();
        assert!(matches!(err, EngineError::InvalidRotation { node: 10, .. }));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_rotate_missing_node() {
        let mut tree = raw(&[1]);
        assert!(matches!(
            tree.rotate_at(2, RotationKind::Left),
            Err(EngineError::NotFound(2))
        ));
    }

    #[test]
    fn test_rotation_preserves_inorder() {
        let mut tree = raw(&[40, 20, 60, 10, 30, 50, 70, 5]);
        let before = tree.traverse(TraversalOrder::InOrder);
        for kind in [RotationKind::Right, RotationKind::Left] {
            let root = tree.root().unwrap().value;
            tree.rotate_at(root, kind).unwrap();
            assert_eq!(tree.traverse(TraversalOrder::InOrder), before);
            assert!(tree.check_invariants());
        }
    }
}
