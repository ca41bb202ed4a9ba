//! Balance oracle
//!
//! Decides *what* has to be rotated, never rotates the live tree itself:
//! - classify nodes from their balance factor
//! - locate the lowest violated ancestor of a mutation
//! - pick the canonical rotation for a violated node
//! - derive the complete correcting sequence by simulation on a copy
//!
//! Rotation choice for a violated node n:
//!   bf(n) = +2, bf(n.left)  >= 0  ->  Right
//!   bf(n) = +2, bf(n.left)  <  0  ->  LeftRight
//!   bf(n) = -2, bf(n.right) <= 0  ->  Left
//!   bf(n) = -2, bf(n.right) >  0  ->  RightLeft
//! A child balance of exactly 0 (only reachable after deletion) resolves to
//! the single rotation.

use std::fmt;

use tracing::{debug, warn};

use crate::rotation::RotationKind;
use crate::tree::{for_each_post_order, AvlTree, Key, Node};

/// Shape of a node as seen from its balance factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum Classification {
    /// Balance factor 0
    Balanced,

    /// Left subtree taller
    LeftHeavy,

    /// Right subtree taller
    RightHeavy,
}

/// One rotation the user (or automatic mode) owes the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct CorrectionStep {
    /// Key of the node to rotate
    pub node: Key,

    /// Rotation to apply there
    pub kind: RotationKind,
}

impl CorrectionStep {
    /// Create step
    pub fn new(node: Key, kind: RotationKind) -> Self {
        Self { node, kind }
    }
}

impl fmt::Display for CorrectionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rotation on node {}", self.kind, self.node)
    }
}

/// A node outside the AVL balance range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct Violation {
    /// Violated node
    pub node: Key,

    /// Its balance factor (|bf| >= 2)
    pub balance: i32,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {} has balance factor {}", self.node, self.balance)
    }
}

/// Classify a node by the sign of its balance factor
pub fn classify(node: &Node) -> Classification {
    match node.balance_factor() {
        0 => Classification::Balanced,
        bf if bf > 0 => Classification::LeftHeavy,
        _ => Classification::RightHeavy,
    }
}

/// Check if the node needs a rotation
#[inline]
pub fn is_violated(node: &Node) -> bool {
    node.balance_factor().abs() > 1
}

/// First violated key on a bottom-up path
pub fn find_first_violation(tree: &AvlTree, path: &[Key]) -> Option<Key> {
    path.iter()
        .copied()
        .find(|&key| tree.find(key).is_some_and(is_violated))
}

/// Lowest violated node of the whole tree (first in post-order)
pub fn find_lowest_violation(tree: &AvlTree) -> Option<Key> {
    let mut found = None;
    for_each_post_order(tree.root_link(), |node| {
        if found.is_none() && is_violated(node) {
            found = Some(node.value);
        }
    });
    found
}

/// Every violated key, in post-order
pub fn all_violations(tree: &AvlTree) -> Vec<Violation> {
    let mut out = Vec::new();
    for_each_post_order(tree.root_link(), |node| {
        if is_violated(node) {
            out.push(Violation {
                node: node.value,
                balance: node.balance_factor(),
            });
        }
    });
    out
}

/// Violation report for a key, if that node is violated
pub fn violation_at(tree: &AvlTree, key: Key) -> Option<Violation> {
    let node = tree.find(key)?;
    is_violated(node).then(|| Violation {
        node: key,
        balance: node.balance_factor(),
    })
}

/// Canonical rotation for a violated node; `None` when balanced enough
pub fn determine_rotation(node: &Node) -> Option<RotationKind> {
    let bf = node.balance_factor();
    if bf > 1 {
        let left = node.left.as_deref()?;
        Some(match classify(left) {
            Classification::LeftHeavy | Classification::Balanced => RotationKind::Right,
            Classification::RightHeavy => RotationKind::LeftRight,
        })
    } else if bf < -1 {
        let right = node.right.as_deref()?;
        Some(match classify(right) {
            Classification::RightHeavy | Classification::Balanced => RotationKind::Left,
            Classification::LeftHeavy => RotationKind::RightLeft,
        })
    } else {
        None
    }
}

/// Canonical next step for the whole tree, if any node is violated
pub fn next_step(tree: &AvlTree) -> Option<CorrectionStep> {
    let key = find_lowest_violation(tree)?;
    let kind = determine_rotation(tree.find(key)?)?;
    Some(CorrectionStep::new(key, kind))
}

/// Full correcting sequence after a structural change
///
/// `path` is the bottom-up path from the mutation's anchor to the root. The
/// sequence is derived on a scratch copy: find the lowest violation on the
/// path (falling back to a whole-tree scan), pick its rotation, apply it to
/// the copy, and scan again until nothing is violated. A single insert or
/// delete yields at most one step; the loop does not rely on that.
pub fn build_correction_sequence(tree: &AvlTree, path: &[Key]) -> Vec<CorrectionStep> {
    let mut scratch = tree.clone();
    let mut steps = Vec::new();
    let anchor = path.first().copied();

    // Bound only guards against a defect; a single mutation needs one round
    let rounds = tree.len().saturating_mul(tree.height().max(1));
    for _ in 0..=rounds {
        let scan = anchor
            .map(|key| scratch.find_path_to_root(key))
            .unwrap_or_default();
        let Some(target) =
            find_first_violation(&scratch, &scan).or_else(|| find_lowest_violation(&scratch))
        else {
            break;
        };
        let Some(kind) = scratch.find(target).and_then(determine_rotation) else {
            break;
        };
        if let Err(err) = scratch.rotate_at(target, kind) {
            warn!(%err, node = target, %kind, "oracle chose an inapplicable rotation");
            break;
        }
        debug!(node = target, %kind, "correction step derived");
        steps.push(CorrectionStep::new(target, kind));
    }

    if !scratch.is_balanced() {
        warn!(steps = steps.len(), "correction sequence did not restore balance");
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(values: &[Key]) -> AvlTree {
        let mut tree = AvlTree::new();
        for &v in values {
            tree.insert_raw(v).unwrap();
        }
        tree
    }

    fn sequence_after_insert(values: &[Key]) -> Vec<CorrectionStep> {
        let tree = raw(values);
        let last = *values.last().unwrap();
        build_correction_sequence(&tree, &tree.find_path_to_root(last))
    }

    #[test]
    fn test_classify() {
        let tree = raw(&[20, 10]);
        assert_eq!(classify(tree.root().unwrap()), Classification::LeftHeavy);
        let tree = raw(&[20, 30]);
        assert_eq!(classify(tree.root().unwrap()), Classification::RightHeavy);
        let tree = raw(&[20, 10, 30]);
        assert_eq!(classify(tree.root().unwrap()), Classification::Balanced);
    }

    #[test]
    fn test_four_cases() {
        assert_eq!(
            sequence_after_insert(&[30, 20, 10]),
            vec![CorrectionStep::new(30, RotationKind::Right)]
        );
        assert_eq!(
            sequence_after_insert(&[40, 50, 60]),
            vec![CorrectionStep::new(40, RotationKind::Left)]
        );
        assert_eq!(
            sequence_after_insert(&[30, 10, 20]),
            vec![CorrectionStep::new(30, RotationKind::LeftRight)]
        );
        assert_eq!(
            sequence_after_insert(&[10, 30, 20]),
            vec![CorrectionStep::new(10, RotationKind::RightLeft)]
        );
    }

    #[test]
    fn test_balanced_insert_needs_nothing() {
        assert!(sequence_after_insert(&[20, 10, 30, 5]).is_empty());
    }

    #[test]
    fn test_lowest_violation_on_path_wins() {
        // 50 / 30 / 20 then 10: both 30 (bf 2) and 50 (bf 3) are violated
        let tree = raw(&[50, 30, 20, 10]);
        let path = tree.find_path_to_root(10);
        assert_eq!(find_first_violation(&tree, &path), Some(30));
        let steps = build_correction_sequence(&tree, &path);
        assert_eq!(
            steps,
            vec![
                CorrectionStep::new(30, RotationKind::Right),
                CorrectionStep::new(50, RotationKind::Right),
            ]
        );
    }

    #[test]
    fn test_child_balance_zero_resolves_to_single_rotation() {
        // After deleting 40 from {30, 20, 40, 10, 25}, node 30 has bf +2 and
        // its left child 20 is balanced.
        let mut tree = raw(&[30, 20, 40, 10, 25]);
        let anchor = tree.delete_raw(40).unwrap();
        assert_eq!(anchor, Some(30));
        let root = tree.root().unwrap();
        assert_eq!(root.balance_factor(), 2);
        assert_eq!(classify(root.left.as_deref().unwrap()), Classification::Balanced);
        assert_eq!(determine_rotation(root), Some(RotationKind::Right));

        let steps = build_correction_sequence(&tree, &tree.find_path_to_root(30));
        assert_eq!(steps, vec![CorrectionStep::new(30, RotationKind::Right)]);
    }

    #[test]
    fn test_mirror_child_balance_zero() {
        let mut tree = raw(&[20, 10, 30, 25, 35]);
        tree.delete_raw(10).unwrap();
        assert_eq!(determine_rotation(tree.root().unwrap()), Some(RotationKind::Left));
    }

    #[test]
    fn test_batch_of_changes_rescans() {
        // A raw ascending chain has several violations; the oracle must keep
        // going until the whole tree is valid.
        let tree = raw(&[1, 2, 3, 4, 5, 6, 7]);
        let path = tree.find_path_to_root(7);
        let steps = build_correction_sequence(&tree, &path);
        assert!(steps.len() > 1);

        let mut replay = tree.clone();
        for step in &steps {
            replay.rotate_at(step.node, step.kind).unwrap();
        }
        assert!(replay.is_balanced());
        assert_eq!(replay.len(), 7);
    }

    #[test]
    fn test_next_step_and_violations() {
        let tree = raw(&[30, 10, 20]);
        assert_eq!(next_step(&tree), Some(CorrectionStep::new(30, RotationKind::LeftRight)));
        assert_eq!(all_violations(&tree), vec![Violation { node: 30, balance: 2 }]);
        assert_eq!(violation_at(&tree, 10), None);
        assert_eq!(next_step(&raw(&[2, 1, 3])), None);
    }
}
