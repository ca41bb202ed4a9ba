//! AVL node representation
//!
//! Each node exclusively owns its children, so the whole tree is a single
//! ownership hierarchy with no back-links. Height is cached per node:
//!   leaf height = 1
//!   height(n)   = 1 + max(height(left), height(right))   (absent = 0)

use std::fmt;

use super::Key;

/// Owned link to a child subtree
pub type Link = Option<Box<Node>>;

/// Display emphasis attached to a node
///
/// Markers only influence how a node is drawn, never where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum Marker {
    /// Plain node
    #[default]
    None,

    /// Node inserted by the most recent operation
    RecentlyAdded,

    /// Node whose balance factor is outside [-1, 1]
    Unbalanced,
}

/// Tree node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Unique key
    pub value: Key,

    /// Cached subtree height (leaf = 1)
    pub height: usize,

    /// Left subtree (all keys smaller)
    pub left: Link,

    /// Right subtree (all keys larger)
    pub right: Link,

    /// Rendering emphasis
    pub marker: Marker,
}

impl Node {
    /// Create a leaf
    pub fn new(value: Key) -> Self {
        Self {
            value,
            height: 1,
            left: None,
            right: None,
            marker: Marker::None,
        }
    }

    /// Create a boxed leaf, ready to be linked into a parent
    pub fn leaf(value: Key) -> Box<Self> {
        Box::new(Self::new(value))
    }

    /// Recompute the cached height from the children
    #[inline]
    pub fn update_height(&mut self) {
        self.height = 1 + height_of(&self.left).max(height_of(&self.right));
    }

    /// height(left) - height(right)
    #[inline]
    pub fn balance_factor(&self) -> i32 {
        height_of(&self.left) as i32 - height_of(&self.right) as i32
    }

    /// Check if leaf
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Number of nodes in this subtree
    pub fn subtree_len(&self) -> usize {
        1 + self.left.as_ref().map_or(0, |l| l.subtree_len())
            + self.right.as_ref().map_or(0, |r| r.subtree_len())
    }

    /// Verify cached heights and ordering below this node
    ///
    /// Returns the recomputed height when consistent. Used by debug
    /// assertions and tests; the engine never relies on it at runtime.
    pub fn check_consistency(&self, lower: Option<Key>, upper: Option<Key>) -> Option<usize> {
        if lower.is_some_and(|lo| self.value <= lo) || upper.is_some_and(|hi| self.value >= hi) {
            return None;
        }
        let lh = match &self.left {
            Some(l) => l.check_consistency(lower, Some(self.value))?,
            None => 0,
        };
        let rh = match &self.right {
            Some(r) => r.check_consistency(Some(self.value), upper)?,
            None => 0,
        };
        let expected = 1 + lh.max(rh);
        (expected == self.height).then_some(expected)
    }
}

/// Height of an optional subtree (absent = 0)
#[inline]
pub fn height_of(link: &Link) -> usize {
    link.as_ref().map_or(0, |n| n.height)
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (h={}, bf={})", self.value, self.height, self.balance_factor())
    }
}
