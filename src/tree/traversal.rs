//! Depth-first traversals
//!
//! Explicit stacks instead of recursion, so very deep (unbalanced,
//! practice-mode) trees cannot overflow the call stack.

use super::node::{Link, Node};
use super::Key;

/// DFS visiting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum TraversalOrder {
    /// Node, left, right
    PreOrder,

    /// Left, node, right (sorted keys)
    InOrder,

    /// Left, right, node
    PostOrder,
}

impl TraversalOrder {
    /// Label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            TraversalOrder::PreOrder => "Preorder",
            TraversalOrder::InOrder => "Inorder",
            TraversalOrder::PostOrder => "Postorder",
        }
    }
}

/// Collect keys of a subtree in the requested order
pub fn collect(root: &Link, order: TraversalOrder) -> Vec<Key> {
    let mut out = Vec::new();
    let Some(root) = root.as_deref() else {
        return out;
    };

    match order {
        TraversalOrder::PreOrder => {
            let mut stack: Vec<&Node> = vec![root];
            while let Some(node) = stack.pop() {
                out.push(node.value);
                // Right first so left is visited first
                if let Some(r) = node.right.as_deref() {
                    stack.push(r);
                }
                if let Some(l) = node.left.as_deref() {
                    stack.push(l);
                }
            }
        }
        TraversalOrder::InOrder => {
            let mut stack: Vec<&Node> = Vec::new();
            let mut current = Some(root);
            while current.is_some() || !stack.is_empty() {
                while let Some(node) = current {
                    stack.push(node);
                    current = node.left.as_deref();
                }
                if let Some(node) = stack.pop() {
                    out.push(node.value);
                    current = node.right.as_deref();
                }
            }
        }
        TraversalOrder::PostOrder => {
            // Reverse of (node, right, left)
            let mut stack: Vec<&Node> = vec![root];
            while let Some(node) = stack.pop() {
                out.push(node.value);
                if let Some(l) = node.left.as_deref() {
                    stack.push(l);
                }
                if let Some(r) = node.right.as_deref() {
                    stack.push(r);
                }
            }
            out.reverse();
        }
    }

    out
}

/// Visit every node bottom-up (children before parents)
pub fn for_each_post_order<'a>(root: &'a Link, mut visit: impl FnMut(&'a Node)) {
    let Some(root) = root.as_deref() else {
        return;
    };
    let mut stack: Vec<(&Node, bool)> = vec![(root, false)];
    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            visit(node);
            continue;
        }
        stack.push((node, true));
        if let Some(r) = node.right.as_deref() {
            stack.push((r, false));
        }
        if let Some(l) = node.left.as_deref() {
            stack.push((l, false));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Link {
        //     8
        //   4   12
        //  2 6
        let mut left = Node::leaf(4);
        left.left = Some(Node::leaf(2));
        left.right = Some(Node::leaf(6));
        left.update_height();
        let mut root = Node::leaf(8);
        root.left = Some(left);
        root.right = Some(Node::leaf(12));
        root.update_height();
        Some(root)
    }

    #[test]
    fn test_orders() {
        let root = sample();
        assert_eq!(collect(&root, TraversalOrder::PreOrder), vec![8, 4, 2, 6, 12]);
        assert_eq!(collect(&root, TraversalOrder::InOrder), vec![2, 4, 6, 8, 12]);
        assert_eq!(collect(&root, TraversalOrder::PostOrder), vec![2, 6, 4, 12, 8]);
    }

    #[test]
    fn test_empty() {
        assert!(collect(&None, TraversalOrder::InOrder).is_empty());
    }

    #[test]
    fn test_post_order_visit_matches_collect() {
        let root = sample();
        let mut seen = Vec::new();
        for_each_post_order(&root, |n| seen.push(n.value));
        assert_eq!(seen, collect(&root, TraversalOrder::PostOrder));
    }
}
