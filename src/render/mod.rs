//! Grid layout for trees
//!
//! A tree of height h is drawn on h rows and 2^h - 1 columns. Every node
//! takes the column of its in-order slot in the perfect tree of height h:
//!   root         -> middle column of [0, 2^h - 2]
//!   left child   -> middle of the parent's left half
//!   right child  -> middle of the parent's right half
//! so left subtrees are strictly left of their parent and right subtrees
//! strictly right. Connectors live in the child row:
//!
//! ```text
//! |   |   |   |30 |   |   |   |
//! |   |20 | < | ╩ | > |40 |   |
//! |10 | ╩ |   |   |   |   |   |
//! ```
//!
//! Layout depends on structure only; markers ride along in the node cells.

mod grid;

pub use grid::{Cell, Connector, Grid};

use crate::tree::{AvlTree, Node};

/// Deepest level drawn
pub const MAX_RENDER_HEIGHT: usize = 16;

/// Render a tree into a grid
///
/// Only the top `MAX_RENDER_HEIGHT` levels are drawn, since the width
/// doubles with every level. Unbalanced practice trees can be deeper; the
/// grid then reports the missing levels through `Grid::hidden_levels` and
/// its `Display` output ends with a note.
pub fn render(tree: &AvlTree) -> Grid {
    let Some(root) = tree.root() else {
        return Grid::default();
    };
    let height = tree.height().min(MAX_RENDER_HEIGHT);
    let width = (1usize << height) - 1;
    let mut grid = Grid::blank(height, width);
    grid.hide_levels(tree.height() - height);
    place(&mut grid, root, 0, 0, width - 1);
    grid
}

/// Place `node` at depth `depth` inside columns [lo, hi]; returns its column
fn place(grid: &mut Grid, node: &Node, depth: usize, lo: usize, hi: usize) -> usize {
    let col = lo + (hi - lo) / 2;
    grid.set(
        depth,
        col,
        Cell::Node {
            value: node.value,
            marker: node.marker,
        },
    );

    let child_row = depth + 1;
    if child_row >= grid.height() || node.is_leaf() {
        return col;
    }

    grid.set(child_row, col, Cell::Connector(Connector::Junction));
    if let Some(left) = node.left.as_deref() {
        let left_col = place(grid, left, child_row, lo, col - 1);
        for c in left_col + 1..col {
            grid.set(child_row, c, Cell::Connector(Connector::Left));
        }
    }
    if let Some(right) = node.right.as_deref() {
        let right_col = place(grid, right, child_row, col + 1, hi);
        for c in col + 1..right_col {
            grid.set(child_row, c, Cell::Connector(Connector::Right));
        }
    }
    col
}
