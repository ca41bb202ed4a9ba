//! Cell grid produced by the renderer

use std::fmt;

use crate::tree::{Key, Marker};

/// Connector glyph between a parent row and its child row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum Connector {
    /// Path towards the left child (`<`)
    Left,

    /// Path towards the right child (`>`)
    Right,

    /// Trunk under the parent (`╩`)
    Junction,
}

impl Connector {
    /// Glyph drawn in the cell
    pub fn glyph(&self) -> char {
        match self {
            Connector::Left => '<',
            Connector::Right => '>',
            Connector::Junction => '╩',
        }
    }
}

/// One grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum Cell {
    /// Nothing here (including absent children)
    #[default]
    Blank,

    /// A tree node
    Node {
        /// Key
        value: Key,
        /// Display emphasis
        marker: Marker,
    },

    /// Connector glyph
    Connector(Connector),
}

impl Cell {
    fn label(&self) -> String {
        match self {
            Cell::Blank => String::new(),
            Cell::Node { value, .. } => value.to_string(),
            Cell::Connector(c) => c.glyph().to_string(),
        }
    }
}

/// Rendered tree: `height` rows of `width` cells
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct Grid {
    rows: Vec<Vec<Cell>>,

    /// Tree levels below the last row that were not drawn
    hidden_levels: usize,
}

impl Grid {
    /// Minimum printed cell width
    pub const MIN_CELL_WIDTH: usize = 3;

    pub(crate) fn blank(height: usize, width: usize) -> Self {
        Self {
            rows: vec![vec![Cell::Blank; width]; height],
            hidden_levels: 0,
        }
    }

    pub(crate) fn hide_levels(&mut self, levels: usize) {
        self.hidden_levels = levels;
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.rows[row][col] = cell;
    }

    /// All rows, top to bottom
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Cell at (row, col)
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row)?.get(col)
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Tree levels cut off below the last row
    pub fn hidden_levels(&self) -> usize {
        self.hidden_levels
    }

    /// Check if the tree was deeper than the grid
    pub fn is_truncated(&self) -> bool {
        self.hidden_levels > 0
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Check if nothing was rendered
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column of a key, scanning top-down
    pub fn column_of(&self, key: Key) -> Option<(usize, usize)> {
        self.rows.iter().enumerate().find_map(|(r, row)| {
            row.iter()
                .position(|cell| matches!(cell, Cell::Node { value, .. } if *value == key))
                .map(|c| (r, c))
        })
    }

    /// Nodes carrying a marker, in row-major order
    pub fn emphasized(&self) -> Vec<(Key, Marker)> {
        self.rows
            .iter()
            .flatten()
            .filter_map(|cell| match cell {
                Cell::Node { value, marker } if *marker != Marker::None => Some((*value, *marker)),
                _ => None,
            })
            .collect()
    }

    /// Printed width of every cell
    pub fn cell_width(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .map(|cell| cell.label().chars().count())
            .max()
            .unwrap_or(0)
            .max(Self::MIN_CELL_WIDTH)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return writeln!(f, "(empty tree)");
        }
        let w = self.cell_width();
        let separator = format!("+{}+", vec!["-".repeat(w); self.width()].join("+"));

        writeln!(f, "{separator}")?;
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|c| format!("{:^w$}", c.label())).collect();
            writeln!(f, "|{}|", cells.join("|"))?;
            writeln!(f, "{separator}")?;
        }
        if self.is_truncated() {
            writeln!(f, "({} deeper levels not shown)", self.hidden_levels)?;
        }
        Ok(())
    }
}
