//! Requests into the engine and what comes back out

use crate::oracle::{CorrectionStep, Violation};
use crate::render::Grid;
use crate::rotation::RotationKind;
use crate::tree::{AvlTree, Key};
use crate::Mode;

/// Read-only queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// Preorder traversal
    PreOrder,
    /// Inorder traversal
    InOrder,
    /// Postorder traversal
    PostOrder,
    /// Rendered grid
    Tree,
    /// Mode, size, height and pending state
    Status,
    /// Next rotation owed
    Hint,
}

/// Everything the engine accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Insert a key
    Insert(Key),
    /// Delete a key
    Delete(Key),
    /// Submit a rotation on a node (practice mode)
    Rotate(RotationKind, Key),
    /// Step back in history, or abandon a pending correction
    Undo,
    /// Step forward in history
    Redo,
    /// Empty the tree
    Reset,
    /// Switch balancing mode
    SetMode(Mode),
    /// Toggle intermediate frames in automatic mode
    SetSteps(bool),
    /// Toggle the front-end's tree display after mutations
    SetAutoShow(bool),
    /// Read-only query
    Query(QueryKind),
}

impl Request {
    /// Check if the request can change the tree
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Request::Insert(_)
                | Request::Delete(_)
                | Request::Rotate(..)
                | Request::Undo
                | Request::Redo
                | Request::Reset
        )
    }
}

/// Labelled intermediate tree recorded during automatic balancing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// e.g. "After step 1a"
    pub label: String,

    /// Tree at that point, markers refreshed
    pub tree: AvlTree,
}

impl Frame {
    pub(crate) fn new(label: impl Into<String>, tree: &AvlTree) -> Self {
        Self {
            label: label.into(),
            tree: tree.clone(),
        }
    }
}

/// Session summary
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct Status {
    /// Balancing mode
    pub mode: Mode,
    /// Number of nodes
    pub size: usize,
    /// Tree height
    pub height: usize,
    /// Step owed, if a correction is pending
    pub pending: Option<CorrectionStep>,
    /// Lowest violated node of the live tree
    pub violation: Option<Violation>,
    /// Older history entry exists
    pub can_undo: bool,
    /// Newer history entry exists
    pub can_redo: bool,
}

/// Query results
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum Payload {
    /// Keys in the requested order
    Traversal(Vec<Key>),
    /// Rendered tree
    Grid(Grid),
    /// Session summary
    Status(Status),
    /// Next step owed; `None` when idle
    Hint(Option<CorrectionStep>),
}

/// Result of an accepted request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Outcome {
    /// Human-readable report, in order
    pub messages: Vec<String>,

    /// Intermediate trees (automatic mode with steps on)
    pub frames: Vec<Frame>,

    /// Query result
    pub payload: Option<Payload>,
}

impl Outcome {
    pub(crate) fn say(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub(crate) fn with_payload(payload: Payload) -> Self {
        Self {
            payload: Some(payload),
            ..Self::default()
        }
    }
}

/// Reporter-facing result: errors folded into `success = false`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Request accepted
    pub success: bool,

    /// Report lines; the error message on failure
    pub messages: Vec<String>,

    /// Live tree after the request
    pub snapshot: AvlTree,

    /// Intermediate trees
    pub frames: Vec<Frame>,

    /// Query result
    pub payload: Option<Payload>,
}
