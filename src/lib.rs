//! # AVL Drill
//!
//! An engine for practicing AVL tree maintenance.
//!
//! ## Components
//!
//! 1. **Tree model**: owned-subtree BST with cached heights
//! 2. **Rotation algebra**: in-place single and double rotations
//! 3. **Balance oracle**: lowest violation, canonical rotation, full
//!    correcting sequence
//! 4. **Engine**: automatic mode applies corrections immediately, practice
//!    mode waits for the user to submit each rotation and checks it
//! 5. **History**: linear undo/redo over committed trees
//! 6. **Renderer**: fixed-width grid with `<`, `>` and `╩` connectors
//!
//! ## Usage Example
//!
//! ```
//! use avl_drill::{Engine, EngineError, Mode, Request, RotationKind, SessionConfig};
//!
//! let mut engine = Engine::new(SessionConfig::practice());
//! for v in [30, 20, 10] {
//!     engine.apply(Request::Insert(v)).unwrap();
//! }
//! assert!(engine.is_awaiting_correction());
//!
//! // Wrong rotation is rejected with the owed step and changes nothing
//! let err = engine.apply(Request::Rotate(RotationKind::Left, 30)).unwrap_err();
//! assert!(matches!(err, EngineError::IncorrectRotation { .. }));
//! assert!(err.to_string().contains("expected right rotation on node 30"));
//!
//! engine.apply(Request::Rotate(RotationKind::Right, 30)).unwrap();
//! assert_eq!(engine.tree().root().map(|n| n.value), Some(20));
//! assert_eq!(engine.config().mode, Mode::Practice);
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

// Core modules, leaves first
pub mod tree;     // Node and tree container
pub mod rotation; // Rotation algebra
pub mod oracle;   // Violation detection and correcting sequences
pub mod history;  // Undo/redo snapshots
pub mod render;   // Grid layout
pub mod engine;   // Mode controller
pub mod command;  // Text command parsing for front-ends

// Re-exports for convenience
pub use tree::{AvlTree, Key, Marker, Node, TraversalOrder};
pub use rotation::RotationKind;
pub use oracle::{CorrectionStep, Violation};
pub use history::{History, TreeSnapshot};
pub use render::{render, Cell, Connector, Grid};
pub use engine::{
    Engine, EngineState, Frame, Outcome, Payload, PendingCorrection, QueryKind, Request,
    Response, Status,
};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Balancing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum Mode {
    /// Engine applies every correcting rotation itself
    #[default]
    Automatic,

    /// Engine pauses on imbalance and checks the user's rotations
    Practice,
}

impl Mode {
    /// Lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Automatic => "automatic",
            Mode::Practice => "practice",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "automatic" | "auto" => Ok(Mode::Automatic),
            "practice" => Ok(Mode::Practice),
            other => Err(format!("unknown mode '{other}' (valid modes: automatic, practice)")),
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Balancing mode
    pub mode: Mode,

    /// Record labelled intermediate trees during automatic balancing
    pub show_steps: bool,

    /// Front-end hint: print the tree after every mutation
    pub auto_show: bool,
}

impl SessionConfig {
    /// Automatic mode with step frames and auto-show enabled
    pub fn automatic() -> Self {
        Self {
            mode: Mode::Automatic,
            show_steps: true,
            auto_show: true,
        }
    }

    /// Practice mode with auto-show enabled
    pub fn practice() -> Self {
        Self {
            mode: Mode::Practice,
            ..Self::automatic()
        }
    }

    /// Same configuration with step frames off
    pub fn without_steps(mut self) -> Self {
        self.show_steps = false;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::automatic()
    }
}

/// Errors reported by the engine
///
/// Every variant is a rejected request: the engine state is unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Insert of a key already present
    #[error("value {0} already exists in the tree; duplicates are not allowed")]
    DuplicateValue(Key),

    /// Delete or rotate target absent
    #[error("value {0} not found in the tree")]
    NotFound(Key),

    /// Rotation impossible for the node's current shape
    #[error("cannot apply {kind} rotation on node {node}: {reason}")]
    InvalidRotation {
        /// Target node
        node: Key,
        /// Requested rotation
        kind: RotationKind,
        /// Missing child
        reason: &'static str,
    },

    /// Practice mode: not the rotation the oracle requires next
    #[error("incorrect rotation: got {got}, expected {expected}")]
    IncorrectRotation {
        /// Step the oracle requires
        expected: CorrectionStep,
        /// Step the user submitted
        got: CorrectionStep,
    },

    /// Insert, delete or redo while a correction is pending
    #[error("tree is unbalanced; finish the pending correction first (try 'hint')")]
    OperationPending,

    /// Mode change while a correction is pending
    #[error("cannot switch mode while a correction is pending")]
    ModeSwitchBlocked,

    /// Rotation submitted with nothing to correct
    #[error("no correction pending; the tree is already balanced")]
    NoPendingCorrection,

    /// Undo at the oldest entry
    #[error("nothing to undo")]
    NothingToUndo,

    /// Redo at the newest entry
    #[error("nothing to redo")]
    NothingToRedo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Practice".parse::<Mode>(), Ok(Mode::Practice));
        assert_eq!("auto".parse::<Mode>(), Ok(Mode::Automatic));
        assert!("manual".parse::<Mode>().is_err());
    }

    #[test]
    fn test_config_constructors() {
        let config = SessionConfig::practice().without_steps();
        assert_eq!(config.mode, Mode::Practice);
        assert!(!config.show_steps);
        assert!(config.auto_show);
        assert_eq!(SessionConfig::default().mode, Mode::Automatic);
    }

    #[test]
    fn test_incorrect_rotation_message_names_expected_step() {
        let err = EngineError::IncorrectRotation {
            expected: CorrectionStep::new(30, RotationKind::Right),
            got: CorrectionStep::new(30, RotationKind::Left),
        };
        let message = err.to_string();
        assert!(message.contains("expected right rotation on node 30"), "{message}");
    }
}
