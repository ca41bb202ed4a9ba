//! Controller state: idle, or holding a pending correction

use crate::oracle::{CorrectionStep, Violation};
use crate::rotation::RotationKind;
use crate::tree::Key;

/// Rotations still owed after a practice-mode mutation
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct PendingCorrection {
    /// Imbalance that opened this correction
    trigger: Violation,

    /// Canonical sequence from the oracle
    steps: Vec<CorrectionStep>,

    /// Index of the next step owed
    step_index: usize,
}

impl PendingCorrection {
    /// Open a correction; `steps` must be non-empty
    pub(crate) fn new(trigger: Violation, steps: Vec<CorrectionStep>) -> Self {
        debug_assert!(!steps.is_empty(), "pending correction without steps");
        Self {
            trigger,
            steps,
            step_index: 0,
        }
    }

    /// Imbalance reported when the correction opened
    pub fn trigger(&self) -> Violation {
        self.trigger
    }

    /// Next step owed
    pub fn next(&self) -> Option<CorrectionStep> {
        self.steps.get(self.step_index).copied()
    }

    /// Node the next step rotates
    pub fn target(&self) -> Option<Key> {
        self.next().map(|s| s.node)
    }

    /// Rotation the next step requires
    pub fn expected(&self) -> Option<RotationKind> {
        self.next().map(|s| s.kind)
    }

    /// Steps still owed, next first
    pub fn remaining(&self) -> &[CorrectionStep] {
        self.steps.get(self.step_index..).unwrap_or_default()
    }

    /// Whole sequence
    pub fn steps(&self) -> &[CorrectionStep] {
        &self.steps
    }

    /// Index of the next step
    pub fn step_index(&self) -> usize {
        self.step_index
    }

    /// Check if every step was applied
    pub fn is_exhausted(&self) -> bool {
        self.step_index >= self.steps.len()
    }

    /// Mark the next step as applied
    pub(crate) fn advance(&mut self) {
        self.step_index += 1;
    }

    /// Replace the next step after its first half was applied
    pub(crate) fn narrow_next(&mut self, remaining_half: RotationKind) {
        if let Some(step) = self.steps.get_mut(self.step_index) {
            step.kind = remaining_half;
        }
    }
}

/// Controller state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum EngineState {
    /// Tree is committed and balanced
    #[default]
    Idle,

    /// Tree is violated and waits for the user's rotations
    AwaitingCorrection(PendingCorrection),
}

impl EngineState {
    /// Pending correction, if any
    pub fn pending(&self) -> Option<&PendingCorrection> {
        match self {
            EngineState::Idle => None,
            EngineState::AwaitingCorrection(p) => Some(p),
        }
    }

    /// Check if idle
    pub fn is_idle(&self) -> bool {
        matches!(self, EngineState::Idle)
    }
}
