//! Mode controller
//!
//! Sole mutation entry point. One transition function consumes a request
//! against the current state:
//!
//! ```text
//!   Idle --insert/delete, balanced----------------> Idle (commit)
//!   Idle --insert/delete, violated, automatic-----> Idle (rotate, commit)
//!   Idle --insert/delete, violated, practice------> AwaitingCorrection
//!   AwaitingCorrection --rotate, last step--------> Idle (commit)
//!   AwaitingCorrection --undo / reset-------------> Idle (abandon)
//! ```
//!
//! Mutations run on a scratch copy that replaces the live tree only once
//! the whole request succeeded, so a rejected request changes nothing.

mod request;
mod state;

pub use request::{Frame, Outcome, Payload, QueryKind, Request, Response, Status};
pub use state::{EngineState, PendingCorrection};

use tracing::{debug, info};

use crate::history::History;
use crate::oracle::{self, CorrectionStep, Violation};
use crate::render::{render, Grid};
use crate::rotation::RotationKind;
use crate::tree::{AvlTree, Key, TraversalOrder};
use crate::{EngineError, Mode, SessionConfig};

/// AVL practice engine
#[derive(Debug)]
pub struct Engine {
    /// Live tree, markers refreshed after every request
    tree: AvlTree,

    /// Session settings
    config: SessionConfig,

    /// Idle or awaiting the user's rotations
    state: EngineState,

    /// Committed trees
    history: History,

    /// Key inserted by the last mutation, shown as recently added
    recent: Option<Key>,
}

impl Engine {
    /// Create engine with an empty tree
    pub fn new(config: SessionConfig) -> Self {
        let tree = AvlTree::new();
        Self {
            history: History::new(&tree),
            tree,
            config,
            state: EngineState::Idle,
            recent: None,
        }
    }

    /// Live tree
    pub fn tree(&self) -> &AvlTree {
        &self.tree
    }

    /// Session settings
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Controller state
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Committed history
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Check if a correction is pending
    pub fn is_awaiting_correction(&self) -> bool {
        !self.state.is_idle()
    }

    /// Pending correction, if any
    pub fn pending(&self) -> Option<&PendingCorrection> {
        self.state.pending()
    }

    /// Render the live tree
    pub fn render(&self) -> Grid {
        render(&self.tree)
    }

    /// Session summary
    pub fn status(&self) -> Status {
        Status {
            mode: self.config.mode,
            size: self.tree.len(),
            height: self.tree.height(),
            pending: self.pending().and_then(PendingCorrection::next),
            violation: oracle::find_lowest_violation(&self.tree)
                .and_then(|key| oracle::violation_at(&self.tree, key)),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        }
    }

    /// Apply a request; on error nothing changed
    pub fn apply(&mut self, request: Request) -> Result<Outcome, EngineError> {
        debug!(?request, awaiting = self.is_awaiting_correction(), "request");
        match request {
            Request::Insert(value) => self.insert(value),
            Request::Delete(value) => self.delete(value),
            Request::Rotate(kind, value) => self.rotate(kind, value),
            Request::Undo => self.undo(),
            Request::Redo => self.redo(),
            Request::Reset => Ok(self.reset()),
            Request::SetMode(mode) => self.set_mode(mode),
            Request::SetSteps(on) => {
                self.config.show_steps = on;
                Ok(toggled("Step-by-step display", on))
            }
            Request::SetAutoShow(on) => {
                self.config.auto_show = on;
                Ok(toggled("Auto-show tree", on))
            }
            Request::Query(kind) => Ok(self.query(kind)),
        }
    }

    /// Apply a request and fold the result into a `Response`
    pub fn handle(&mut self, request: Request) -> Response {
        match self.apply(request) {
            Ok(outcome) => Response {
                success: true,
                messages: outcome.messages,
                snapshot: self.tree.clone(),
                frames: outcome.frames,
                payload: outcome.payload,
            },
            Err(err) => {
                info!(?request, %err, "request rejected");
                Response {
                    success: false,
                    messages: vec![err.to_string()],
                    snapshot: self.tree.clone(),
                    frames: Vec::new(),
                    payload: None,
                }
            }
        }
    }

    fn insert(&mut self, value: Key) -> Result<Outcome, EngineError> {
        self.ensure_idle()?;
        let mut working = self.tree.clone();
        working.insert_raw(value)?;

        let mut outcome = Outcome::default();
        outcome.say(format!("Inserted {value}"));
        let path = working.find_path_to_root(value);
        self.settle(working, &path, Some(value), outcome)
    }

    fn delete(&mut self, value: Key) -> Result<Outcome, EngineError> {
        self.ensure_idle()?;
        let mut working = self.tree.clone();
        let anchor = working.delete_raw(value)?;

        let mut outcome = Outcome::default();
        outcome.say(format!("Deleted {value}"));
        let path = anchor
            .map(|key| working.find_path_to_root(key))
            .unwrap_or_default();
        self.settle(working, &path, None, outcome)
    }

    /// Finish a raw mutation: commit, auto-balance, or open a correction
    fn settle(
        &mut self,
        mut working: AvlTree,
        path: &[Key],
        recent: Option<Key>,
        mut outcome: Outcome,
    ) -> Result<Outcome, EngineError> {
        let steps = oracle::build_correction_sequence(&working, path);
        let Some(first) = steps.first().copied() else {
            outcome.say("Tree is balanced");
            self.install(working, recent);
            self.commit();
            return Ok(outcome);
        };
        let violation = oracle::violation_at(&working, first.node).unwrap_or(Violation {
            node: first.node,
            balance: 0,
        });
        outcome.say(format!("Tree is unbalanced: {violation}"));

        match self.config.mode {
            Mode::Automatic => {
                if self.config.show_steps {
                    working.refresh_markers(recent);
                    outcome.frames.push(Frame::new("After mutation (before balancing)", &working));
                }
                for (i, step) in steps.iter().enumerate() {
                    self.apply_step(&mut working, i + 1, *step, &mut outcome)?;
                }
                outcome.say("Tree is now balanced");
                self.install(working, recent);
                self.commit();
            }
            Mode::Practice => {
                let pending = PendingCorrection::new(violation, steps);
                outcome.say(format!(
                    "Apply {} to rebalance (try 'hint')",
                    plural(pending.steps().len(), "rotation")
                ));
                debug!(node = first.node, expected = %first.kind, "awaiting correction");
                self.install(working, recent);
                self.state = EngineState::AwaitingCorrection(pending);
            }
        }
        Ok(outcome)
    }

    /// Automatic mode: apply one step, splitting doubles into labelled halves
    fn apply_step(
        &self,
        working: &mut AvlTree,
        number: usize,
        step: CorrectionStep,
        outcome: &mut Outcome,
    ) -> Result<(), EngineError> {
        let balance = working.find(step.node).map_or(0, |n| n.balance_factor());
        outcome.say(format!(
            "Step {number}: node {} has balance factor {balance} ({})",
            step.node,
            step.kind.case_label()
        ));

        let Some([first, second]) = step.kind.half_steps() else {
            working.rotate_at(step.node, step.kind)?;
            outcome.say(format!("  {step}"));
            self.push_frame(working, format!("After step {number}"), outcome);
            return Ok(());
        };

        let child = heavy_child(working, step.node, step.kind)
            .ok_or(EngineError::NotFound(step.node))?;
        working.rotate_at(child, first)?;
        outcome.say(format!("  {number}a: {}", CorrectionStep::new(child, first)));
        self.push_frame(working, format!("After step {number}a"), outcome);

        working.rotate_at(step.node, second)?;
        outcome.say(format!("  {number}b: {}", CorrectionStep::new(step.node, second)));
        self.push_frame(working, format!("After step {number}b"), outcome);
        Ok(())
    }

    fn push_frame(&self, working: &AvlTree, label: String, outcome: &mut Outcome) {
        if self.config.show_steps {
            let mut frame = Frame::new(label, working);
            frame.tree.refresh_markers(None);
            outcome.frames.push(frame);
        }
    }

    fn rotate(&mut self, kind: RotationKind, value: Key) -> Result<Outcome, EngineError> {
        let Some(pending) = self.state.pending() else {
            return Err(EngineError::NoPendingCorrection);
        };
        if !self.tree.contains(value) {
            return Err(EngineError::NotFound(value));
        }

        let got = CorrectionStep::new(value, kind);
        let expected = pending.next().ok_or(EngineError::NoPendingCorrection)?;
        let remaining = if got == expected {
            None
        } else if let Some(remaining) = first_half_match(&self.tree, expected, got) {
            Some(remaining)
        } else {
            return Err(EngineError::IncorrectRotation { expected, got });
        };
        // Only a matching request reaches the shape check
        self.tree.check_rotation(value, kind)?;

        let mut pending = pending.clone();
        let mut working = self.tree.clone();
        let mut outcome = Outcome::default();
        working.rotate_at(value, kind)?;
        match remaining {
            None => {
                pending.advance();
                outcome.say(format!("Correct: {got}"));
            }
            Some(remaining) => {
                pending.narrow_next(remaining);
                outcome.say(format!(
                    "Correct: first half of the {} rotation on node {}",
                    expected.kind, expected.node
                ));
            }
        }

        match pending.next() {
            Some(next) => {
                outcome.say(format!("Still unbalanced; next: {}", next.kind.case_label()));
                self.install(working, None);
                self.state = EngineState::AwaitingCorrection(pending);
            }
            None => {
                outcome.say("Tree is now balanced");
                self.install(working, None);
                self.state = EngineState::Idle;
                self.commit();
            }
        }
        Ok(outcome)
    }

    fn undo(&mut self) -> Result<Outcome, EngineError> {
        let mut outcome = Outcome::default();
        if self.is_awaiting_correction() {
            let restored = self.history.current().tree().clone();
            self.install(restored, None);
            self.state = EngineState::Idle;
            outcome.say("Pending correction abandoned; restored the last balanced tree");
            return Ok(outcome);
        }
        let restored = self.history.undo()?;
        self.install(restored, None);
        outcome.say("Undo successful");
        Ok(outcome)
    }

    fn redo(&mut self) -> Result<Outcome, EngineError> {
        self.ensure_idle()?;
        let restored = self.history.redo()?;
        self.install(restored, None);
        let mut outcome = Outcome::default();
        outcome.say("Redo successful");
        Ok(outcome)
    }

    fn reset(&mut self) -> Outcome {
        let mut outcome = Outcome::default();
        if self.is_awaiting_correction() {
            outcome.say("Pending correction abandoned");
        }
        self.install(AvlTree::new(), None);
        self.state = EngineState::Idle;
        self.commit();
        outcome.say("Tree reset");
        outcome
    }

    fn set_mode(&mut self, mode: Mode) -> Result<Outcome, EngineError> {
        if self.is_awaiting_correction() {
            return Err(EngineError::ModeSwitchBlocked);
        }
        self.config.mode = mode;
        let mut outcome = Outcome::default();
        outcome.say(format!("Mode set to {mode}"));
        if mode == Mode::Practice {
            outcome.say("Imbalances will now wait for your rotations");
        }
        Ok(outcome)
    }

    fn query(&self, kind: QueryKind) -> Outcome {
        match kind {
            QueryKind::PreOrder => self.traversal(TraversalOrder::PreOrder),
            QueryKind::InOrder => self.traversal(TraversalOrder::InOrder),
            QueryKind::PostOrder => self.traversal(TraversalOrder::PostOrder),
            QueryKind::Tree => Outcome::with_payload(Payload::Grid(self.render())),
            QueryKind::Status => Outcome::with_payload(Payload::Status(self.status())),
            QueryKind::Hint => self.hint(),
        }
    }

    fn traversal(&self, order: TraversalOrder) -> Outcome {
        let values = self.tree.traverse(order);
        let mut outcome = Outcome::with_payload(Payload::Traversal(values.clone()));
        let listed: Vec<String> = values.iter().map(Key::to_string).collect();
        outcome.say(format!("{}: {}", order.label(), listed.join(" ")));
        outcome
    }

    fn hint(&self) -> Outcome {
        let next = self.pending().and_then(PendingCorrection::next);
        let mut outcome = Outcome::with_payload(Payload::Hint(next));
        let Some(step) = next else {
            outcome.say("Tree is balanced; no hint needed");
            return outcome;
        };
        outcome.say(format!(
            "Node {} needs a {} ({})",
            step.node,
            step.kind,
            step.kind.case_label()
        ));
        match (step.kind.half_steps(), heavy_child(&self.tree, step.node, step.kind)) {
            (Some([first, second]), Some(child)) => outcome.say(format!(
                "Try 'rotate {first} {child}', then 'rotate {second} {}'",
                step.node
            )),
            _ => outcome.say(format!("Try 'rotate {} {}'", step.kind, step.node)),
        }
        outcome
    }

    fn ensure_idle(&self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Idle => Ok(()),
            EngineState::AwaitingCorrection(_) => Err(EngineError::OperationPending),
        }
    }

    /// Replace the live tree and refresh its markers
    fn install(&mut self, tree: AvlTree, recent: Option<Key>) {
        self.tree = tree;
        self.recent = recent;
        self.tree.refresh_markers(recent);
    }

    fn commit(&mut self) {
        debug_assert!(self.state.is_idle(), "commit outside idle state");
        debug_assert!(self.tree.is_balanced(), "commit of an unbalanced tree");
        self.history.commit(&self.tree);
    }
}

/// Child a double rotation's first half applies to
fn heavy_child(tree: &AvlTree, node: Key, kind: RotationKind) -> Option<Key> {
    let node = tree.find(node)?;
    let child = match kind {
        RotationKind::LeftRight => node.left.as_deref()?,
        RotationKind::RightLeft => node.right.as_deref()?,
        RotationKind::Left | RotationKind::Right => return None,
    };
    Some(child.value)
}

/// If `got` is the first half of the double rotation `expected`, the half
/// still owed on the same node
fn first_half_match(
    tree: &AvlTree,
    expected: CorrectionStep,
    got: CorrectionStep,
) -> Option<RotationKind> {
    let [first, second] = expected.kind.half_steps()?;
    let child = heavy_child(tree, expected.node, expected.kind)?;
    (got == CorrectionStep::new(child, first)).then_some(second)
}

fn toggled(what: &str, on: bool) -> Outcome {
    let mut outcome = Outcome::default();
    outcome.say(format!("{what} {}", if on { "enabled" } else { "disabled" }));
    outcome
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}
