//! Step-by-step execution of an automaton on a tree.
//!
//! The engine owns the bound tree and drives it through the running modes:
//!
//! ```text
//! STOPPED -> RUNNING -> FINISHED
//!               |  ^
//!               v  | continue_recursive
//!            CONTINUING
//! ```
//!
//! `CONTINUING` is reached by infinite automata only, once every
//! back-reference reachable in the current unrolling has been processed.

use std::fmt;

use fita_core::{initial_state, State, Tree, VariableId, VertexId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::acceptance::BuchiRecord;
use crate::automaton::{Automaton, Direction};
use crate::choice::{ChoiceMode, ChoiceStrategy};
use crate::config::EngineConfig;
use crate::error::{AutomatonError, AutomatonResult};
use crate::event::{AutomatonEvent, EventSink, NullSink};
use crate::transition::Determinism;
use crate::traversal::{traversal_for, Traversal, TraversalMode};

/// Execution state of an [`Engine`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunningMode {
    #[default]
    Stopped,
    Running,
    Continuing,
    Finished,
}

impl fmt::Display for RunningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunningMode::Stopped => "STOPPED",
            RunningMode::Running => "RUNNING",
            RunningMode::Continuing => "CONTINUING",
            RunningMode::Finished => "FINISHED",
        };
        f.pad(name)
    }
}

/// Runs an [`Automaton`] on a bound [`Tree`].
///
/// The engine is the only mutator of the tree states and of its running
/// mode. Any failure inside a step stops the engine before the error is
/// returned; vertices updated earlier in the failed step keep their values.
pub struct Engine {
    automaton: Automaton,
    tree: Option<Tree>,
    mode: RunningMode,
    traversal: Option<Box<dyn Traversal>>,
    choice: Option<Box<dyn ChoiceStrategy>>,
    sink: Box<dyn EventSink>,
    config: EngineConfig,

    /// Top-down: states computed for absent children.
    leaf_states: Vec<State>,
    /// Back-references processed in the current unrolling.
    pending: Vec<VertexId>,
    /// States observed at back-references since initialization.
    buchi: BuchiRecord,
    /// Bottom-up transition events of the current step.
    transition_events: Vec<AutomatonEvent>,
    steps: usize,
}

impl Engine {
    /// Create an engine with default configuration.
    pub fn new(automaton: Automaton) -> Self {
        Self::with_config(automaton, EngineConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(automaton: Automaton, config: EngineConfig) -> Self {
        Self {
            automaton,
            tree: None,
            mode: RunningMode::Stopped,
            traversal: None,
            choice: None,
            sink: Box::new(NullSink),
            config,
            leaf_states: Vec::new(),
            pending: Vec::new(),
            buchi: BuchiRecord::default(),
            transition_events: Vec::new(),
            steps: 0,
        }
    }

    /// Set the event sink (builder pattern).
    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tree(&self) -> Option<&Tree> {
        self.tree.as_ref()
    }

    pub fn running_mode(&self) -> RunningMode {
        self.mode
    }

    /// Steps taken since the last initialization.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Top-down leaf states recorded so far.
    pub fn leaf_states(&self) -> &[State] {
        &self.leaf_states
    }

    /// Back-references waiting for `continue_recursive`.
    pub fn pending_back_references(&self) -> &[VertexId] {
        &self.pending
    }

    pub fn buchi_record(&self) -> &BuchiRecord {
        &self.buchi
    }

    pub fn traversal_mode(&self) -> Option<TraversalMode> {
        self.traversal.as_ref().map(|t| t.mode())
    }

    /// Bind the traversal for the automaton direction. Any run in progress
    /// is stopped.
    pub fn set_traversal(&mut self, mode: TraversalMode) -> AutomatonResult<()> {
        let traversal = traversal_for(self.automaton.direction(), mode)?;
        self.traversal = Some(traversal);
        self.stop_traversing();
        Ok(())
    }

    /// Bind one of the built-in choice strategies.
    pub fn set_choice(&mut self, mode: ChoiceMode) {
        self.choice = Some(mode.into_strategy());
    }

    pub fn set_choice_strategy(&mut self, strategy: Box<dyn ChoiceStrategy>) {
        self.choice = Some(strategy);
    }

    pub fn choice_mode(&self) -> Option<ChoiceMode> {
        self.choice.as_ref().map(|c| c.mode())
    }

    /// Bind a tree. Its states are cleared and the engine is stopped.
    ///
    /// Trees with back-references need an infinite automaton, and every
    /// label must belong to the alphabet.
    pub fn set_tree(&mut self, mut tree: Tree) -> AutomatonResult<()> {
        if tree.contains_back_reference() && !self.automaton.is_infinite() {
            return Err(AutomatonError::TreeFiniteness {
                message: format!(
                    "tree is infinite but the automaton is a {}",
                    self.automaton.type_name()
                ),
            });
        }

        if let Some(label) = tree.labels().find(|l| !self.automaton.is_in_alphabet(l)) {
            return Err(AutomatonError::IllegalLabel {
                label: label.to_string(),
            });
        }

        tree.delete_states();
        debug!(vertices = tree.len(), "engine_tree_bound");
        self.tree = Some(tree);
        self.stop_traversing();
        Ok(())
    }

    /// Process one batch. Initializes first when stopped; does nothing when
    /// finished or waiting for continuation.
    pub fn step(&mut self) -> AutomatonResult<RunningMode> {
        if self.traversal.is_none() {
            self.stop_traversing();
            return Err(AutomatonError::NoTraversingStrategy);
        }

        match self.mode {
            RunningMode::Stopped => self.initialize()?,
            RunningMode::Running => {}
            RunningMode::Continuing | RunningMode::Finished => return Ok(self.mode),
        }

        match self.process_next_batch() {
            Ok(batch) => {
                self.steps += 1;
                debug!(
                    step = self.steps,
                    batch = batch.len(),
                    mode = %self.mode,
                    "engine_step_complete"
                );
                self.publish_step(batch);
                Ok(self.mode)
            }
            Err(err) => {
                warn!(step = self.steps + 1, error = %err, "engine_step_failed");
                self.abort();
                Err(err)
            }
        }
    }

    /// Step until the traversal is exhausted or a continuation is needed.
    /// Starts over when stopped or finished.
    pub fn run(&mut self) -> AutomatonResult<RunningMode> {
        if self.traversal.is_none() {
            self.stop_traversing();
            return Err(AutomatonError::NoTraversingStrategy);
        }

        if matches!(self.mode, RunningMode::Stopped | RunningMode::Finished) {
            self.initialize()?;
        }

        let limit = self.config.max_steps;
        let mut taken = 0;
        while self.mode == RunningMode::Running {
            if taken >= limit {
                warn!(limit, "engine_step_limit_exceeded");
                self.abort();
                return Err(AutomatonError::StepLimitExceeded { limit });
            }
            self.step()?;
            taken += 1;
        }

        info!(steps = self.steps, mode = %self.mode, "engine_run_complete");
        Ok(self.mode)
    }

    /// Unroll every pending back-reference once more: the traversal is
    /// re-seeded with the children of their anchors.
    pub fn continue_recursive(&mut self) -> AutomatonResult<RunningMode> {
        if self.mode != RunningMode::Continuing {
            return Err(AutomatonError::RecursiveContinuation {
                message: format!("engine is {}, not CONTINUING", self.mode),
            });
        }
        if self.pending.is_empty() {
            return Err(AutomatonError::RecursiveContinuation {
                message: "no back-reference is pending".into(),
            });
        }

        let tree = self.tree.as_ref().ok_or(AutomatonError::EmptyTree)?;
        let traversal = self
            .traversal
            .as_mut()
            .ok_or(AutomatonError::NoTraversingStrategy)?;

        let mut seeds = Vec::new();
        for anchor in self.pending.drain(..).filter_map(|rec| tree.anchor_of(rec)) {
            for child in tree.owned_children(anchor) {
                if !seeds.contains(&child) {
                    seeds.push(child);
                }
            }
        }

        debug!(seeds = seeds.len(), "engine_continue_recursive");
        traversal.initialize(tree, &seeds);
        self.set_mode(RunningMode::Running);
        Ok(self.mode)
    }

    /// Run, then keep unrolling back-references up to `depth` times (bounded
    /// by `max_continuations`).
    pub fn run_to_depth(&mut self, depth: usize) -> AutomatonResult<RunningMode> {
        self.run()?;
        let bound = depth.min(self.config.max_continuations);
        let mut unrolled = 0;
        while self.mode == RunningMode::Continuing && unrolled < bound {
            self.continue_recursive()?;
            self.run()?;
            unrolled += 1;
        }
        Ok(self.mode)
    }

    /// Stop the run and delete every vertex state. Safe to call repeatedly.
    pub fn stop_traversing(&mut self) {
        if let Some(traversal) = self.traversal.as_mut() {
            traversal.clear();
        }
        if let Some(tree) = self.tree.as_mut() {
            tree.delete_states();
        }
        self.leaf_states.clear();
        self.pending.clear();
        self.buchi.clear();
        self.transition_events.clear();
        self.steps = 0;

        self.set_mode(RunningMode::Stopped);
        self.publish(AutomatonEvent::CurrentVertices {
            vertices: Vec::new(),
        });
    }

    /// Finite acceptance: every recorded leaf state (top-down) or the root
    /// state (bottom-up) satisfies some accepting condition.
    pub fn is_accepted(&self) -> AutomatonResult<bool> {
        let tree = self.tree.as_ref().ok_or(AutomatonError::EmptyTree)?;
        let conditions = self.automaton.accepting_conditions();
        if conditions.is_empty() {
            return Err(AutomatonError::UndefinedAcceptance { kind: "finite" });
        }

        match self.automaton.direction() {
            Direction::TopDown => {
                if self.leaf_states.is_empty() {
                    return Err(AutomatonError::UndefinedTreeState {
                        message: "states in tree leaves are undefined".into(),
                    });
                }
                Ok(self.leaf_states.iter().all(|s| conditions.accepts(s)))
            }
            Direction::BottomUp => {
                let root = tree.root();
                match tree.full_state(root) {
                    Some(state) if tree.has_complete_state(root, self.automaton.variables()) => {
                        Ok(conditions.accepts(state))
                    }
                    _ => Err(AutomatonError::UndefinedTreeState {
                        message: "state of the root is undefined".into(),
                    }),
                }
            }
        }
    }

    /// Büchi acceptance over the prefix unrolled so far.
    pub fn is_buchi_accepted(&self) -> AutomatonResult<bool> {
        if self.tree.is_none() {
            return Err(AutomatonError::EmptyTree);
        }
        let conditions = self.automaton.buchi_accepting_conditions();
        if conditions.is_empty() {
            return Err(AutomatonError::UndefinedAcceptance { kind: "Büchi" });
        }
        if self.buchi.is_empty() {
            return Err(AutomatonError::UndefinedTreeState {
                message: "no back-reference has been reached".into(),
            });
        }
        Ok(self.buchi.is_accepted_by(conditions))
    }

    // Internal helpers

    fn initialize(&mut self) -> AutomatonResult<()> {
        if let Err(err) = self.try_initialize() {
            self.abort();
            return Err(err);
        }
        Ok(())
    }

    fn try_initialize(&mut self) -> AutomatonResult<()> {
        let traversal = self
            .traversal
            .as_mut()
            .ok_or(AutomatonError::NoTraversingStrategy)?;
        let tree = self.tree.as_mut().ok_or(AutomatonError::EmptyTree)?;
        if self.automaton.determinism() == Determinism::NonDeterministic && self.choice.is_none() {
            return Err(AutomatonError::NoNonDeterministicStrategy);
        }

        tree.delete_states();
        self.leaf_states.clear();
        self.pending.clear();
        self.buchi.clear();
        self.transition_events.clear();
        self.steps = 0;

        let variables = self.automaton.variables();
        let seeds = match self.automaton.direction() {
            Direction::TopDown => {
                let root = tree.root();
                tree.set_full_state(root, variables, &initial_state(variables))
                    .map_err(AutomatonError::from_tree)?;
                vec![root]
            }
            Direction::BottomUp => tree.leaves(),
        };

        traversal.initialize(tree, &seeds);
        self.mode = RunningMode::Running;
        info!(
            automaton = %self.automaton.kind().abbreviation(),
            traversal = %traversal.mode(),
            seeds = seeds.len(),
            "engine_initialized"
        );
        Ok(())
    }

    /// Pull one batch and process every vertex of it.
    fn process_next_batch(&mut self) -> AutomatonResult<Vec<VertexId>> {
        let tree = self.tree.as_ref().ok_or(AutomatonError::EmptyTree)?;
        let batch = self
            .traversal
            .as_mut()
            .ok_or(AutomatonError::NoTraversingStrategy)?
            .next_batch(tree)
            .unwrap_or_default();

        for vertex in &batch {
            match self.automaton.direction() {
                Direction::TopDown => self.process_top_down(*vertex)?,
                Direction::BottomUp => self.process_bottom_up(*vertex)?,
            }
        }

        self.mode = self.mode_after_batch();
        Ok(batch)
    }

    fn mode_after_batch(&self) -> RunningMode {
        if self.traversal.as_ref().is_some_and(|t| t.has_next()) {
            RunningMode::Running
        } else if self.automaton.is_infinite() && !self.pending.is_empty() {
            RunningMode::Continuing
        } else {
            RunningMode::Finished
        }
    }

    fn process_top_down(&mut self, vertex: VertexId) -> AutomatonResult<()> {
        let tree = self.tree.as_mut().ok_or(AutomatonError::EmptyTree)?;
        let mut chooser = Chooser {
            determinism: self.automaton.determinism(),
            strategy: &mut self.choice,
        };

        let label = tree
            .label(vertex)
            .ok_or_else(|| undefined_vertex(vertex))?
            .to_string();
        let left = tree.left(vertex);
        let right = tree.right(vertex);

        if tree.anchor_of(vertex).is_some() {
            let snapshot = tree.full_state(vertex).cloned().unwrap_or_default();
            self.buchi.observe(vertex, snapshot);
            if !self.pending.contains(&vertex) {
                self.pending.push(vertex);
            }
        }

        let mut absent_left = State::new();
        let mut absent_right = State::new();

        for variable in self.automaton.variables() {
            let value = tree
                .state_value(vertex, variable.id())
                .ok_or_else(|| undefined_value(vertex, variable.id()))?
                .to_string();
            let candidates = self
                .automaton
                .resolve_top_down(variable.id(), &value, &label)?;
            let (left_value, right_value) = chooser.select(candidates)?;

            match left {
                Some(child) => tree
                    .set_state_value(child, variable, left_value)
                    .map_err(AutomatonError::from_tree)?,
                None => {
                    absent_left.insert(variable.id(), left_value);
                }
            }
            match right {
                Some(child) => tree
                    .set_state_value(child, variable, right_value)
                    .map_err(AutomatonError::from_tree)?,
                None => {
                    absent_right.insert(variable.id(), right_value);
                }
            }
        }

        if left.is_none() {
            self.leaf_states.push(absent_left);
        }
        if right.is_none() {
            self.leaf_states.push(absent_right);
        }
        Ok(())
    }

    fn process_bottom_up(&mut self, vertex: VertexId) -> AutomatonResult<()> {
        let tree = self.tree.as_mut().ok_or(AutomatonError::EmptyTree)?;
        let mut chooser = Chooser {
            determinism: self.automaton.determinism(),
            strategy: &mut self.choice,
        };
        let variables = self.automaton.variables();

        let label = tree
            .label(vertex)
            .ok_or_else(|| undefined_vertex(vertex))?
            .to_string();
        let left = tree.left(vertex);
        let right = tree.right(vertex);

        for variable in variables {
            let child_value = |child: Option<VertexId>| -> AutomatonResult<String> {
                match child {
                    Some(child) => tree
                        .state_value(child, variable.id())
                        .map(str::to_string)
                        .ok_or_else(|| undefined_value(child, variable.id())),
                    None => Ok(variable.init_value().to_string()),
                }
            };
            let left_value = child_value(left)?;
            let right_value = child_value(right)?;

            let candidates = self.automaton.resolve_bottom_up(
                variable.id(),
                &left_value,
                &right_value,
                &label,
            )?;
            let result = chooser.select(candidates)?;
            tree.set_state_value(vertex, variable, result)
                .map_err(AutomatonError::from_tree)?;
        }

        if self.config.emit_events {
            let child_state = |child: Option<VertexId>| {
                child
                    .and_then(|c| tree.full_state(c).cloned())
                    .unwrap_or_else(|| initial_state(variables))
            };
            self.transition_events.push(AutomatonEvent::BottomUpTransition {
                vertex,
                left: child_state(left),
                node: tree.full_state(vertex).cloned().unwrap_or_default(),
                right: child_state(right),
            });
        }
        Ok(())
    }

    /// Stop after a failure, keeping the vertex states.
    fn abort(&mut self) {
        if let Some(traversal) = self.traversal.as_mut() {
            traversal.clear();
        }
        self.pending.clear();
        self.transition_events.clear();
        self.set_mode(RunningMode::Stopped);
    }

    fn set_mode(&mut self, mode: RunningMode) {
        self.mode = mode;
        self.publish(AutomatonEvent::RunningMode { mode });
    }

    fn publish_step(&mut self, batch: Vec<VertexId>) {
        let transitions = std::mem::take(&mut self.transition_events);
        for event in transitions {
            self.publish(event);
        }
        self.publish(AutomatonEvent::CurrentVertices { vertices: batch });
        self.publish(AutomatonEvent::RunningMode { mode: self.mode });
    }

    fn publish(&mut self, event: AutomatonEvent) {
        if self.config.emit_events {
            self.sink.publish(event);
        }
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("automaton", &self.automaton.kind().abbreviation())
            .field("mode", &self.mode)
            .field("traversal", &self.traversal_mode())
            .field("choice", &self.choice_mode())
            .field("steps", &self.steps)
            .finish()
    }
}

/// Picks one result out of a lookup.
struct Chooser<'a> {
    determinism: Determinism,
    strategy: &'a mut Option<Box<dyn ChoiceStrategy>>,
}

impl Chooser<'_> {
    fn select<T: Ord + Clone>(&mut self, candidates: Vec<T>) -> AutomatonResult<T> {
        if self.determinism.is_deterministic() || candidates.len() == 1 {
            return candidates
                .into_iter()
                .next()
                .ok_or(AutomatonError::NoNonDeterministicStrategy);
        }
        let strategy = self
            .strategy
            .as_mut()
            .ok_or(AutomatonError::NoNonDeterministicStrategy)?;
        strategy
            .choose(&candidates)
            .ok_or(AutomatonError::NoNonDeterministicStrategy)
    }
}

fn undefined_vertex(vertex: VertexId) -> AutomatonError {
    AutomatonError::UndefinedTreeState {
        message: format!("vertex {vertex} is not a part of the tree"),
    }
}

fn undefined_value(vertex: VertexId, variable: VariableId) -> AutomatonError {
    AutomatonError::UndefinedTreeState {
        message: format!("vertex {vertex} has no value for variable {variable}"),
    }
}
