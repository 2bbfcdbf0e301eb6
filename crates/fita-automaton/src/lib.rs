//! Step-by-step execution engine for finite and infinite tree automata.
//!
//! ## Core Concepts
//!
//! - **Transition table**: maps `(variable, arguments)` to one result
//!   (deterministic) or a set of results (non-deterministic), with wildcard
//!   arguments resolved by an ordered priority search
//! - **Traversal**: the order in which vertex batches are processed, for
//!   top-down (root first) and bottom-up (leaves first) automata
//! - **Choice strategy**: picks one result when a non-deterministic table
//!   offers several
//! - **Engine**: binds an automaton to a tree and drives the run through the
//!   running modes `STOPPED`, `RUNNING`, `CONTINUING` and `FINISHED`
//! - **Acceptance**: finite acceptance of leaf or root states, and an
//!   approximated Büchi acceptance for infinite trees
//!
//! ## Example
//!
//! ```
//! use fita_automaton::{Automaton, Determinism, Engine, RunningMode, TraversalMode};
//! use fita_core::{Alphabet, Side, TreeBuilder, Variable, VariableId};
//!
//! let var = Variable::new(VariableId(1), "A", ["A", "B"]).unwrap();
//! let mut automaton =
//!     Automaton::top_down(Determinism::Deterministic, [var], Alphabet::new(["x"])).unwrap();
//! automaton
//!     .add_top_down_transition(VariableId(1), "*", "x", "B", "=")
//!     .unwrap();
//!
//! let mut builder = TreeBuilder::new();
//! let root = builder.root_node("x").unwrap();
//! let left = builder.add_node(root, Side::Left, "x").unwrap();
//!
//! let mut engine = Engine::new(automaton);
//! engine.set_traversal(TraversalMode::Dfs).unwrap();
//! engine.set_tree(builder.build().unwrap()).unwrap();
//!
//! assert_eq!(engine.run().unwrap(), RunningMode::Finished);
//! assert_eq!(engine.tree().unwrap().state_value(left, VariableId(1)), Some("B"));
//! ```

mod acceptance;
mod automaton;
mod choice;
mod config;
pub mod description;
mod engine;
mod error;
mod event;
mod transition;
pub mod traversal;
mod wildcard;

#[cfg(test)]
mod test_fixtures;

pub use acceptance::{AcceptanceConditions, AcceptingCondition, BuchiRecord, Requirement};
pub use automaton::{Automaton, AutomatonKind, Direction, Transitions};
pub use choice::{ChoiceMode, ChoiceStrategy, FirstChoice, GreatestChoice, RandomChoice};
pub use config::EngineConfig;
pub use description::{AutomatonDocument, TransitionDocument, VariableDocument};
pub use engine::{Engine, RunningMode};
pub use error::{AutomatonError, AutomatonResult};
pub use event::{AutomatonEvent, EventSink, NullSink, TracingSink};
pub use transition::{
    BottomUpKey, BottomUpTransitions, Determinism, TopDownKey, TopDownOutput, TopDownTransitions,
    TransitionKey, TransitionOutput, TransitionTable,
};
pub use traversal::{Traversal, TraversalMode};
pub use wildcard::{Arg, Output, EVERY_VALUE, LEFT_VALUE, RIGHT_VALUE, SAME_VALUE};
