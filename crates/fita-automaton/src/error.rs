//! Error types for the automaton system.

use fita_core::{TreeError, VariableId};
use thiserror::Error;

/// Result type alias for automaton operations.
pub type AutomatonResult<T> = Result<T, AutomatonError>;

/// Errors that can occur while defining or running an automaton.
#[derive(Debug, Error)]
pub enum AutomatonError {
    /// No tree is bound to the engine.
    #[error("no tree specified")]
    EmptyTree,

    /// The tree's finiteness does not suit the automaton.
    #[error("tree finiteness violated: {message}")]
    TreeFiniteness { message: String },

    /// Acceptance was requested but no conditions are registered.
    #[error("automaton has no {kind} acceptance conditions defined")]
    UndefinedAcceptance { kind: &'static str },

    /// A vertex state needed by the operation has not been computed.
    #[error("undefined tree state: {message}")]
    UndefinedTreeState { message: String },

    /// No stored entry matches the arguments under any wildcard expansion.
    #[error("no transition for variable {variable} with arguments {key}")]
    NoSuchTransition { variable: VariableId, key: String },

    /// The key already maps to a different result in a deterministic table.
    #[error("duplicated transition for variable {variable} with arguments {key}")]
    DuplicatedTransition { variable: VariableId, key: String },

    /// Wildcards used in an illegal combination.
    #[error("illegal transition {key}: {message}")]
    IllegalTransition { key: String, message: String },

    /// A value outside the variable's domain.
    #[error("value '{value}' is not in the domain of variable {variable}")]
    IllegalVariableValue { variable: VariableId, value: String },

    /// A label outside the automaton's alphabet.
    #[error("label '{label}' is not a part of the alphabet")]
    IllegalLabel { label: String },

    /// The engine has no traversal strategy bound.
    #[error("automaton has no traversing strategy")]
    NoTraversingStrategy,

    /// The traversal mode does not exist for the automaton direction.
    #[error("traversal mode {mode} is not supported for {direction} automata")]
    IncorrectTraversal {
        mode: &'static str,
        direction: &'static str,
    },

    /// A non-deterministic automaton has no choice strategy bound.
    #[error("non-deterministic automaton has no choice strategy")]
    NoNonDeterministicStrategy,

    /// Continuation requested with no pending back-reference.
    #[error("cannot continue recursive traversal: {message}")]
    RecursiveContinuation { message: String },

    /// A single run exceeded the configured step bound.
    #[error("run exceeded the step limit of {limit}")]
    StepLimitExceeded { limit: usize },

    /// The automaton definition is inconsistent.
    #[error("invalid automaton definition: {message}")]
    InvalidDefinition { message: String },

    /// Structural tree error.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Document (de)serialization error.
    #[error("automaton document error: {0}")]
    Document(#[from] serde_json::Error),

    /// I/O error (file operations).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl AutomatonError {
    /// Map tree errors onto the automaton error kinds they correspond to.
    pub(crate) fn from_tree(err: TreeError) -> Self {
        match err {
            TreeError::IllegalVariableValue { variable, value } => {
                AutomatonError::IllegalVariableValue { variable, value }
            }
            other => AutomatonError::Tree(other),
        }
    }
}
