//! Error types for the tree model.

use thiserror::Error;

use crate::tree::{Side, VertexId};
use crate::variable::VariableId;

/// Result type alias for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// Errors raised while building trees or assigning vertex state.
#[derive(Debug, Error)]
pub enum TreeError {
    /// A variable was declared without any legal value.
    #[error("variable {variable} has an empty domain")]
    EmptyDomain { variable: VariableId },

    /// The declared initial value is not part of the variable's domain.
    #[error("initial value '{value}' is not in the domain of variable {variable}")]
    IllegalInitialValue { variable: VariableId, value: String },

    /// A state value outside the variable's domain.
    #[error("value '{value}' is not in the domain of variable {variable}")]
    IllegalVariableValue { variable: VariableId, value: String },

    /// A vertex referenced by ID does not exist in the arena.
    #[error("vertex not found: {vertex:?}")]
    VertexNotFound { vertex: VertexId },

    /// The child slot is already taken.
    #[error("vertex {parent:?} already has a {side} child")]
    SlotOccupied { parent: VertexId, side: Side },

    /// Back-references never own children; they read them through their anchor.
    #[error("back-reference {vertex:?} cannot own children")]
    ChildOfBackReference { vertex: VertexId },

    /// The back-reference target is not a repeat vertex.
    #[error("vertex {target:?} is not a repeat anchor")]
    NotAnAnchor { target: VertexId },

    /// The back-reference target is not a strict ancestor.
    #[error("anchor '{anchor}' is not an ancestor of the back-reference")]
    AnchorNotAncestor { anchor: String },

    /// Two repeat vertices share the same document identifier.
    #[error("duplicated anchor identifier '{anchor}'")]
    DuplicatedAnchor { anchor: String },

    /// The tree has no root.
    #[error("tree has no root vertex")]
    MissingRoot,

    /// The root was already set.
    #[error("tree root is already defined")]
    RootDefined,

    /// Document (de)serialization error.
    #[error("tree document error: {0}")]
    Document(#[from] serde_json::Error),

    /// I/O error (file operations).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
