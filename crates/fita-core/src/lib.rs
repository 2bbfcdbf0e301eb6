//! Core domain types for finite tree automata.
//!
//! - **Variable**: a finite value domain with an initial value
//! - **Alphabet**: the finite set of vertex labels
//! - **Tree**: a binary tree in an index-addressed arena. Besides plain nodes
//!   it supports repeat anchors and back-references, which represent an
//!   eventually periodic infinite tree with finitely many vertices
//! - **TreeDocument**: the serializable form of a tree

mod builder;
mod document;
mod error;
mod tree;
mod variable;

pub use builder::TreeBuilder;
pub use document::TreeDocument;
pub use error::{TreeError, TreeResult};
pub use tree::{NodeData, RecData, Side, Tree, Vertex, VertexId, VertexKind};
pub use variable::{initial_state, Alphabet, State, Variable, VariableId};
