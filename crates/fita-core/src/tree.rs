//! Binary tree arena with back-references.
//!
//! Vertices live in a flat arena addressed by [`VertexId`]. Every vertex is
//! owned by its parent except the root. A [`Vertex::Rec`] holds a non-owning
//! index to an ancestor [`Vertex::Repeat`] and reads its label and children
//! through it, which gives a finite representation of an eventually periodic
//! infinite tree:
//!
//! ```text
//!        1
//!       / \
//!      2   R(5)  <- anchor
//!         /   \
//!        6     7
//!             / \
//!        Rec(5)   9
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TreeError, TreeResult};
use crate::variable::{State, Variable, VariableId};

/// Index of a vertex inside its [`Tree`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(pub usize);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Which child slot of a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Discriminant of a [`Vertex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VertexKind {
    Node,
    Repeat,
    Rec,
}

/// Label, children and state of a node or repeat vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub label: String,
    pub left: Option<VertexId>,
    pub right: Option<VertexId>,
    pub parent: Option<VertexId>,
    #[serde(default)]
    pub state: State,
}

impl NodeData {
    pub fn new(label: impl Into<String>, parent: Option<VertexId>) -> Self {
        Self {
            label: label.into(),
            left: None,
            right: None,
            parent,
            state: State::new(),
        }
    }
}

/// A back-reference to an ancestor repeat vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecData {
    pub anchor: VertexId,
    pub parent: Option<VertexId>,
    /// State assigned at this occurrence; the anchor holds the same values
    /// right after the assignment.
    #[serde(default)]
    pub snapshot: State,
}

/// One vertex of the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Vertex {
    Node(NodeData),
    Repeat(NodeData),
    Rec(RecData),
}

impl Vertex {
    pub fn kind(&self) -> VertexKind {
        match self {
            Vertex::Node(_) => VertexKind::Node,
            Vertex::Repeat(_) => VertexKind::Repeat,
            Vertex::Rec(_) => VertexKind::Rec,
        }
    }

    pub fn parent(&self) -> Option<VertexId> {
        match self {
            Vertex::Node(data) | Vertex::Repeat(data) => data.parent,
            Vertex::Rec(rec) => rec.parent,
        }
    }

    fn node_data(&self) -> Option<&NodeData> {
        match self {
            Vertex::Node(data) | Vertex::Repeat(data) => Some(data),
            Vertex::Rec(_) => None,
        }
    }

    fn node_data_mut(&mut self) -> Option<&mut NodeData> {
        match self {
            Vertex::Node(data) | Vertex::Repeat(data) => Some(data),
            Vertex::Rec(_) => None,
        }
    }
}

/// A binary tree stored in an index-addressed arena.
///
/// Trees are created through [`TreeBuilder`](crate::TreeBuilder), which
/// enforces that back-references only target strict ancestors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) root: VertexId,
}

impl Tree {
    pub fn root(&self) -> VertexId {
        self.root
    }

    /// Number of vertices in the arena (back-references included).
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.0)
    }

    pub fn contains(&self, id: VertexId) -> bool {
        id.0 < self.vertices.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = VertexId> {
        (0..self.vertices.len()).map(VertexId)
    }

    pub fn kind(&self, id: VertexId) -> Option<VertexKind> {
        self.vertex(id).map(Vertex::kind)
    }

    /// Whether the tree represents an infinite tree.
    pub fn contains_back_reference(&self) -> bool {
        self.vertices.iter().any(|v| matches!(v, Vertex::Rec(_)))
    }

    /// Anchor of a back-reference, `None` for any other vertex.
    pub fn anchor_of(&self, id: VertexId) -> Option<VertexId> {
        match self.vertex(id)? {
            Vertex::Rec(rec) => Some(rec.anchor),
            _ => None,
        }
    }

    /// Node data of a vertex, dereferencing back-references.
    fn resolved(&self, id: VertexId) -> Option<&NodeData> {
        match self.vertex(id)? {
            Vertex::Rec(rec) => self.vertex(rec.anchor)?.node_data(),
            other => other.node_data(),
        }
    }

    pub fn label(&self, id: VertexId) -> Option<&str> {
        self.resolved(id).map(|data| data.label.as_str())
    }

    pub fn left(&self, id: VertexId) -> Option<VertexId> {
        self.resolved(id).and_then(|data| data.left)
    }

    pub fn right(&self, id: VertexId) -> Option<VertexId> {
        self.resolved(id).and_then(|data| data.right)
    }

    pub fn child(&self, id: VertexId, side: Side) -> Option<VertexId> {
        match side {
            Side::Left => self.left(id),
            Side::Right => self.right(id),
        }
    }

    pub fn has_children(&self, id: VertexId) -> bool {
        self.left(id).is_some() || self.right(id).is_some()
    }

    pub fn parent(&self, id: VertexId) -> Option<VertexId> {
        self.vertex(id).and_then(Vertex::parent)
    }

    /// Children owned by the vertex itself, left first.
    ///
    /// Back-references own nothing, so traversals stop at them.
    pub fn owned_children(&self, id: VertexId) -> Vec<VertexId> {
        match self.vertex(id).and_then(Vertex::node_data) {
            Some(data) => data.left.into_iter().chain(data.right).collect(),
            None => Vec::new(),
        }
    }

    /// Number of edges between the root and the vertex.
    pub fn depth(&self, id: VertexId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(parent);
        }
        depth
    }

    /// Owned vertices in depth-first pre-order, starting at the root.
    pub fn preorder(&self) -> Vec<VertexId> {
        let mut order = Vec::with_capacity(self.vertices.len());
        let mut stack = vec![self.root];

        while let Some(id) = stack.pop() {
            order.push(id);
            let children = self.owned_children(id);
            stack.extend(children.into_iter().rev());
        }

        order
    }

    /// Position of every vertex in [`Tree::preorder`]. Within one depth this
    /// is the left-to-right order.
    pub fn preorder_ranks(&self) -> HashMap<VertexId, usize> {
        self.preorder()
            .into_iter()
            .enumerate()
            .map(|(rank, id)| (id, rank))
            .collect()
    }

    /// Vertices without children, left to right.
    pub fn leaves(&self) -> Vec<VertexId> {
        self.preorder()
            .into_iter()
            .filter(|id| !self.has_children(*id))
            .collect()
    }

    /// Labels of every vertex that stores one.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.vertices
            .iter()
            .filter_map(Vertex::node_data)
            .map(|data| data.label.as_str())
    }

    /// Full state of a vertex. A back-reference answers with its snapshot.
    pub fn full_state(&self, id: VertexId) -> Option<&State> {
        match self.vertex(id)? {
            Vertex::Rec(rec) => Some(&rec.snapshot),
            other => other.node_data().map(|data| &data.state),
        }
    }

    /// Value of one variable, `None` while undefined.
    pub fn state_value(&self, id: VertexId, variable: VariableId) -> Option<&str> {
        self.full_state(id)
            .and_then(|state| state.get(&variable))
            .map(String::as_str)
    }

    /// Whether every given variable has a value at the vertex.
    pub fn has_complete_state<'a>(
        &self,
        id: VertexId,
        variables: impl IntoIterator<Item = &'a Variable>,
    ) -> bool {
        match self.full_state(id) {
            Some(state) => variables.into_iter().all(|v| state.contains_key(&v.id())),
            None => false,
        }
    }

    /// Assign a value of `variable` at the vertex.
    ///
    /// Assigning to a back-reference also assigns the anchor and refreshes the
    /// back-reference snapshot.
    pub fn set_state_value(
        &mut self,
        id: VertexId,
        variable: &Variable,
        value: impl Into<String>,
    ) -> TreeResult<()> {
        let value = value.into();
        if !variable.contains(&value) {
            return Err(TreeError::IllegalVariableValue {
                variable: variable.id(),
                value,
            });
        }

        let anchor = match self.vertex(id) {
            Some(Vertex::Rec(rec)) => Some(rec.anchor),
            Some(_) => None,
            None => return Err(TreeError::VertexNotFound { vertex: id }),
        };

        match anchor {
            Some(anchor) => {
                let anchor_state = {
                    let data = self
                        .vertices
                        .get_mut(anchor.0)
                        .and_then(Vertex::node_data_mut)
                        .ok_or(TreeError::NotAnAnchor { target: anchor })?;
                    data.state.insert(variable.id(), value);
                    data.state.clone()
                };
                if let Some(Vertex::Rec(rec)) = self.vertices.get_mut(id.0) {
                    rec.snapshot = anchor_state;
                }
            }
            None => {
                if let Some(data) = self.vertices.get_mut(id.0).and_then(Vertex::node_data_mut) {
                    data.state.insert(variable.id(), value);
                }
            }
        }

        Ok(())
    }

    /// Replace the whole state of a vertex, validating every value.
    pub fn set_full_state<'a>(
        &mut self,
        id: VertexId,
        variables: impl IntoIterator<Item = &'a Variable>,
        state: &State,
    ) -> TreeResult<()> {
        for variable in variables {
            if let Some(value) = state.get(&variable.id()) {
                self.set_state_value(id, variable, value.clone())?;
            }
        }
        Ok(())
    }

    /// Clear the state of one vertex. For a back-reference the anchor state is
    /// cleared as well.
    pub fn delete_state(&mut self, id: VertexId) {
        let anchor = match self.vertices.get_mut(id.0) {
            Some(Vertex::Rec(rec)) => {
                rec.snapshot.clear();
                Some(rec.anchor)
            }
            Some(vertex) => {
                if let Some(data) = vertex.node_data_mut() {
                    data.state.clear();
                }
                None
            }
            None => None,
        };

        if let Some(data) = anchor
            .and_then(|a| self.vertices.get_mut(a.0))
            .and_then(Vertex::node_data_mut)
        {
            data.state.clear();
        }
    }

    /// Clear every per-vertex state.
    pub fn delete_states(&mut self) {
        for vertex in &mut self.vertices {
            match vertex {
                Vertex::Node(data) | Vertex::Repeat(data) => data.state.clear(),
                Vertex::Rec(rec) => rec.snapshot.clear(),
            }
        }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_vertex(tree: &Tree, id: VertexId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match tree.vertex(id) {
                Some(Vertex::Rec(rec)) => write!(f, "@{}", rec.anchor),
                Some(Vertex::Node(data)) | Some(Vertex::Repeat(data)) => {
                    if matches!(tree.vertex(id), Some(Vertex::Repeat(_))) {
                        write!(f, "{}:", id)?;
                    }
                    write!(f, "{}", data.label)?;
                    if data.left.is_some() || data.right.is_some() {
                        write!(f, "(")?;
                        match data.left {
                            Some(left) => write_vertex(tree, left, f)?,
                            None => write!(f, "#")?,
                        }
                        write!(f, ", ")?;
                        match data.right {
                            Some(right) => write_vertex(tree, right, f)?,
                            None => write!(f, "#")?,
                        }
                        write!(f, ")")?;
                    }
                    Ok(())
                }
                None => write!(f, "?"),
            }
        }

        write_vertex(self, self.root, f)
    }
}
