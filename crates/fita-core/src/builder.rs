//! Top-down construction of trees.

use crate::error::{TreeError, TreeResult};
use crate::tree::{NodeData, RecData, Side, Tree, Vertex, VertexId};

/// Builds a [`Tree`] from the root downwards.
///
/// Children are attached to already existing parents, so a back-reference can
/// only be attached once its anchor exists, and the anchor is checked to be a
/// strict ancestor of the new vertex.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    vertices: Vec<Vertex>,
    root: Option<VertexId>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a plain root vertex.
    pub fn root_node(&mut self, label: impl Into<String>) -> TreeResult<VertexId> {
        self.root_vertex(Vertex::Node(NodeData::new(label, None)))
    }

    /// Create a root vertex that is also a repeat anchor.
    pub fn root_repeat(&mut self, label: impl Into<String>) -> TreeResult<VertexId> {
        self.root_vertex(Vertex::Repeat(NodeData::new(label, None)))
    }

    pub fn add_node(
        &mut self,
        parent: VertexId,
        side: Side,
        label: impl Into<String>,
    ) -> TreeResult<VertexId> {
        self.attach(parent, side, Vertex::Node(NodeData::new(label, Some(parent))))
    }

    pub fn add_repeat(
        &mut self,
        parent: VertexId,
        side: Side,
        label: impl Into<String>,
    ) -> TreeResult<VertexId> {
        self.attach(parent, side, Vertex::Repeat(NodeData::new(label, Some(parent))))
    }

    /// Attach a back-reference to `anchor`, which must be a repeat vertex on
    /// the path from the root to `parent` (inclusive).
    pub fn add_back_reference(
        &mut self,
        parent: VertexId,
        side: Side,
        anchor: VertexId,
    ) -> TreeResult<VertexId> {
        match self.vertices.get(anchor.0) {
            Some(Vertex::Repeat(_)) => {}
            Some(_) => return Err(TreeError::NotAnAnchor { target: anchor }),
            None => return Err(TreeError::VertexNotFound { vertex: anchor }),
        }

        if !self.is_ancestor_or_self(anchor, parent) {
            return Err(TreeError::AnchorNotAncestor {
                anchor: anchor.to_string(),
            });
        }

        self.attach(
            parent,
            side,
            Vertex::Rec(RecData {
                anchor,
                parent: Some(parent),
                snapshot: Default::default(),
            }),
        )
    }

    /// Finish construction.
    pub fn build(self) -> TreeResult<Tree> {
        let root = self.root.ok_or(TreeError::MissingRoot)?;
        Ok(Tree {
            vertices: self.vertices,
            root,
        })
    }

    fn root_vertex(&mut self, vertex: Vertex) -> TreeResult<VertexId> {
        if self.root.is_some() {
            return Err(TreeError::RootDefined);
        }
        let id = self.push(vertex);
        self.root = Some(id);
        Ok(id)
    }

    fn attach(&mut self, parent: VertexId, side: Side, vertex: Vertex) -> TreeResult<VertexId> {
        let id = VertexId(self.vertices.len());
        let data = match self.vertices.get_mut(parent.0) {
            Some(Vertex::Node(data)) | Some(Vertex::Repeat(data)) => data,
            Some(Vertex::Rec(_)) => return Err(TreeError::ChildOfBackReference { vertex: parent }),
            None => return Err(TreeError::VertexNotFound { vertex: parent }),
        };

        let slot = match side {
            Side::Left => &mut data.left,
            Side::Right => &mut data.right,
        };
        if slot.is_some() {
            return Err(TreeError::SlotOccupied { parent, side });
        }
        *slot = Some(id);

        Ok(self.push(vertex))
    }

    fn push(&mut self, vertex: Vertex) -> VertexId {
        let id = VertexId(self.vertices.len());
        self.vertices.push(vertex);
        id
    }

    fn is_ancestor_or_self(&self, candidate: VertexId, mut vertex: VertexId) -> bool {
        loop {
            if vertex == candidate {
                return true;
            }
            match self.vertices.get(vertex.0).and_then(Vertex::parent) {
                Some(parent) => vertex = parent,
                None => return false,
            }
        }
    }
}
