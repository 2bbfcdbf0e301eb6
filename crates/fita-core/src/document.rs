//! Serializable tree documents.
//!
//! A tree document is a nested JSON value:
//!
//! ```json
//! { "kind": "node", "label": "1",
//!   "left":  { "kind": "node", "label": "2" },
//!   "right": { "kind": "repeat", "id": "loop", "label": "5",
//!              "left": { "kind": "rec", "anchor": "loop" } } }
//! ```
//!
//! Loading goes through [`TreeBuilder`], so back-references are checked to
//! target an enclosing repeat.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::builder::TreeBuilder;
use crate::error::{TreeError, TreeResult};
use crate::tree::{Side, Tree, Vertex, VertexId};

/// One vertex of a tree document, with its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TreeDocument {
    Node {
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        left: Option<Box<TreeDocument>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        right: Option<Box<TreeDocument>>,
    },
    Repeat {
        id: String,
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        left: Option<Box<TreeDocument>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        right: Option<Box<TreeDocument>>,
    },
    Rec {
        anchor: String,
    },
}

impl TreeDocument {
    /// Parse a document from JSON text.
    pub fn from_json(json: &str) -> TreeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a document from a file.
    pub fn load(path: impl AsRef<Path>) -> TreeResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn to_json(&self) -> TreeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build the arena for this document.
    pub fn into_tree(self) -> TreeResult<Tree> {
        let mut loader = Loader::default();

        let root = match self {
            TreeDocument::Node { label, left, right } => {
                let id = loader.builder.root_node(label)?;
                loader.children(id, left, right)?;
                id
            }
            TreeDocument::Repeat {
                id: anchor,
                label,
                left,
                right,
            } => {
                let id = loader.builder.root_repeat(label)?;
                loader.enter(anchor.clone(), id)?;
                loader.children(id, left, right)?;
                loader.leave(&anchor);
                id
            }
            TreeDocument::Rec { anchor } => {
                return Err(TreeError::AnchorNotAncestor { anchor });
            }
        };

        let tree = loader.builder.build()?;
        debug_assert_eq!(tree.root(), root);
        Ok(tree)
    }
}

#[derive(Default)]
struct Loader {
    builder: TreeBuilder,
    /// Repeat identifiers on the path from the root to the current vertex.
    scope: HashMap<String, VertexId>,
    seen: HashSet<String>,
}

impl Loader {
    fn enter(&mut self, anchor: String, id: VertexId) -> TreeResult<()> {
        if !self.seen.insert(anchor.clone()) {
            return Err(TreeError::DuplicatedAnchor { anchor });
        }
        self.scope.insert(anchor, id);
        Ok(())
    }

    fn leave(&mut self, anchor: &str) {
        self.scope.remove(anchor);
    }

    fn children(
        &mut self,
        parent: VertexId,
        left: Option<Box<TreeDocument>>,
        right: Option<Box<TreeDocument>>,
    ) -> TreeResult<()> {
        if let Some(left) = left {
            self.child(parent, Side::Left, *left)?;
        }
        if let Some(right) = right {
            self.child(parent, Side::Right, *right)?;
        }
        Ok(())
    }

    fn child(&mut self, parent: VertexId, side: Side, doc: TreeDocument) -> TreeResult<()> {
        match doc {
            TreeDocument::Node { label, left, right } => {
                let id = self.builder.add_node(parent, side, label)?;
                self.children(id, left, right)
            }
            TreeDocument::Repeat {
                id: anchor,
                label,
                left,
                right,
            } => {
                let id = self.builder.add_repeat(parent, side, label)?;
                self.enter(anchor.clone(), id)?;
                self.children(id, left, right)?;
                self.leave(&anchor);
                Ok(())
            }
            TreeDocument::Rec { anchor } => {
                let target = *self
                    .scope
                    .get(&anchor)
                    .ok_or_else(|| TreeError::AnchorNotAncestor {
                        anchor: anchor.clone(),
                    })?;
                self.builder.add_back_reference(parent, side, target)?;
                Ok(())
            }
        }
    }
}

impl Tree {
    /// Rebuild a document from the arena. Repeat vertices are named after
    /// their vertex index.
    pub fn to_document(&self) -> TreeDocument {
        self.document_at(self.root())
    }

    fn document_at(&self, id: VertexId) -> TreeDocument {
        let subtree = |child: Option<VertexId>| child.map(|c| Box::new(self.document_at(c)));

        match self.vertex(id) {
            Some(Vertex::Node(data)) => TreeDocument::Node {
                label: data.label.clone(),
                left: subtree(data.left),
                right: subtree(data.right),
            },
            Some(Vertex::Repeat(data)) => TreeDocument::Repeat {
                id: id.to_string(),
                label: data.label.clone(),
                left: subtree(data.left),
                right: subtree(data.right),
            },
            Some(Vertex::Rec(rec)) => TreeDocument::Rec {
                anchor: rec.anchor.to_string(),
            },
            None => TreeDocument::Rec {
                anchor: id.to_string(),
            },
        }
    }
}
