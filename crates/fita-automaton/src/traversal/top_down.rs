//! Root-first traversals. Both stop at back-references, which own no children.

use std::collections::HashSet;

use fita_core::{Tree, VertexId};

use super::{Traversal, TraversalMode};

/// Single-vertex batches in depth-first preorder.
#[derive(Debug, Default)]
pub struct TopDownDfs {
    stack: Vec<VertexId>,
}

impl Traversal for TopDownDfs {
    fn mode(&self) -> TraversalMode {
        TraversalMode::Dfs
    }

    fn initialize(&mut self, _tree: &Tree, seeds: &[VertexId]) {
        self.stack.clear();
        self.stack.extend(seeds.iter().rev().copied());
    }

    fn has_next(&self) -> bool {
        !self.stack.is_empty()
    }

    fn next_batch(&mut self, tree: &Tree) -> Option<Vec<VertexId>> {
        let vertex = self.stack.pop()?;
        self.stack.extend(tree.owned_children(vertex).into_iter().rev());
        Some(vec![vertex])
    }

    fn clear(&mut self) {
        self.stack.clear();
    }
}

/// Batches of vertices at the same distance from the seeds.
#[derive(Debug)]
pub struct TopDownBfs {
    mode: TraversalMode,
    frontier: Vec<VertexId>,
}

impl TopDownBfs {
    pub(crate) fn with_mode(mode: TraversalMode) -> Self {
        Self {
            mode,
            frontier: Vec::new(),
        }
    }
}

impl Default for TopDownBfs {
    fn default() -> Self {
        Self::with_mode(TraversalMode::Bfs)
    }
}

impl Traversal for TopDownBfs {
    fn mode(&self) -> TraversalMode {
        self.mode
    }

    fn initialize(&mut self, _tree: &Tree, seeds: &[VertexId]) {
        let mut seen = HashSet::new();
        self.frontier = seeds.iter().copied().filter(|v| seen.insert(*v)).collect();
    }

    fn has_next(&self) -> bool {
        !self.frontier.is_empty()
    }

    fn next_batch(&mut self, tree: &Tree) -> Option<Vec<VertexId>> {
        if self.frontier.is_empty() {
            return None;
        }
        let next = self
            .frontier
            .iter()
            .flat_map(|v| tree.owned_children(*v))
            .collect();
        Some(std::mem::replace(&mut self.frontier, next))
    }

    fn clear(&mut self) {
        self.frontier.clear();
    }
}
