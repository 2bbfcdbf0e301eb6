//! Leaves-first traversals.

use std::collections::{BTreeMap, HashMap, HashSet};

use fita_core::{Tree, VertexId};

use super::{Traversal, TraversalMode};

/// Batches where a vertex is scheduled once all its children were scheduled
/// in earlier batches.
///
/// Every inner vertex keeps a counter of unscheduled children. Emitting a
/// batch decrements the parents' counters and a parent joins the next batch
/// when its counter reaches zero.
#[derive(Debug, Default)]
pub struct BottomUpBfs {
    pending_children: HashMap<VertexId, usize>,
    ranks: HashMap<VertexId, usize>,
    ready: Vec<VertexId>,
}

impl Traversal for BottomUpBfs {
    fn mode(&self) -> TraversalMode {
        TraversalMode::Bfs
    }

    fn initialize(&mut self, tree: &Tree, seeds: &[VertexId]) {
        self.ranks = tree.preorder_ranks();
        self.pending_children = tree
            .ids()
            .map(|id| (id, tree.owned_children(id).len()))
            .filter(|(_, count)| *count > 0)
            .collect();

        let mut seen = HashSet::new();
        self.ready = seeds.iter().copied().filter(|v| seen.insert(*v)).collect();
        sort_by_rank(&mut self.ready, &self.ranks);
    }

    fn has_next(&self) -> bool {
        !self.ready.is_empty()
    }

    fn next_batch(&mut self, tree: &Tree) -> Option<Vec<VertexId>> {
        if self.ready.is_empty() {
            return None;
        }

        let mut next = Vec::new();
        for vertex in &self.ready {
            let Some(parent) = tree.parent(*vertex) else {
                continue;
            };
            if let Some(count) = self.pending_children.get_mut(&parent) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    next.push(parent);
                }
            }
        }
        sort_by_rank(&mut next, &self.ranks);

        Some(std::mem::replace(&mut self.ready, next))
    }

    fn clear(&mut self) {
        self.pending_children.clear();
        self.ranks.clear();
        self.ready.clear();
    }
}

/// Depth-synchronized batches: the deepest level first, each batch holding
/// exactly the scheduled vertices at one depth.
#[derive(Debug, Default)]
pub struct BottomUpLevel {
    /// Remaining levels, shallowest first so the deepest is popped next.
    levels: Vec<Vec<VertexId>>,
}

impl Traversal for BottomUpLevel {
    fn mode(&self) -> TraversalMode {
        TraversalMode::Level
    }

    fn initialize(&mut self, tree: &Tree, seeds: &[VertexId]) {
        let ranks = tree.preorder_ranks();

        // The seeds and every ancestor of a seed.
        let mut scheduled = HashSet::new();
        for seed in seeds {
            let mut current = Some(*seed);
            while let Some(vertex) = current {
                if !scheduled.insert(vertex) {
                    break;
                }
                current = tree.parent(vertex);
            }
        }

        let mut by_depth: BTreeMap<usize, Vec<VertexId>> = BTreeMap::new();
        for vertex in scheduled {
            by_depth.entry(tree.depth(vertex)).or_default().push(vertex);
        }

        self.levels = by_depth
            .into_values()
            .map(|mut level| {
                sort_by_rank(&mut level, &ranks);
                level
            })
            .collect();
    }

    fn has_next(&self) -> bool {
        !self.levels.is_empty()
    }

    fn next_batch(&mut self, _tree: &Tree) -> Option<Vec<VertexId>> {
        self.levels.pop()
    }

    fn clear(&mut self) {
        self.levels.clear();
    }
}

fn sort_by_rank(vertices: &mut [VertexId], ranks: &HashMap<VertexId, usize>) {
    vertices.sort_by_key(|v| ranks.get(v).copied().unwrap_or(usize::MAX));
}
