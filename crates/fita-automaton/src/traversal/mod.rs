//! Traversal strategies.
//!
//! A traversal produces the ordered sequence of vertex batches an engine
//! processes. Strategies are polymorphic over the automaton direction and the
//! traversal order:
//!
//! | direction | `dfs`                    | `bfs`                    | `level`                   |
//! |-----------|--------------------------|--------------------------|---------------------------|
//! | top-down  | single vertices, preorder | same-depth sets          | same as `bfs`             |
//! | bottom-up | unsupported              | children-ready batches   | depth-synchronized batches |

mod bottom_up;
mod top_down;

use std::fmt;

use fita_core::{Tree, VertexId};
use serde::{Deserialize, Serialize};

use crate::automaton::Direction;
use crate::error::{AutomatonError, AutomatonResult};

pub use bottom_up::{BottomUpBfs, BottomUpLevel};
pub use top_down::{TopDownBfs, TopDownDfs};

/// Traversal order requested for an engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalMode {
    Dfs,
    #[default]
    Bfs,
    Level,
}

impl TraversalMode {
    pub fn name(&self) -> &'static str {
        match self {
            TraversalMode::Dfs => "dfs",
            TraversalMode::Bfs => "bfs",
            TraversalMode::Level => "level",
        }
    }
}

impl fmt::Display for TraversalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for TraversalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dfs" => Ok(TraversalMode::Dfs),
            "bfs" => Ok(TraversalMode::Bfs),
            "level" => Ok(TraversalMode::Level),
            other => Err(format!("unknown traversal mode '{other}'")),
        }
    }
}

/// Produces vertex batches for an engine.
pub trait Traversal: Send + fmt::Debug {
    fn mode(&self) -> TraversalMode;

    /// Reset the scheduling state and start from `seeds`. Calling it again
    /// discards whatever was scheduled before.
    fn initialize(&mut self, tree: &Tree, seeds: &[VertexId]);

    /// Whether another batch is available.
    fn has_next(&self) -> bool;

    /// Produce the next batch and advance.
    fn next_batch(&mut self, tree: &Tree) -> Option<Vec<VertexId>>;

    /// Drop all scheduling state.
    fn clear(&mut self);
}

/// Create the traversal for a direction and mode.
pub fn traversal_for(direction: Direction, mode: TraversalMode) -> AutomatonResult<Box<dyn Traversal>> {
    match (direction, mode) {
        (Direction::TopDown, TraversalMode::Dfs) => Ok(Box::new(TopDownDfs::default())),
        (Direction::TopDown, TraversalMode::Bfs) => Ok(Box::new(TopDownBfs::default())),
        (Direction::TopDown, TraversalMode::Level) => {
            Ok(Box::new(TopDownBfs::with_mode(TraversalMode::Level)))
        }
        (Direction::BottomUp, TraversalMode::Bfs) => Ok(Box::new(BottomUpBfs::default())),
        (Direction::BottomUp, TraversalMode::Level) => Ok(Box::new(BottomUpLevel::default())),
        (Direction::BottomUp, TraversalMode::Dfs) => Err(AutomatonError::IncorrectTraversal {
            mode: mode.name(),
            direction: direction.name(),
        }),
    }
}
