//! Outward notifications published by the engine.
//!
//! Publication is fire-and-forget: sinks never block the engine and the
//! engine keeps no history of what it published.

use std::sync::mpsc;

use fita_core::{State, VertexId};
use serde::Serialize;
use tracing::debug;

use crate::engine::RunningMode;

/// Event published after a successful step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AutomatonEvent {
    /// The running mode changed or was re-entered.
    RunningMode { mode: RunningMode },
    /// Vertices of the batch that was just processed. Empty after a stop.
    CurrentVertices { vertices: Vec<VertexId> },
    /// Bottom-up only: left child state, new vertex state, right child state.
    BottomUpTransition {
        vertex: VertexId,
        left: State,
        node: State,
        right: State,
    },
}

/// Receiver of engine events.
pub trait EventSink: Send {
    fn publish(&mut self, event: AutomatonEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&mut self, _event: AutomatonEvent) {}
}

/// Forwards events to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn publish(&mut self, event: AutomatonEvent) {
        match &event {
            AutomatonEvent::RunningMode { mode } => debug!(mode = %mode, "running_mode"),
            AutomatonEvent::CurrentVertices { vertices } => {
                debug!(count = vertices.len(), ?vertices, "current_vertices")
            }
            AutomatonEvent::BottomUpTransition {
                vertex,
                left,
                node,
                right,
            } => debug!(%vertex, ?left, ?node, ?right, "bottom_up_transition"),
        }
    }
}

/// Channel sink. A disconnected receiver is ignored.
impl EventSink for mpsc::Sender<AutomatonEvent> {
    fn publish(&mut self, event: AutomatonEvent) {
        let _ = self.send(event);
    }
}
