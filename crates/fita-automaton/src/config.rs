//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::choice::ChoiceMode;

/// Configuration for the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum steps a single `run` may take before failing.
    pub max_steps: usize,

    /// Maximum unrollings `run_to_depth` performs.
    pub max_continuations: usize,

    /// Publish events to the engine's sink.
    pub emit_events: bool,

    /// Choice strategy used when none is bound explicitly.
    pub default_choice: ChoiceMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: 10_000,
            max_continuations: 16,
            emit_events: true,
            default_choice: ChoiceMode::First,
        }
    }
}

impl EngineConfig {
    /// Create a config for quick iteration (small bounds, no events).
    pub fn fast() -> Self {
        Self {
            max_steps: 1_000,
            max_continuations: 4,
            emit_events: false,
            ..Default::default()
        }
    }

    /// Create a config for deep unrolling.
    pub fn thorough() -> Self {
        Self {
            max_steps: 1_000_000,
            max_continuations: 256,
            ..Default::default()
        }
    }
}
