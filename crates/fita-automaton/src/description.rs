//! Serializable automaton documents.
//!
//! The document is validated completely before an [`Automaton`] is returned:
//! labels must belong to the alphabet, values to their variable domains, and
//! every accepting condition must constrain every variable.
//!
//! ```json
//! {
//!   "name": "cycle",
//!   "direction": "top_down",
//!   "determinism": "deterministic",
//!   "alphabet": ["0", "1"],
//!   "variables": [{ "id": 1, "values": ["A", "B", "C"], "init": "A" }],
//!   "transitions": [
//!     { "var": 1, "value": "A", "label": "0", "left": "B", "right": "C" }
//!   ],
//!   "accepting": [{ "1": { "value": "A", "include": true } }],
//!   "traversal": "dfs"
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use fita_core::{Alphabet, Variable, VariableId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::acceptance::{AcceptingCondition, Requirement};
use crate::automaton::{Automaton, AutomatonKind, Direction};
use crate::choice::ChoiceMode;
use crate::error::{AutomatonError, AutomatonResult};
use crate::transition::Determinism;
use crate::traversal::TraversalMode;
use crate::wildcard::{Arg, Output};

/// Root of an automaton document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomatonDocument {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub direction: Direction,
    #[serde(default)]
    pub determinism: Determinism,
    /// Runs on infinite trees (top-down only).
    #[serde(default)]
    pub infinite: bool,
    pub alphabet: Vec<String>,
    pub variables: Vec<VariableDocument>,
    #[serde(default)]
    pub transitions: Vec<TransitionDocument>,
    /// Finite accepting conditions, keyed by variable id.
    #[serde(default)]
    pub accepting: Vec<BTreeMap<u32, Requirement>>,
    /// Büchi accepting conditions, keyed by variable id.
    #[serde(default)]
    pub buchi_accepting: Vec<BTreeMap<u32, Requirement>>,
    /// Suggested traversal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traversal: Option<TraversalMode>,
    /// Suggested choice strategy for non-deterministic automata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice: Option<ChoiceMode>,
}

/// A variable with its domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableDocument {
    pub id: u32,
    pub values: Vec<String>,
    pub init: String,
}

/// A transition entry; the shape decides the direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransitionDocument {
    TopDown(TopDownEntry),
    BottomUp(BottomUpEntry),
}

/// `(value, label) -> (left, right)`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TopDownEntry {
    pub var: u32,
    pub value: Arg,
    pub label: Arg,
    pub left: Output,
    pub right: Output,
}

/// `(left, right, label) -> result`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BottomUpEntry {
    pub var: u32,
    pub left: Arg,
    pub right: Arg,
    pub label: Arg,
    pub result: Output,
}

impl AutomatonDocument {
    pub fn from_json(json: &str) -> AutomatonResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a document from a file.
    pub fn load(path: impl AsRef<Path>) -> AutomatonResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "automaton_document_load");
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn to_json(&self) -> AutomatonResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn kind(&self) -> AutomatonKind {
        AutomatonKind::new(self.direction, self.determinism, self.infinite)
    }

    /// Validate the document and build the automaton.
    pub fn into_automaton(self) -> AutomatonResult<Automaton> {
        let kind = self.kind();
        let variables = self
            .variables
            .into_iter()
            .map(|v| Variable::new(VariableId(v.id), v.init, v.values))
            .collect::<Result<Vec<_>, _>>()?;
        let ids: Vec<VariableId> = variables.iter().map(Variable::id).collect();

        let mut automaton = Automaton::new(kind, variables, Alphabet::new(self.alphabet))?;
        if let Some(name) = self.name {
            automaton = automaton.with_name(name);
        }

        for entry in self.transitions {
            match (entry, kind.direction) {
                (TransitionDocument::TopDown(e), Direction::TopDown) => automaton
                    .add_top_down_transition(VariableId(e.var), e.value, e.label, e.left, e.right)?,
                (TransitionDocument::BottomUp(e), Direction::BottomUp) => automaton
                    .add_bottom_up_transition(VariableId(e.var), e.left, e.right, e.label, e.result)?,
                (_, direction) => {
                    return Err(AutomatonError::InvalidDefinition {
                        message: format!("transition entry does not fit a {direction} automaton"),
                    })
                }
            }
        }

        for raw in self.accepting {
            automaton.add_accepting_condition(condition(raw, &ids)?)?;
        }
        for raw in self.buchi_accepting {
            automaton.add_buchi_condition(condition(raw, &ids)?)?;
        }

        debug!(
            kind = %automaton.kind().abbreviation(),
            transitions = automaton.transitions().len(),
            "automaton_document_loaded"
        );
        Ok(automaton)
    }
}

/// Convert a raw condition, requiring a requirement for every variable.
fn condition(
    raw: BTreeMap<u32, Requirement>,
    variables: &[VariableId],
) -> AutomatonResult<AcceptingCondition> {
    if let Some(missing) = variables.iter().find(|id| !raw.contains_key(&id.0)) {
        return Err(AutomatonError::InvalidDefinition {
            message: format!("variable {missing} has no accepting condition"),
        });
    }
    Ok(raw
        .into_iter()
        .fold(AcceptingCondition::new(), |condition, (id, requirement)| {
            condition.with(VariableId(id), requirement)
        }))
}
