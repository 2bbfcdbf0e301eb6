//! Transition tables with wildcard resolution.
//!
//! A table maps `(variable, key)` to one result (deterministic) or a set of
//! results (non-deterministic). Lookups take a concrete key and search the
//! stored keys in priority order:
//!
//! 1. the exact key,
//! 2. when the two child values are equal, the "same as other side" variants,
//! 3. every subset of argument positions replaced by "any value", in mask order.
//!
//! Result wildcards are resolved against the concrete key before the results
//! are returned.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use fita_core::VariableId;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{AutomatonError, AutomatonResult};
use crate::wildcard::{Arg, Output};

/// Whether a key may map to several results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Determinism {
    #[default]
    Deterministic,
    NonDeterministic,
}

impl Determinism {
    pub fn is_deterministic(&self) -> bool {
        matches!(self, Determinism::Deterministic)
    }
}

/// Arguments of a transition.
pub trait TransitionKey: Clone + Eq + Hash + fmt::Debug + fmt::Display {
    /// Number of argument positions.
    const ARITY: u32;

    /// Whether every position holds a concrete value.
    fn is_concrete(&self) -> bool;

    /// Copy of the key with the positions in `mask` replaced by [`Arg::Any`].
    fn with_any(&self, mask: u32) -> Self;

    /// "Same as other side" variants, tried only when both child values agree.
    fn same_variants(&self) -> Vec<Self> {
        Vec::new()
    }

    /// Reject illegal wildcard combinations in a stored key.
    fn check(&self) -> Result<(), String>;
}

/// Result of a transition, possibly containing result wildcards.
pub trait TransitionOutput: Clone + PartialEq + fmt::Debug + fmt::Display {
    type Key: TransitionKey;
    /// Result with every wildcard replaced by a concrete value.
    type Resolved: Clone + Ord + fmt::Debug;

    /// Reject wildcards that make no sense in this direction.
    fn check(&self) -> Result<(), String>;

    /// Resolve result wildcards against the concrete key that was looked up.
    fn resolve(&self, key: &Self::Key) -> Self::Resolved;
}

// ----------------------------------------------------------------------------
// Top-down: (value, label) -> (left, right)
// ----------------------------------------------------------------------------

/// Top-down arguments: the vertex value and its label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopDownKey {
    pub value: Arg,
    pub label: Arg,
}

impl TopDownKey {
    pub fn new(value: impl Into<Arg>, label: impl Into<Arg>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Key for a lookup; both positions are taken literally.
    pub fn concrete(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: Arg::Exact(value.into()),
            label: Arg::Exact(label.into()),
        }
    }
}

impl fmt::Display for TopDownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(value = '{}', label = '{}')", self.value, self.label)
    }
}

impl TransitionKey for TopDownKey {
    const ARITY: u32 = 2;

    fn is_concrete(&self) -> bool {
        self.value.is_exact() && self.label.is_exact()
    }

    fn with_any(&self, mask: u32) -> Self {
        let pick = |bit: u32, arg: &Arg| if mask & bit != 0 { Arg::Any } else { arg.clone() };
        Self {
            value: pick(1, &self.value),
            label: pick(2, &self.label),
        }
    }

    fn check(&self) -> Result<(), String> {
        if self.value == Arg::Same || self.label == Arg::Same {
            return Err("top-down transitions cannot use the same-value wildcard".into());
        }
        Ok(())
    }
}

/// Top-down results for the left and right child.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopDownOutput {
    pub left: Output,
    pub right: Output,
}

impl TopDownOutput {
    pub fn new(left: impl Into<Output>, right: impl Into<Output>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

impl fmt::Display for TopDownOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(left = '{}', right = '{}')", self.left, self.right)
    }
}

impl TransitionOutput for TopDownOutput {
    type Key = TopDownKey;
    type Resolved = (String, String);

    fn check(&self) -> Result<(), String> {
        for output in [&self.left, &self.right] {
            if matches!(output, Output::Left | Output::Right) {
                return Err("top-down results cannot copy a child value".into());
            }
        }
        Ok(())
    }

    fn resolve(&self, key: &TopDownKey) -> (String, String) {
        let argument = key.value.as_exact().unwrap_or_default();
        let one = |output: &Output| match output {
            Output::Value(value) => value.clone(),
            Output::Same | Output::Left | Output::Right => argument.to_string(),
        };
        (one(&self.left), one(&self.right))
    }
}

// ----------------------------------------------------------------------------
// Bottom-up: (left, right, label) -> value
// ----------------------------------------------------------------------------

/// Bottom-up arguments: the left and right child values and the label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BottomUpKey {
    pub left: Arg,
    pub right: Arg,
    pub label: Arg,
}

impl BottomUpKey {
    pub fn new(left: impl Into<Arg>, right: impl Into<Arg>, label: impl Into<Arg>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            label: label.into(),
        }
    }

    pub fn concrete(
        left: impl Into<String>,
        right: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            left: Arg::Exact(left.into()),
            right: Arg::Exact(right.into()),
            label: Arg::Exact(label.into()),
        }
    }
}

impl fmt::Display for BottomUpKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(left = '{}', right = '{}', label = '{}')",
            self.left, self.right, self.label
        )
    }
}

impl TransitionKey for BottomUpKey {
    const ARITY: u32 = 3;

    fn is_concrete(&self) -> bool {
        self.left.is_exact() && self.right.is_exact() && self.label.is_exact()
    }

    fn with_any(&self, mask: u32) -> Self {
        let pick = |bit: u32, arg: &Arg| if mask & bit != 0 { Arg::Any } else { arg.clone() };
        Self {
            left: pick(1, &self.left),
            right: pick(2, &self.right),
            label: pick(4, &self.label),
        }
    }

    fn same_variants(&self) -> Vec<Self> {
        if self.left != self.right {
            return Vec::new();
        }

        let label = self.label.clone();
        vec![
            Self::new(Arg::Any, Arg::Same, label.clone()),
            Self::new(Arg::Same, Arg::Any, label),
            Self::new(Arg::Any, Arg::Same, Arg::Any),
            Self::new(Arg::Same, Arg::Any, Arg::Any),
        ]
    }

    fn check(&self) -> Result<(), String> {
        let paired = |this: &Arg, other: &Arg| *this != Arg::Same || *other == Arg::Any;
        if !paired(&self.left, &self.right) || !paired(&self.right, &self.left) {
            return Err("the same-value wildcard must be paired with the any-value wildcard".into());
        }
        if self.label == Arg::Same {
            return Err("labels cannot use the same-value wildcard".into());
        }
        Ok(())
    }
}

impl TransitionOutput for Output {
    type Key = BottomUpKey;
    type Resolved = String;

    fn check(&self) -> Result<(), String> {
        if *self == Output::Same {
            return Err("bottom-up results copy the left or right value explicitly".into());
        }
        Ok(())
    }

    fn resolve(&self, key: &BottomUpKey) -> String {
        let left = key.left.as_exact().unwrap_or_default();
        let right = key.right.as_exact().unwrap_or_default();
        match self {
            Output::Value(value) => value.clone(),
            Output::Left | Output::Same => left.to_string(),
            Output::Right => right.to_string(),
        }
    }
}

// ----------------------------------------------------------------------------
// Table
// ----------------------------------------------------------------------------

/// Transition function for all variables of an automaton.
#[derive(Debug, Clone)]
pub struct TransitionTable<O: TransitionOutput> {
    determinism: Determinism,
    entries: HashMap<(VariableId, O::Key), Vec<O>>,
}

pub type TopDownTransitions = TransitionTable<TopDownOutput>;
pub type BottomUpTransitions = TransitionTable<Output>;

impl<O: TransitionOutput> TransitionTable<O> {
    pub fn new(determinism: Determinism) -> Self {
        Self {
            determinism,
            entries: HashMap::new(),
        }
    }

    pub fn determinism(&self) -> Determinism {
        self.determinism
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert an entry.
    ///
    /// In a deterministic table an identical `(key, result)` pair is a no-op,
    /// while a different result for a stored key is rejected.
    pub fn add(&mut self, variable: VariableId, key: O::Key, output: O) -> AutomatonResult<()> {
        if let Err(message) = key.check().and_then(|_| output.check()) {
            return Err(AutomatonError::IllegalTransition {
                key: key.to_string(),
                message,
            });
        }

        let key_text = key.to_string();
        let results = self.entries.entry((variable, key)).or_default();

        match self.determinism {
            Determinism::Deterministic => match results.first() {
                Some(existing) if *existing != output => {
                    return Err(AutomatonError::DuplicatedTransition {
                        variable,
                        key: key_text,
                    })
                }
                Some(_) => {}
                None => results.push(output),
            },
            Determinism::NonDeterministic => {
                if !results.contains(&output) {
                    results.push(output);
                }
            }
        }

        Ok(())
    }

    /// Whether any stored key matches the concrete key.
    pub fn contains_entry(&self, variable: VariableId, key: &O::Key) -> bool {
        key.is_concrete()
            && Self::search_order(key).any(|k| self.entries.contains_key(&(variable, k)))
    }

    /// Resolve a concrete key.
    ///
    /// Deterministic tables return the first match in priority order;
    /// non-deterministic tables return every distinct result of every match.
    /// The returned vector is never empty.
    pub fn lookup(&self, variable: VariableId, key: &O::Key) -> AutomatonResult<Vec<O::Resolved>> {
        let no_such = || AutomatonError::NoSuchTransition {
            variable,
            key: key.to_string(),
        };

        if !key.is_concrete() {
            return Err(no_such());
        }

        let mut found: Vec<O::Resolved> = Vec::new();

        for candidate in Self::search_order(key) {
            let Some(results) = self.entries.get(&(variable, candidate.clone())) else {
                continue;
            };
            trace!(variable = variable.0, matched = %candidate, "transition_matched");

            for output in results {
                let resolved = output.resolve(key);
                if !found.contains(&resolved) {
                    found.push(resolved);
                }
            }

            if self.determinism.is_deterministic() && !found.is_empty() {
                found.truncate(1);
                break;
            }
        }

        if found.is_empty() {
            Err(no_such())
        } else {
            Ok(found)
        }
    }

    fn search_order(key: &O::Key) -> impl Iterator<Item = O::Key> + '_ {
        std::iter::once(key.clone())
            .chain(key.same_variants())
            .chain((1..(1u32 << O::Key::ARITY)).map(move |mask| key.with_any(mask)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V: VariableId = VariableId(1);

    fn top_down(determinism: Determinism) -> TopDownTransitions {
        TransitionTable::new(determinism)
    }

    fn bottom_up(determinism: Determinism) -> BottomUpTransitions {
        TransitionTable::new(determinism)
    }

    #[test]
    fn test_exact_match_wins_over_wildcards() {
        let mut table = top_down(Determinism::Deterministic);
        table
            .add(V, TopDownKey::new("*", "0"), TopDownOutput::new("A", "A"))
            .unwrap();
        table
            .add(V, TopDownKey::new("B", "0"), TopDownOutput::new("C", "C"))
            .unwrap();
        table
            .add(V, TopDownKey::new("*", "*"), TopDownOutput::new("B", "B"))
            .unwrap();

        let exact = table.lookup(V, &TopDownKey::concrete("B", "0")).unwrap();
        assert_eq!(exact, vec![("C".to_string(), "C".to_string())]);

        let value_wildcard = table.lookup(V, &TopDownKey::concrete("A", "0")).unwrap();
        assert_eq!(value_wildcard, vec![("A".to_string(), "A".to_string())]);

        let both = table.lookup(V, &TopDownKey::concrete("A", "1")).unwrap();
        assert_eq!(both, vec![("B".to_string(), "B".to_string())]);
    }

    #[test]
    fn test_top_down_same_result_copies_argument() {
        let mut table = top_down(Determinism::Deterministic);
        table
            .add(V, TopDownKey::new("*", "1"), TopDownOutput::new("=", "A"))
            .unwrap();

        let result = table.lookup(V, &TopDownKey::concrete("C", "1")).unwrap();
        assert_eq!(result, vec![("C".to_string(), "A".to_string())]);
    }

    #[test]
    fn test_missing_transition() {
        let mut table = top_down(Determinism::Deterministic);
        table
            .add(V, TopDownKey::new("A", "0"), TopDownOutput::new("A", "A"))
            .unwrap();

        let err = table.lookup(V, &TopDownKey::concrete("A", "1")).unwrap_err();
        assert!(matches!(err, AutomatonError::NoSuchTransition { .. }));

        let other_variable = table.lookup(VariableId(2), &TopDownKey::concrete("A", "0"));
        assert!(other_variable.is_err());
    }

    #[test]
    fn test_duplicated_transition() {
        let mut table = top_down(Determinism::Deterministic);
        let key = TopDownKey::new("A", "0");
        table.add(V, key.clone(), TopDownOutput::new("B", "C")).unwrap();

        // Re-adding the identical pair is a no-op.
        table.add(V, key.clone(), TopDownOutput::new("B", "C")).unwrap();
        assert_eq!(table.len(), 1);

        let err = table.add(V, key, TopDownOutput::new("C", "B")).unwrap_err();
        assert!(matches!(err, AutomatonError::DuplicatedTransition { .. }));
    }

    #[test]
    fn test_illegal_wildcards() {
        let mut table = bottom_up(Determinism::Deterministic);

        let err = table
            .add(V, BottomUpKey::new("=", "A", "0"), Output::value("A"))
            .unwrap_err();
        assert!(matches!(err, AutomatonError::IllegalTransition { .. }));

        let err = table
            .add(V, BottomUpKey::new("=", "=", "0"), Output::value("A"))
            .unwrap_err();
        assert!(matches!(err, AutomatonError::IllegalTransition { .. }));

        assert!(table
            .add(V, BottomUpKey::new("*", "=", "0"), Output::value("A"))
            .is_ok());

        let mut top = top_down(Determinism::Deterministic);
        let err = top
            .add(V, TopDownKey::new("A", "0"), TopDownOutput::new("<", "A"))
            .unwrap_err();
        assert!(matches!(err, AutomatonError::IllegalTransition { .. }));
    }

    #[test]
    fn test_same_wildcard_requires_equal_children() {
        let mut table = bottom_up(Determinism::Deterministic);
        table
            .add(V, BottomUpKey::new("=", "*", "0"), Output::value("T"))
            .unwrap();
        table
            .add(V, BottomUpKey::new("*", "*", "*"), Output::value("F"))
            .unwrap();

        let equal = table.lookup(V, &BottomUpKey::concrete("A", "A", "0")).unwrap();
        assert_eq!(equal, vec!["T".to_string()]);

        let unequal = table.lookup(V, &BottomUpKey::concrete("A", "B", "0")).unwrap();
        assert_eq!(unequal, vec!["F".to_string()]);
    }

    #[test]
    fn test_same_wildcard_never_matches_unequal_children() {
        let mut table = bottom_up(Determinism::Deterministic);
        table
            .add(V, BottomUpKey::new("*", "=", "*"), Output::value("T"))
            .unwrap();

        assert!(table.contains_entry(V, &BottomUpKey::concrete("B", "B", "1")));
        assert!(!table.contains_entry(V, &BottomUpKey::concrete("A", "B", "1")));
        let err = table
            .lookup(V, &BottomUpKey::concrete("A", "B", "1"))
            .unwrap_err();
        assert!(matches!(err, AutomatonError::NoSuchTransition { .. }));
    }

    #[test]
    fn test_bottom_up_copy_results() {
        let mut table = bottom_up(Determinism::Deterministic);
        table
            .add(V, BottomUpKey::new("*", "*", "L"), Output::Left)
            .unwrap();
        table
            .add(V, BottomUpKey::new("*", "*", "R"), Output::Right)
            .unwrap();

        let left = table.lookup(V, &BottomUpKey::concrete("A", "B", "L")).unwrap();
        let right = table.lookup(V, &BottomUpKey::concrete("A", "B", "R")).unwrap();
        assert_eq!(left, vec!["A".to_string()]);
        assert_eq!(right, vec!["B".to_string()]);
    }

    #[test]
    fn test_non_deterministic_collects_all_matches() {
        let mut table = bottom_up(Determinism::NonDeterministic);
        let key = BottomUpKey::new("A", "B", "0");
        table.add(V, key.clone(), Output::value("X")).unwrap();
        table.add(V, key.clone(), Output::value("Y")).unwrap();
        table.add(V, key, Output::value("X")).unwrap();
        table
            .add(V, BottomUpKey::new("*", "B", "0"), Output::value("Z"))
            .unwrap();
        table
            .add(V, BottomUpKey::new("*", "*", "*"), Output::Left)
            .unwrap();

        let all = table.lookup(V, &BottomUpKey::concrete("A", "B", "0")).unwrap();
        assert_eq!(all, vec!["X", "Y", "Z", "A"]);
    }

    #[test]
    fn test_lookup_rejects_wildcard_keys() {
        let mut table = top_down(Determinism::Deterministic);
        table
            .add(V, TopDownKey::new("*", "*"), TopDownOutput::new("A", "A"))
            .unwrap();
        assert!(table.lookup(V, &TopDownKey::new("*", "0")).is_err());
    }
}
