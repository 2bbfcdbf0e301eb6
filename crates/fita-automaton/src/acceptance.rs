//! Acceptance conditions.
//!
//! A condition maps variables to value requirements. A finite run is
//! accepted when the checked states satisfy at least one condition.
//!
//! Büchi acceptance asks which values recur infinitely often along the
//! branches through a back-reference. Only a finite prefix is ever
//! materialized, so the check is an approximation over the states observed
//! at each back-reference so far: the recurring part of a history is the
//! cycle starting at its first repeated state, or the whole history while
//! nothing has repeated yet.

use std::collections::BTreeMap;

use fita_core::{State, VariableId, VertexId};
use serde::{Deserialize, Serialize};

use crate::wildcard::Arg;

/// Requirement on the value of one variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Expected value, or [`Arg::Any`] for any defined value.
    pub value: Arg,
    /// `true` if the value must be present, `false` if it must be absent.
    pub include: bool,
}

impl Requirement {
    pub fn include(value: impl Into<Arg>) -> Self {
        Self {
            value: value.into(),
            include: true,
        }
    }

    pub fn exclude(value: impl Into<Arg>) -> Self {
        Self {
            value: value.into(),
            include: false,
        }
    }

    fn matches_value(&self, actual: Option<&str>) -> bool {
        match (&self.value, actual) {
            (Arg::Exact(expected), Some(actual)) => expected == actual,
            (Arg::Any, Some(_)) => true,
            _ => false,
        }
    }

    /// Whether a single state fulfils the requirement.
    pub fn is_satisfied_by(&self, actual: Option<&str>) -> bool {
        self.matches_value(actual) == self.include
    }
}

/// One accepting condition: a requirement per variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AcceptingCondition {
    requirements: BTreeMap<VariableId, Requirement>,
}

impl AcceptingCondition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    pub fn with(mut self, variable: VariableId, requirement: Requirement) -> Self {
        self.insert(variable, requirement);
        self
    }

    pub fn insert(&mut self, variable: VariableId, requirement: Requirement) {
        self.requirements.insert(variable, requirement);
    }

    pub fn requirements(&self) -> impl Iterator<Item = (VariableId, &Requirement)> {
        self.requirements.iter().map(|(id, req)| (*id, req))
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Finite acceptance of one state.
    pub fn is_satisfied_by(&self, state: &State) -> bool {
        self.requirements.iter().all(|(variable, requirement)| {
            requirement.is_satisfied_by(state.get(variable).map(String::as_str))
        })
    }

    /// Büchi acceptance of a set of recurring states: every included value
    /// recurs and no excluded value does.
    pub fn holds_recurring(&self, recurring: &[State]) -> bool {
        self.requirements.iter().all(|(variable, requirement)| {
            let recurs = recurring
                .iter()
                .any(|state| requirement.matches_value(state.get(variable).map(String::as_str)));
            recurs == requirement.include
        })
    }
}

/// Disjunction of accepting conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AcceptanceConditions {
    conditions: Vec<AcceptingCondition>,
}

impl AcceptanceConditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, condition: AcceptingCondition) {
        self.conditions.push(condition);
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AcceptingCondition> {
        self.conditions.iter()
    }

    /// Whether some condition accepts the state.
    pub fn accepts(&self, state: &State) -> bool {
        self.conditions.iter().any(|c| c.is_satisfied_by(state))
    }

    /// Whether some condition holds for the recurring states.
    pub fn accepts_recurring(&self, recurring: &[State]) -> bool {
        self.conditions.iter().any(|c| c.holds_recurring(recurring))
    }
}

impl FromIterator<AcceptingCondition> for AcceptanceConditions {
    fn from_iter<T: IntoIterator<Item = AcceptingCondition>>(iter: T) -> Self {
        Self {
            conditions: iter.into_iter().collect(),
        }
    }
}

/// States observed at every back-reference, in processing order.
#[derive(Debug, Clone, Default)]
pub struct BuchiRecord {
    histories: BTreeMap<VertexId, Vec<State>>,
}

impl BuchiRecord {
    pub fn observe(&mut self, back_reference: VertexId, state: State) {
        self.histories.entry(back_reference).or_default().push(state);
    }

    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }

    pub fn clear(&mut self) {
        self.histories.clear();
    }

    pub fn history(&self, back_reference: VertexId) -> &[State] {
        self.histories
            .get(&back_reference)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Recurring part of every history.
    pub fn recurring(&self) -> impl Iterator<Item = (VertexId, &[State])> {
        self.histories
            .iter()
            .map(|(id, history)| (*id, recurring_part(history)))
    }

    /// Whether every back-reference satisfies some condition.
    pub fn is_accepted_by(&self, conditions: &AcceptanceConditions) -> bool {
        self.recurring()
            .all(|(_, recurring)| conditions.accepts_recurring(recurring))
    }
}

/// Cycle starting at the first repeated state, or the whole history.
fn recurring_part(history: &[State]) -> &[State] {
    for (later, state) in history.iter().enumerate() {
        if let Some(first) = history[..later].iter().position(|s| s == state) {
            return &history[first..later];
        }
    }
    history
}

#[cfg(test)]
mod tests {
    use super::*;

    const X: VariableId = VariableId(1);
    const Y: VariableId = VariableId(2);

    fn state(x: &str, y: &str) -> State {
        State::from([(X, x.to_string()), (Y, y.to_string())])
    }

    #[test]
    fn test_finite_condition() {
        let condition = AcceptingCondition::new()
            .with(X, Requirement::include("A"))
            .with(Y, Requirement::exclude("1"));

        assert!(condition.is_satisfied_by(&state("A", "0")));
        assert!(!condition.is_satisfied_by(&state("A", "1")));
        assert!(!condition.is_satisfied_by(&state("B", "0")));
    }

    #[test]
    fn test_any_value_requirement() {
        let condition = AcceptingCondition::new().with(X, Requirement::include("*"));
        assert!(condition.is_satisfied_by(&state("C", "0")));
        assert!(!condition.is_satisfied_by(&State::new()));
    }

    #[test]
    fn test_conditions_are_a_disjunction() {
        let conditions: AcceptanceConditions = [
            AcceptingCondition::new().with(X, Requirement::include("A")),
            AcceptingCondition::new().with(X, Requirement::include("B")),
        ]
        .into_iter()
        .collect();

        assert!(conditions.accepts(&state("B", "0")));
        assert!(!conditions.accepts(&state("C", "0")));
    }

    #[test]
    fn test_recurring_part() {
        let a = state("A", "0");
        let b = state("B", "0");
        let c = state("C", "0");

        let history = vec![a.clone(), b.clone(), c.clone(), b.clone(), c.clone()];
        assert_eq!(recurring_part(&history), &[b.clone(), c.clone()]);

        let no_repeat = vec![a.clone(), b.clone()];
        assert_eq!(recurring_part(&no_repeat), &[a, b]);
    }

    #[test]
    fn test_buchi_record() {
        let mut record = BuchiRecord::default();
        let rec = VertexId(4);
        for x in ["A", "B", "C", "B", "C"] {
            record.observe(rec, state(x, "0"));
        }

        // A is visited once and never again.
        let a_recurs = AcceptanceConditions::from_iter([
            AcceptingCondition::new().with(X, Requirement::include("A")),
        ]);
        let c_recurs = AcceptanceConditions::from_iter([
            AcceptingCondition::new().with(X, Requirement::include("C")),
        ]);
        let a_never = AcceptanceConditions::from_iter([
            AcceptingCondition::new().with(X, Requirement::exclude("A")),
        ]);

        assert!(!record.is_accepted_by(&a_recurs));
        assert!(record.is_accepted_by(&c_recurs));
        assert!(record.is_accepted_by(&a_never));
        assert_eq!(record.history(rec).len(), 5);
        assert!(record.history(VertexId(0)).is_empty());
    }
}
