//! Automaton definitions.
//!
//! An [`Automaton`] is the static part of a run: alphabet, variables, the
//! transition table and acceptance conditions. The direction and the
//! determinism are two independent properties of one type; the
//! [`Engine`](crate::Engine) executes any combination of them.

use std::collections::HashSet;
use std::fmt;

use fita_core::{Alphabet, Variable, VariableId};
use serde::{Deserialize, Serialize};

use crate::acceptance::{AcceptanceConditions, AcceptingCondition};
use crate::error::{AutomatonError, AutomatonResult};
use crate::transition::{
    BottomUpKey, BottomUpTransitions, Determinism, TopDownKey, TopDownOutput, TopDownTransitions,
};
use crate::wildcard::{Arg, Output};

/// Direction in which states flow through the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Root to leaves.
    TopDown,
    /// Leaves to root.
    BottomUp,
}

impl Direction {
    pub fn name(&self) -> &'static str {
        match self {
            Direction::TopDown => "top-down",
            Direction::BottomUp => "bottom-up",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Direction, determinism and finiteness of an automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AutomatonKind {
    pub direction: Direction,
    pub determinism: Determinism,
    /// Whether the automaton runs on infinite trees. Top-down only.
    pub infinite: bool,
}

impl AutomatonKind {
    pub fn new(direction: Direction, determinism: Determinism, infinite: bool) -> Self {
        Self {
            direction,
            determinism,
            infinite,
        }
    }

    /// Human readable kind, e.g. "Top-down deterministic finite tree automaton".
    pub fn type_name(&self) -> String {
        let direction = match self.direction {
            Direction::TopDown => "Top-down",
            Direction::BottomUp => "Bottom-up",
        };
        let determinism = match self.determinism {
            Determinism::Deterministic => "deterministic",
            Determinism::NonDeterministic => "non-deterministic",
        };
        let finiteness = if self.infinite { "infinite" } else { "finite" };
        format!("{direction} {determinism} {finiteness} tree automaton")
    }

    /// Short form, e.g. "TopDownDFTA".
    pub fn abbreviation(&self) -> String {
        let direction = match self.direction {
            Direction::TopDown => "TopDown",
            Direction::BottomUp => "BottomUp",
        };
        let determinism = if self.determinism.is_deterministic() { 'D' } else { 'N' };
        let finiteness = if self.infinite { 'I' } else { 'F' };
        format!("{direction}{determinism}{finiteness}TA")
    }
}

/// Transition table of either direction.
#[derive(Debug, Clone)]
pub enum Transitions {
    TopDown(TopDownTransitions),
    BottomUp(BottomUpTransitions),
}

impl Transitions {
    pub fn len(&self) -> usize {
        match self {
            Transitions::TopDown(table) => table.len(),
            Transitions::BottomUp(table) => table.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A tree automaton definition.
#[derive(Debug, Clone)]
pub struct Automaton {
    name: Option<String>,
    kind: AutomatonKind,
    alphabet: Alphabet,
    variables: Vec<Variable>,
    transitions: Transitions,
    accepting: AcceptanceConditions,
    buchi_accepting: AcceptanceConditions,
}

impl Automaton {
    /// Create an automaton without transitions.
    ///
    /// Fails for infinite bottom-up automata, for an empty variable list and
    /// for duplicated variable ids.
    pub fn new(
        kind: AutomatonKind,
        variables: impl IntoIterator<Item = Variable>,
        alphabet: Alphabet,
    ) -> AutomatonResult<Self> {
        if kind.infinite && kind.direction == Direction::BottomUp {
            return Err(AutomatonError::InvalidDefinition {
                message: "bottom-up automata run on finite trees only".into(),
            });
        }

        let variables: Vec<Variable> = variables.into_iter().collect();
        if variables.is_empty() {
            return Err(AutomatonError::InvalidDefinition {
                message: "automaton has no variables".into(),
            });
        }
        let mut ids = HashSet::new();
        if let Some(duplicate) = variables.iter().find(|v| !ids.insert(v.id())) {
            return Err(AutomatonError::InvalidDefinition {
                message: format!("variable {} is defined twice", duplicate.id()),
            });
        }

        let transitions = match kind.direction {
            Direction::TopDown => Transitions::TopDown(TopDownTransitions::new(kind.determinism)),
            Direction::BottomUp => {
                Transitions::BottomUp(BottomUpTransitions::new(kind.determinism))
            }
        };

        Ok(Self {
            name: None,
            kind,
            alphabet,
            variables,
            transitions,
            accepting: AcceptanceConditions::new(),
            buchi_accepting: AcceptanceConditions::new(),
        })
    }

    /// Top-down automaton on finite trees.
    pub fn top_down(
        determinism: Determinism,
        variables: impl IntoIterator<Item = Variable>,
        alphabet: Alphabet,
    ) -> AutomatonResult<Self> {
        Self::new(
            AutomatonKind::new(Direction::TopDown, determinism, false),
            variables,
            alphabet,
        )
    }

    /// Top-down automaton on infinite trees.
    pub fn top_down_infinite(
        determinism: Determinism,
        variables: impl IntoIterator<Item = Variable>,
        alphabet: Alphabet,
    ) -> AutomatonResult<Self> {
        Self::new(
            AutomatonKind::new(Direction::TopDown, determinism, true),
            variables,
            alphabet,
        )
    }

    /// Bottom-up automaton.
    pub fn bottom_up(
        determinism: Determinism,
        variables: impl IntoIterator<Item = Variable>,
        alphabet: Alphabet,
    ) -> AutomatonResult<Self> {
        Self::new(
            AutomatonKind::new(Direction::BottomUp, determinism, false),
            variables,
            alphabet,
        )
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> AutomatonKind {
        self.kind
    }

    pub fn direction(&self) -> Direction {
        self.kind.direction
    }

    pub fn determinism(&self) -> Determinism {
        self.kind.determinism
    }

    pub fn is_infinite(&self) -> bool {
        self.kind.infinite
    }

    pub fn type_name(&self) -> String {
        self.kind.type_name()
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn is_in_alphabet(&self, label: &str) -> bool {
        self.alphabet.contains(label)
    }

    /// Variables in declaration order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, id: VariableId) -> Option<&Variable> {
        self.variables.iter().find(|v| v.id() == id)
    }

    pub fn transitions(&self) -> &Transitions {
        &self.transitions
    }

    pub fn accepting_conditions(&self) -> &AcceptanceConditions {
        &self.accepting
    }

    pub fn buchi_accepting_conditions(&self) -> &AcceptanceConditions {
        &self.buchi_accepting
    }

    /// Add `(value, label) -> (left, right)` for a top-down automaton.
    pub fn add_top_down_transition(
        &mut self,
        variable: VariableId,
        value: impl Into<Arg>,
        label: impl Into<Arg>,
        left: impl Into<Output>,
        right: impl Into<Output>,
    ) -> AutomatonResult<()> {
        let key = TopDownKey::new(value, label);
        let output = TopDownOutput::new(left, right);

        let var = self.checked_variable(variable)?;
        check_arg(var, &key.value)?;
        self.check_label(&key.label)?;
        check_output(var, &output.left)?;
        check_output(var, &output.right)?;

        match &mut self.transitions {
            Transitions::TopDown(table) => table.add(variable, key, output),
            Transitions::BottomUp(_) => Err(wrong_direction(Direction::TopDown)),
        }
    }

    /// Add `(left, right, label) -> result` for a bottom-up automaton.
    pub fn add_bottom_up_transition(
        &mut self,
        variable: VariableId,
        left: impl Into<Arg>,
        right: impl Into<Arg>,
        label: impl Into<Arg>,
        result: impl Into<Output>,
    ) -> AutomatonResult<()> {
        let key = BottomUpKey::new(left, right, label);
        let result = result.into();

        let var = self.checked_variable(variable)?;
        check_arg(var, &key.left)?;
        check_arg(var, &key.right)?;
        self.check_label(&key.label)?;
        check_output(var, &result)?;

        match &mut self.transitions {
            Transitions::BottomUp(table) => table.add(variable, key, result),
            Transitions::TopDown(_) => Err(wrong_direction(Direction::BottomUp)),
        }
    }

    /// Register an accepting condition for finite runs.
    pub fn add_accepting_condition(&mut self, condition: AcceptingCondition) -> AutomatonResult<()> {
        self.check_condition(&condition)?;
        self.accepting.add(condition);
        Ok(())
    }

    /// Register a Büchi accepting condition. Infinite automata only.
    pub fn add_buchi_condition(&mut self, condition: AcceptingCondition) -> AutomatonResult<()> {
        if !self.is_infinite() {
            return Err(AutomatonError::InvalidDefinition {
                message: "Büchi conditions need an infinite automaton".into(),
            });
        }
        self.check_condition(&condition)?;
        self.buchi_accepting.add(condition);
        Ok(())
    }

    /// Resolve a top-down step for concrete arguments.
    pub fn resolve_top_down(
        &self,
        variable: VariableId,
        value: &str,
        label: &str,
    ) -> AutomatonResult<Vec<(String, String)>> {
        match &self.transitions {
            Transitions::TopDown(table) => {
                table.lookup(variable, &TopDownKey::concrete(value, label))
            }
            Transitions::BottomUp(_) => Err(wrong_direction(Direction::TopDown)),
        }
    }

    /// Resolve a bottom-up step for concrete arguments.
    pub fn resolve_bottom_up(
        &self,
        variable: VariableId,
        left: &str,
        right: &str,
        label: &str,
    ) -> AutomatonResult<Vec<String>> {
        match &self.transitions {
            Transitions::BottomUp(table) => {
                table.lookup(variable, &BottomUpKey::concrete(left, right, label))
            }
            Transitions::TopDown(_) => Err(wrong_direction(Direction::BottomUp)),
        }
    }

    fn checked_variable(&self, id: VariableId) -> AutomatonResult<&Variable> {
        self.variable(id)
            .ok_or_else(|| AutomatonError::InvalidDefinition {
                message: format!("unknown variable {id}"),
            })
    }

    fn check_label(&self, label: &Arg) -> AutomatonResult<()> {
        match label.as_exact() {
            Some(label) if !self.is_in_alphabet(label) => Err(AutomatonError::IllegalLabel {
                label: label.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn check_condition(&self, condition: &AcceptingCondition) -> AutomatonResult<()> {
        for (id, requirement) in condition.requirements() {
            let var = self.checked_variable(id)?;
            if requirement.value == Arg::Same {
                return Err(AutomatonError::InvalidDefinition {
                    message: format!("accepting condition for {id} uses the same-value wildcard"),
                });
            }
            check_arg(var, &requirement.value)?;
        }
        Ok(())
    }
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.kind.abbreviation())?;
        writeln!(f, "  alphabet = {:?}", self.alphabet.iter().collect::<Vec<_>>())?;
        writeln!(f, "  variables = [")?;
        for variable in &self.variables {
            writeln!(f, "    {variable}")?;
        }
        writeln!(f, "  ]")?;
        write!(f, "  transitions = {} entries", self.transitions.len())
    }
}

fn check_arg(variable: &Variable, arg: &Arg) -> AutomatonResult<()> {
    match arg.as_exact() {
        Some(value) if !variable.contains(value) => Err(AutomatonError::IllegalVariableValue {
            variable: variable.id(),
            value: value.to_string(),
        }),
        _ => Ok(()),
    }
}

fn check_output(variable: &Variable, output: &Output) -> AutomatonResult<()> {
    match output.as_value() {
        Some(value) if !variable.contains(value) => Err(AutomatonError::IllegalVariableValue {
            variable: variable.id(),
            value: value.to_string(),
        }),
        _ => Ok(()),
    }
}

fn wrong_direction(expected: Direction) -> AutomatonError {
    AutomatonError::InvalidDefinition {
        message: format!("operation needs a {expected} automaton"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acceptance::Requirement;

    fn variables() -> Vec<Variable> {
        vec![Variable::new(VariableId(1), "A", ["A", "B", "C"]).unwrap()]
    }

    fn alphabet() -> Alphabet {
        Alphabet::new(["0", "1"])
    }

    #[test]
    fn test_type_names() {
        let automaton = Automaton::top_down(Determinism::Deterministic, variables(), alphabet()).unwrap();
        assert_eq!(automaton.type_name(), "Top-down deterministic finite tree automaton");

        let automaton =
            Automaton::top_down_infinite(Determinism::NonDeterministic, variables(), alphabet())
                .unwrap();
        assert_eq!(
            automaton.type_name(),
            "Top-down non-deterministic infinite tree automaton"
        );
        assert_eq!(automaton.kind().abbreviation(), "TopDownNITA");
    }

    #[test]
    fn test_infinite_bottom_up_is_invalid() {
        let kind = AutomatonKind::new(Direction::BottomUp, Determinism::Deterministic, true);
        let err = Automaton::new(kind, variables(), alphabet()).unwrap_err();
        assert!(matches!(err, AutomatonError::InvalidDefinition { .. }));
    }

    #[test]
    fn test_duplicated_variable_ids() {
        let mut vars = variables();
        vars.extend(variables());
        let err = Automaton::top_down(Determinism::Deterministic, vars, alphabet()).unwrap_err();
        assert!(matches!(err, AutomatonError::InvalidDefinition { .. }));
    }

    #[test]
    fn test_transition_validation() {
        let mut automaton =
            Automaton::top_down(Determinism::Deterministic, variables(), alphabet()).unwrap();
        let var = VariableId(1);

        automaton.add_top_down_transition(var, "A", "0", "B", "C").unwrap();
        automaton.add_top_down_transition(var, "*", "1", "=", "A").unwrap();

        let err = automaton
            .add_top_down_transition(var, "A", "2", "B", "C")
            .unwrap_err();
        assert!(matches!(err, AutomatonError::IllegalLabel { .. }));

        let err = automaton
            .add_top_down_transition(var, "D", "0", "B", "C")
            .unwrap_err();
        assert!(matches!(err, AutomatonError::IllegalVariableValue { .. }));

        let err = automaton
            .add_top_down_transition(var, "B", "0", "B", "E")
            .unwrap_err();
        assert!(matches!(err, AutomatonError::IllegalVariableValue { .. }));

        let err = automaton
            .add_bottom_up_transition(var, "A", "A", "0", "A")
            .unwrap_err();
        assert!(matches!(err, AutomatonError::InvalidDefinition { .. }));

        assert_eq!(automaton.transitions().len(), 2);
        assert_eq!(
            automaton.resolve_top_down(var, "C", "1").unwrap(),
            vec![("C".to_string(), "A".to_string())]
        );
    }

    #[test]
    fn test_conditions_are_validated() {
        let mut automaton =
            Automaton::top_down(Determinism::Deterministic, variables(), alphabet()).unwrap();

        let good = AcceptingCondition::new().with(VariableId(1), Requirement::include("A"));
        automaton.add_accepting_condition(good.clone()).unwrap();

        let bad = AcceptingCondition::new().with(VariableId(1), Requirement::include("Z"));
        assert!(automaton.add_accepting_condition(bad).is_err());

        let unknown = AcceptingCondition::new().with(VariableId(9), Requirement::include("A"));
        assert!(automaton.add_accepting_condition(unknown).is_err());

        // Finite automata carry no Büchi conditions.
        assert!(automaton.add_buchi_condition(good).is_err());
        assert_eq!(automaton.accepting_conditions().len(), 1);
    }

    #[test]
    fn test_alphabet_membership() {
        let automaton =
            Automaton::bottom_up(Determinism::Deterministic, variables(), alphabet()).unwrap();
        assert!(automaton.is_in_alphabet("1"));
        assert!(!automaton.is_in_alphabet("x"));
    }
}
