//! Variables and the label alphabet.
//!
//! A [`Variable`] is a named finite value domain with a designated initial
//! value. A vertex state assigns one value per variable.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TreeError, TreeResult};

/// Identifier of a variable within an automaton.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VariableId(pub u32);

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Assignment of values to variables carried by a vertex.
///
/// Variables without an entry are undefined.
pub type State = BTreeMap<VariableId, String>;

/// A finite value domain with an initial value. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    id: VariableId,
    values: Vec<String>,
    init: String,
}

impl Variable {
    /// Create a variable, checking that the domain is non-empty and contains
    /// the initial value. Duplicate values are dropped, keeping first occurrence.
    pub fn new<I, S>(id: VariableId, init: impl Into<String>, values: I) -> TreeResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let values: Vec<String> = values
            .into_iter()
            .map(Into::into)
            .filter(|v| seen.insert(v.clone()))
            .collect();

        if values.is_empty() {
            return Err(TreeError::EmptyDomain { variable: id });
        }

        let init = init.into();
        if !values.contains(&init) {
            return Err(TreeError::IllegalInitialValue {
                variable: id,
                value: init,
            });
        }

        Ok(Self { id, values, init })
    }

    pub fn id(&self) -> VariableId {
        self.id
    }

    /// Legal values in declaration order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn init_value(&self) -> &str {
        &self.init
    }

    /// Check whether `value` belongs to the domain.
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{{}}} init '{}'", self.id, self.values.join(", "), self.init)
    }
}

/// Build the state in which every variable holds its initial value.
pub fn initial_state<'a>(variables: impl IntoIterator<Item = &'a Variable>) -> State {
    variables
        .into_iter()
        .map(|v| (v.id(), v.init_value().to_string()))
        .collect()
}

/// Finite set of vertex labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alphabet(BTreeSet<String>);

impl Alphabet {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(labels.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains(label)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Alphabet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}
