//! Wildcard tokens used in transition keys and results.
//!
//! | token | argument side                   | result side             |
//! |-------|---------------------------------|-------------------------|
//! | `*`   | any value                       | -                       |
//! | `=`   | same value as the other side    | same as the argument    |
//! | `<`   | -                               | copy the left value     |
//! | `>`   | -                               | copy the right value    |

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const EVERY_VALUE: &str = "*";
pub const SAME_VALUE: &str = "=";
pub const LEFT_VALUE: &str = "<";
pub const RIGHT_VALUE: &str = ">";

/// One argument position of a transition key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Arg {
    /// A concrete value or label.
    Exact(String),
    /// Matches any value.
    Any,
    /// Matches the value on the other side; bottom-up only, paired with [`Arg::Any`].
    Same,
}

impl Arg {
    pub fn exact(value: impl Into<String>) -> Self {
        Arg::Exact(value.into())
    }

    pub fn parse(token: &str) -> Self {
        match token {
            EVERY_VALUE => Arg::Any,
            SAME_VALUE => Arg::Same,
            other => Arg::Exact(other.to_string()),
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Arg::Exact(_))
    }

    pub fn as_exact(&self) -> Option<&str> {
        match self {
            Arg::Exact(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Exact(value) => write!(f, "{value}"),
            Arg::Any => write!(f, "{EVERY_VALUE}"),
            Arg::Same => write!(f, "{SAME_VALUE}"),
        }
    }
}

impl From<&str> for Arg {
    fn from(token: &str) -> Self {
        Arg::parse(token)
    }
}

/// One result position of a transition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Output {
    Value(String),
    /// Copy the left child value (bottom-up).
    Left,
    /// Copy the right child value (bottom-up).
    Right,
    /// Same as the argument value (top-down).
    Same,
}

impl Output {
    pub fn value(value: impl Into<String>) -> Self {
        Output::Value(value.into())
    }

    pub fn parse(token: &str) -> Self {
        match token {
            LEFT_VALUE => Output::Left,
            RIGHT_VALUE => Output::Right,
            SAME_VALUE => Output::Same,
            other => Output::Value(other.to_string()),
        }
    }

    pub fn as_value(&self) -> Option<&str> {
        match self {
            Output::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Value(value) => write!(f, "{value}"),
            Output::Left => write!(f, "{LEFT_VALUE}"),
            Output::Right => write!(f, "{RIGHT_VALUE}"),
            Output::Same => write!(f, "{SAME_VALUE}"),
        }
    }
}

impl From<&str> for Output {
    fn from(token: &str) -> Self {
        Output::parse(token)
    }
}

// Documents spell wildcards as plain strings.

impl Serialize for Arg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Arg {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(Arg::parse(&token))
    }
}

impl Serialize for Output {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Output {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(Output::parse(&token))
    }
}
