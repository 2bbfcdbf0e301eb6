//! Strategies resolving non-determinism.
//!
//! When a non-deterministic table returns several candidates, a
//! [`ChoiceStrategy`] picks exactly one of them.

use std::cmp::Ordering;
use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Available choice strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChoiceMode {
    #[default]
    First,
    Greatest,
    Random,
}

impl ChoiceMode {
    pub fn name(&self) -> &'static str {
        match self {
            ChoiceMode::First => "first",
            ChoiceMode::Greatest => "greatest",
            ChoiceMode::Random => "random",
        }
    }

    /// Create the strategy for this mode.
    pub fn into_strategy(self) -> Box<dyn ChoiceStrategy> {
        match self {
            ChoiceMode::First => Box::new(FirstChoice),
            ChoiceMode::Greatest => Box::new(GreatestChoice),
            ChoiceMode::Random => Box::new(RandomChoice::new()),
        }
    }
}

impl fmt::Display for ChoiceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ChoiceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "first" => Ok(ChoiceMode::First),
            "greatest" => Ok(ChoiceMode::Greatest),
            "random" => Ok(ChoiceMode::Random),
            other => Err(format!("unknown choice mode '{other}'")),
        }
    }
}

/// Picks one candidate out of a non-empty candidate list.
pub trait ChoiceStrategy: Send + fmt::Debug {
    fn mode(&self) -> ChoiceMode;

    /// Return a position in `0..count`. `compare` orders candidates by position.
    /// Never called with `count == 0`.
    fn pick(&mut self, count: usize, compare: &dyn Fn(usize, usize) -> Ordering) -> usize;
}

impl dyn ChoiceStrategy {
    /// Choose one of `candidates`, `None` only if there are none.
    pub fn choose<T: Ord + Clone>(&mut self, candidates: &[T]) -> Option<T> {
        if candidates.is_empty() {
            return None;
        }
        let index = self.pick(candidates.len(), &|a, b| candidates[a].cmp(&candidates[b]));
        candidates.get(index).cloned()
    }
}

/// Takes the first candidate in table order.
#[derive(Debug, Default, Clone)]
pub struct FirstChoice;

impl ChoiceStrategy for FirstChoice {
    fn mode(&self) -> ChoiceMode {
        ChoiceMode::First
    }

    fn pick(&mut self, _count: usize, _compare: &dyn Fn(usize, usize) -> Ordering) -> usize {
        0
    }
}

/// Takes the greatest candidate.
#[derive(Debug, Default, Clone)]
pub struct GreatestChoice;

impl ChoiceStrategy for GreatestChoice {
    fn mode(&self) -> ChoiceMode {
        ChoiceMode::Greatest
    }

    fn pick(&mut self, count: usize, compare: &dyn Fn(usize, usize) -> Ordering) -> usize {
        (0..count).max_by(|a, b| compare(*a, *b)).unwrap_or(0)
    }
}

/// Draws a candidate uniformly at random.
#[derive(Debug, Clone)]
pub struct RandomChoice {
    rng: StdRng,
}

impl RandomChoice {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible draws.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomChoice {
    fn default() -> Self {
        Self::new()
    }
}

impl ChoiceStrategy for RandomChoice {
    fn mode(&self) -> ChoiceMode {
        ChoiceMode::Random
    }

    fn pick(&mut self, count: usize, _compare: &dyn Fn(usize, usize) -> Ordering) -> usize {
        self.rng.random_range(0..count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<(String, String)> {
        vec![
            ("B".into(), "A".into()),
            ("C".into(), "A".into()),
            ("A".into(), "C".into()),
        ]
    }

    #[test]
    fn test_first_choice() {
        let mut strategy: Box<dyn ChoiceStrategy> = Box::new(FirstChoice);
        assert_eq!(strategy.choose(&candidates()), Some(("B".into(), "A".into())));
    }

    #[test]
    fn test_greatest_choice() {
        let mut strategy = ChoiceMode::Greatest.into_strategy();
        assert_eq!(strategy.choose(&candidates()), Some(("C".into(), "A".into())));
        assert_eq!(strategy.choose(&["x".to_string()]), Some("x".to_string()));
    }

    #[test]
    fn test_random_choice_is_member() {
        let mut strategy: Box<dyn ChoiceStrategy> = Box::new(RandomChoice::seeded(7));
        let all = candidates();
        for _ in 0..50 {
            let chosen = strategy.choose(&all).unwrap();
            assert!(all.contains(&chosen));
        }
    }

    #[test]
    fn test_empty_candidates() {
        let mut strategy = ChoiceMode::First.into_strategy();
        assert_eq!(strategy.choose::<String>(&[]), None);
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("Greatest".parse::<ChoiceMode>(), Ok(ChoiceMode::Greatest));
        assert!("best".parse::<ChoiceMode>().is_err());
    }
}
