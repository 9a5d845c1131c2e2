//! Utility profiles.

use crate::error::{AllocError, AllocResult};

/// Per-agent utility, in the agent order of the instance it came from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UtilityProfile {
    agents: Vec<String>,
    utilities: Vec<f64>,
}

impl UtilityProfile {
    /// Creates a profile from parallel agent and utility vectors.
    pub fn new(agents: Vec<String>, utilities: Vec<f64>) -> AllocResult<Self> {
        if agents.len() != utilities.len() {
            return Err(AllocError::DegenerateInput(format!(
                "{} utilities for {} agents",
                utilities.len(),
                agents.len()
            )));
        }
        if let Some(u) = utilities.iter().find(|u| !u.is_finite()) {
            return Err(AllocError::DegenerateInput(format!("non-finite utility {u}")));
        }
        Ok(Self { agents, utilities })
    }

    pub fn agents(&self) -> &[String] {
        &self.agents
    }

    pub fn utilities(&self) -> &[f64] {
        &self.utilities
    }

    pub fn len(&self) -> usize {
        self.utilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utilities.is_empty()
    }

    /// Utility of the named agent.
    pub fn get(&self, agent: &str) -> Option<f64> {
        self.agents
            .iter()
            .position(|a| a == agent)
            .map(|i| self.utilities[i])
    }

    /// Smallest utility, or `None` for an empty profile.
    pub fn min(&self) -> Option<f64> {
        self.utilities.iter().copied().reduce(f64::min)
    }

    /// Utilities sorted ascending.
    pub fn sorted(&self) -> Vec<f64> {
        let mut sorted = self.utilities.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        sorted
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.agents
            .iter()
            .map(String::as_str)
            .zip(self.utilities.iter().copied())
    }
}

/// Compares two utility vectors in the leximin order.
///
/// Both are sorted ascending; the first position where they differ by more
/// than `tolerance` decides. Vectors of different length compare by length.
pub fn leximin_cmp(a: &[f64], b: &[f64], tolerance: f64) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    if a.len() != b.len() {
        return a.len().cmp(&b.len());
    }
    let mut sa = a.to_vec();
    let mut sb = b.to_vec();
    sa.sort_by(|x, y| x.total_cmp(y));
    sb.sort_by(|x, y| x.total_cmp(y));
    for (x, y) in sa.iter().zip(&sb) {
        if (x - y).abs() > tolerance {
            return if x < y { Ordering::Less } else { Ordering::Greater };
        }
    }
    Ordering::Equal
}
