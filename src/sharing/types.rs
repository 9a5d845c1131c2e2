//! Divisible allocations.

use crate::instance::Valuations;
use std::collections::BTreeMap;

/// Fraction of every item held by every agent.
///
/// Rows follow the agent order, columns the item order. Each column sums
/// to 1 within rounding tolerance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FractionalAllocation {
    agents: Vec<String>,
    items: Vec<String>,
    fractions: Vec<Vec<f64>>,
}

impl FractionalAllocation {
    pub(crate) fn new(agents: Vec<String>, items: Vec<String>, fractions: Vec<Vec<f64>>) -> Self {
        Self {
            agents,
            items,
            fractions,
        }
    }

    pub fn agents(&self) -> &[String] {
        &self.agents
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// The full agent-by-item fraction matrix.
    pub fn fractions(&self) -> &[Vec<f64>] {
        &self.fractions
    }

    /// Per-item fractions of the named agent, in item order.
    pub fn fractions_of(&self, agent: &str) -> Option<&[f64]> {
        self.agents
            .iter()
            .position(|a| a == agent)
            .map(|i| self.fractions[i].as_slice())
    }

    /// Fraction of `item` held by `agent`.
    pub fn fraction(&self, agent: &str, item: &str) -> Option<f64> {
        let o = self.items.iter().position(|i| i == item)?;
        self.fractions_of(agent).map(|row| row[o])
    }

    /// Sum over agents of each item's fractions.
    pub fn item_sums(&self) -> Vec<f64> {
        (0..self.items.len())
            .map(|o| self.fractions.iter().map(|row| row[o]).sum())
            .collect()
    }

    /// Indices of items split between more than one agent.
    pub fn shared_items(&self) -> Vec<usize> {
        (0..self.items.len())
            .filter(|&o| {
                self.fractions
                    .iter()
                    .filter(|row| row[o] > 0.0)
                    .count()
                    > 1
            })
            .collect()
    }

    pub fn num_shared(&self) -> usize {
        self.shared_items().len()
    }

    /// Realized utility of every agent under `prefs`.
    pub fn utilities(&self, prefs: &Valuations) -> Vec<f64> {
        self.fractions
            .iter()
            .enumerate()
            .map(|(a, row)| prefs.utility(a, row))
            .collect()
    }

    /// Agent name to per-item fractions.
    pub fn to_map(&self) -> BTreeMap<String, Vec<f64>> {
        self.agents
            .iter()
            .cloned()
            .zip(self.fractions.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allocation() -> FractionalAllocation {
        FractionalAllocation::new(
            vec!["a".into(), "b".into()],
            vec!["x".into(), "y".into(), "z".into()],
            vec![vec![1.0, 0.25, 0.0], vec![0.0, 0.75, 1.0]],
        )
    }

    #[test]
    fn test_item_sums() {
        assert_eq!(allocation().item_sums(), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_shared_items() {
        let alloc = allocation();
        assert_eq!(alloc.shared_items(), vec![1]);
        assert_eq!(alloc.num_shared(), 1);
    }

    #[test]
    fn test_lookup() {
        let alloc = allocation();
        assert_eq!(alloc.fractions_of("b"), Some(&[0.0, 0.75, 1.0][..]));
        assert_eq!(alloc.fraction("a", "y"), Some(0.25));
        assert_eq!(alloc.fraction("a", "w"), None);
        assert_eq!(alloc.to_map().len(), 2);
    }
}
