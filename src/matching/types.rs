//! Discrete allocations and run outcomes.

use crate::instance::{DiscreteInstance, Valuations};
use std::collections::BTreeMap;

/// Bundle of indivisible items held by every agent.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiscreteAllocation {
    agents: Vec<String>,
    items: Vec<String>,
    /// Item indices per agent, ascending.
    bundles: Vec<Vec<usize>>,
}

impl DiscreteAllocation {
    pub(crate) fn empty(agents: &[String], items: &[String]) -> Self {
        Self {
            agents: agents.to_vec(),
            items: items.to_vec(),
            bundles: vec![Vec::new(); agents.len()],
        }
    }

    /// Adds `item` to the bundle of `agent`. Returns `false` if it was
    /// already there.
    pub(crate) fn give(&mut self, agent: usize, item: usize) -> bool {
        let bundle = &mut self.bundles[agent];
        match bundle.binary_search(&item) {
            Ok(_) => false,
            Err(pos) => {
                bundle.insert(pos, item);
                true
            }
        }
    }

    pub fn agents(&self) -> &[String] {
        &self.agents
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Item indices held by `agent`, in item order.
    pub fn bundle(&self, agent: usize) -> &[usize] {
        &self.bundles[agent]
    }

    /// Item names held by the named agent.
    pub fn bundle_of(&self, agent: &str) -> Option<Vec<&str>> {
        let a = self.agents.iter().position(|x| x == agent)?;
        Some(self.bundle_names(a))
    }

    pub fn bundle_names(&self, agent: usize) -> Vec<&str> {
        self.bundles[agent]
            .iter()
            .map(|&o| self.items[o].as_str())
            .collect()
    }

    pub fn holds(&self, agent: usize, item: usize) -> bool {
        self.bundles[agent].binary_search(&item).is_ok()
    }

    /// Number of agents holding each item.
    pub fn item_counts(&self) -> Vec<u32> {
        let mut counts = vec![0u32; self.items.len()];
        for bundle in &self.bundles {
            for &o in bundle {
                counts[o] += 1;
            }
        }
        counts
    }

    /// Checks both capacity invariants against `instance`.
    pub fn respects_capacities(&self, instance: &DiscreteInstance) -> bool {
        let agents_ok = self
            .bundles
            .iter()
            .zip(instance.agent_capacities())
            .all(|(b, &cap)| b.len() <= cap as usize);
        let items_ok = self
            .item_counts()
            .iter()
            .zip(instance.item_capacities())
            .all(|(&count, &cap)| count <= cap);
        agents_ok && items_ok
    }

    /// Total value of every bundle under `valuations`.
    pub fn utilities(&self, valuations: &Valuations) -> Vec<f64> {
        self.bundles
            .iter()
            .enumerate()
            .map(|(a, b)| b.iter().map(|&o| valuations.value(a, o)).sum())
            .collect()
    }

    /// Agent name to item names.
    pub fn to_map(&self) -> BTreeMap<String, Vec<String>> {
        (0..self.agents.len())
            .map(|a| {
                let names = self.bundle_names(a).into_iter().map(String::from).collect();
                (self.agents[a].clone(), names)
            })
            .collect()
    }
}

/// Why the matching rounds stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerminationReason {
    /// Every agent reached its capacity.
    AgentsSaturated,

    /// Every item ran out of capacity.
    ItemsExhausted,

    /// No agent with capacity left wants any remaining item.
    NoDesiredItem,

    /// The configured round limit was reached.
    RoundLimit,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_give_keeps_bundles_sorted_and_unique() {
        let mut alloc = DiscreteAllocation::empty(&ids(&["a", "b"]), &ids(&["x", "y", "z"]));
        assert!(alloc.give(0, 2));
        assert!(alloc.give(0, 0));
        assert!(!alloc.give(0, 2));
        assert_eq!(alloc.bundle(0), &[0, 2]);
        assert_eq!(alloc.bundle_of("a"), Some(vec!["x", "z"]));
        assert!(alloc.holds(0, 2));
        assert!(!alloc.holds(1, 2));
        assert_eq!(alloc.bundle_of("c"), None);
    }

    #[test]
    fn test_capacities_and_counts() {
        let values = Valuations::new(
            ids(&["a", "b"]),
            ids(&["x", "y"]),
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        )
        .unwrap();
        let instance = DiscreteInstance::new(values.clone(), vec![1, 2], vec![1, 2]).unwrap();
        let mut alloc = DiscreteAllocation::empty(instance.agents(), instance.items());
        alloc.give(0, 1);
        alloc.give(1, 1);
        assert_eq!(alloc.item_counts(), vec![0, 2]);
        assert!(alloc.respects_capacities(&instance));
        assert_eq!(alloc.utilities(&values), vec![2.0, 4.0]);

        alloc.give(1, 0);
        assert!(alloc.respects_capacities(&instance));
        alloc.give(0, 0);
        assert!(!alloc.respects_capacities(&instance));
    }

    #[test]
    fn test_to_map() {
        let mut alloc = DiscreteAllocation::empty(&ids(&["a"]), &ids(&["x", "y"]));
        alloc.give(0, 1);
        assert_eq!(alloc.to_map()["a"], vec!["y".to_string()]);
    }
}
