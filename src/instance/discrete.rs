//! Instances for the discrete (capacitated) path.

use super::valuations::Valuations;
use crate::error::{AllocError, AllocResult};
use crate::normalize::Normalizer;
use std::collections::HashMap;

/// Indivisible items with seat capacities, agents with bundle-size caps.
///
/// Every agent must value at least one item, and every capacity that a
/// positive valuation depends on must be positive.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiscreteInstance {
    valuations: Valuations,
    agent_capacities: Vec<u32>,
    item_capacities: Vec<u32>,
}

impl DiscreteInstance {
    /// Builds an instance from already-normalized valuations.
    ///
    /// # Errors
    ///
    /// - [`AllocError::DegenerateInput`]: capacity vectors do not match the
    ///   valuation shape, an agent values nothing, or an item nobody values
    ///   has zero capacity.
    /// - [`AllocError::CapacityExceeded`]: an agent with positive valuations
    ///   has zero capacity, or a positively valued item has zero capacity.
    pub fn new(
        valuations: Valuations,
        agent_capacities: Vec<u32>,
        item_capacities: Vec<u32>,
    ) -> AllocResult<Self> {
        if agent_capacities.len() != valuations.num_agents() {
            return Err(AllocError::DegenerateInput(format!(
                "{} agent capacities for {} agents",
                agent_capacities.len(),
                valuations.num_agents()
            )));
        }
        if item_capacities.len() != valuations.num_items() {
            return Err(AllocError::DegenerateInput(format!(
                "{} item capacities for {} items",
                item_capacities.len(),
                valuations.num_items()
            )));
        }
        if let Some(a) = valuations.first_null_agent() {
            return Err(AllocError::DegenerateInput(format!(
                "agent {:?} has no positive valuation",
                valuations.agents()[a]
            )));
        }
        for (agent, &cap) in valuations.agents().iter().zip(&agent_capacities) {
            if cap == 0 {
                return Err(AllocError::CapacityExceeded(format!(
                    "agent {agent:?} has positive valuations but zero capacity"
                )));
            }
        }
        for (o, item) in valuations.items().iter().enumerate() {
            if item_capacities[o] > 0 {
                continue;
            }
            let wanted_by = (0..valuations.num_agents()).find(|&a| valuations.value(a, o) > 0.0);
            return Err(match wanted_by {
                Some(a) => AllocError::CapacityExceeded(format!(
                    "item {item:?} has zero capacity but agent {:?} values it",
                    valuations.agents()[a]
                )),
                None => AllocError::DegenerateInput(format!("item {item:?} has zero capacity")),
            });
        }
        Ok(Self {
            valuations,
            agent_capacities,
            item_capacities,
        })
    }

    /// Normalizes raw valuations, then builds the instance.
    pub fn normalized(
        raw: &Valuations,
        agent_capacities: Vec<u32>,
        item_capacities: Vec<u32>,
        normalizer: &Normalizer,
    ) -> AllocResult<Self> {
        let valuations = normalizer.normalize(raw, &[])?;
        Self::new(valuations, agent_capacities, item_capacities)
    }

    /// Builds an instance from ordered capacity lists and nested valuation
    /// maps.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use u_fairalloc::instance::DiscreteInstance;
    ///
    /// let valuations = HashMap::from([
    ///     ("s1".to_string(), HashMap::from([("c1".to_string(), 5.0), ("c2".to_string(), 1.0)])),
    /// ]);
    /// let instance = DiscreteInstance::from_maps(
    ///     &[("s1".to_string(), 1)],
    ///     &[("c1".to_string(), 10), ("c2".to_string(), 10)],
    ///     &valuations,
    /// )
    /// .unwrap();
    /// assert_eq!(instance.agent_capacity(0), 1);
    /// ```
    pub fn from_maps(
        agent_capacities: &[(String, u32)],
        item_capacities: &[(String, u32)],
        valuations: &HashMap<String, HashMap<String, f64>>,
    ) -> AllocResult<Self> {
        let agents: Vec<String> = agent_capacities.iter().map(|(a, _)| a.clone()).collect();
        let items: Vec<String> = item_capacities.iter().map(|(o, _)| o.clone()).collect();
        let valuations = Valuations::from_map(&agents, &items, valuations)?;
        Self::new(
            valuations,
            agent_capacities.iter().map(|&(_, c)| c).collect(),
            item_capacities.iter().map(|&(_, c)| c).collect(),
        )
    }

    pub fn valuations(&self) -> &Valuations {
        &self.valuations
    }

    pub fn agents(&self) -> &[String] {
        self.valuations.agents()
    }

    pub fn items(&self) -> &[String] {
        self.valuations.items()
    }

    pub fn num_agents(&self) -> usize {
        self.valuations.num_agents()
    }

    pub fn num_items(&self) -> usize {
        self.valuations.num_items()
    }

    pub fn agent_capacities(&self) -> &[u32] {
        &self.agent_capacities
    }

    pub fn item_capacities(&self) -> &[u32] {
        &self.item_capacities
    }

    pub fn agent_capacity(&self, agent: usize) -> u32 {
        self.agent_capacities[agent]
    }

    pub fn item_capacity(&self, item: usize) -> u32 {
        self.item_capacities[item]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn valuations() -> Valuations {
        Valuations::new(
            ids(&["a", "b"]),
            ids(&["x", "y"]),
            vec![vec![1.0, 0.0], vec![2.0, 0.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_new_ok() {
        let instance = DiscreteInstance::new(valuations(), vec![1, 2], vec![1, 1]).unwrap();
        assert_eq!(instance.agent_capacity(1), 2);
        assert_eq!(instance.item_capacity(0), 1);
    }

    #[test]
    fn test_zero_agent_capacity() {
        let err = DiscreteInstance::new(valuations(), vec![0, 2], vec![1, 1]).unwrap_err();
        assert!(matches!(err, AllocError::CapacityExceeded(_)));
    }

    #[test]
    fn test_zero_capacity_on_valued_item() {
        let err = DiscreteInstance::new(valuations(), vec![1, 1], vec![0, 1]).unwrap_err();
        assert!(matches!(err, AllocError::CapacityExceeded(_)));
    }

    #[test]
    fn test_zero_capacity_on_unvalued_item() {
        let err = DiscreteInstance::new(valuations(), vec![1, 1], vec![1, 0]).unwrap_err();
        assert!(matches!(err, AllocError::DegenerateInput(_)));
    }

    #[test]
    fn test_capacity_length_mismatch() {
        assert!(DiscreteInstance::new(valuations(), vec![1], vec![1, 1]).is_err());
        assert!(DiscreteInstance::new(valuations(), vec![1, 1], vec![1]).is_err());
    }

    #[test]
    fn test_agent_without_values() {
        let v = Valuations::new(ids(&["a", "b"]), ids(&["x"]), vec![vec![1.0], vec![0.0]]).unwrap();
        let err = DiscreteInstance::new(v, vec![1, 1], vec![2]).unwrap_err();
        assert!(matches!(err, AllocError::DegenerateInput(_)));
    }
}
