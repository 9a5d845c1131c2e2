//! Dense agent-by-item valuation matrix.

use crate::error::{AllocError, AllocResult};
use std::collections::{HashMap, HashSet};

/// Non-negative valuations of every agent for every item.
///
/// Rows follow the agent order and columns the item order given at
/// construction; both orders are preserved in all outputs.
///
/// # Examples
///
/// ```
/// use u_fairalloc::instance::Valuations;
///
/// let v = Valuations::new(
///     vec!["alice".into(), "bob".into()],
///     vec!["x".into(), "y".into()],
///     vec![vec![3.0, 1.0], vec![0.0, 2.0]],
/// )
/// .unwrap();
/// assert_eq!(v.value(0, 0), 3.0);
/// assert_eq!(v.agent_total(1), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Valuations {
    agents: Vec<String>,
    items: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl Valuations {
    /// Creates a valuation matrix, rejecting empty, ragged, duplicate,
    /// negative or non-finite input.
    pub fn new(
        agents: Vec<String>,
        items: Vec<String>,
        values: Vec<Vec<f64>>,
    ) -> AllocResult<Self> {
        if agents.is_empty() {
            return Err(AllocError::DegenerateInput("no agents".into()));
        }
        if items.is_empty() {
            return Err(AllocError::DegenerateInput("no items".into()));
        }
        ensure_unique("agent", &agents)?;
        ensure_unique("item", &items)?;
        if values.len() != agents.len() {
            return Err(AllocError::DegenerateInput(format!(
                "{} valuation rows for {} agents",
                values.len(),
                agents.len()
            )));
        }
        for (agent, row) in agents.iter().zip(&values) {
            if row.len() != items.len() {
                return Err(AllocError::DegenerateInput(format!(
                    "agent {agent:?} has {} values for {} items",
                    row.len(),
                    items.len()
                )));
            }
            for (item, &v) in items.iter().zip(row) {
                if !v.is_finite() || v < 0.0 {
                    return Err(AllocError::DegenerateInput(format!(
                        "agent {agent:?} values item {item:?} at {v}"
                    )));
                }
            }
        }
        Ok(Self {
            agents,
            items,
            values,
        })
    }

    /// Creates a valuation matrix from nested maps, in the given orders.
    ///
    /// Every (agent, item) pair must be present.
    pub fn from_map(
        agents: &[String],
        items: &[String],
        map: &HashMap<String, HashMap<String, f64>>,
    ) -> AllocResult<Self> {
        let mut values = Vec::with_capacity(agents.len());
        for agent in agents {
            let prefs = map.get(agent).ok_or_else(|| {
                AllocError::DegenerateInput(format!("no valuations for agent {agent:?}"))
            })?;
            let row = items
                .iter()
                .map(|item| {
                    prefs.get(item).copied().ok_or_else(|| {
                        AllocError::DegenerateInput(format!(
                            "agent {agent:?} has no value for item {item:?}"
                        ))
                    })
                })
                .collect::<AllocResult<Vec<f64>>>()?;
            values.push(row);
        }
        Self::new(agents.to_vec(), items.to_vec(), values)
    }

    /// Same agents and items with a different matrix of the same shape.
    pub(crate) fn with_values(&self, values: Vec<Vec<f64>>) -> Self {
        debug_assert_eq!(values.len(), self.agents.len());
        Self {
            agents: self.agents.clone(),
            items: self.items.clone(),
            values,
        }
    }

    pub fn agents(&self) -> &[String] {
        &self.agents
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    /// The row of values for agent index `agent`.
    pub fn row(&self, agent: usize) -> &[f64] {
        &self.values[agent]
    }

    pub fn value(&self, agent: usize, item: usize) -> f64 {
        self.values[agent][item]
    }

    pub fn agent_index(&self, name: &str) -> Option<usize> {
        self.agents.iter().position(|a| a == name)
    }

    pub fn item_index(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|o| o == name)
    }

    /// Sum of an agent's values over all items.
    pub fn agent_total(&self, agent: usize) -> f64 {
        self.values[agent].iter().sum()
    }

    /// Utility of `agent` for a vector of per-item fractions.
    pub fn utility(&self, agent: usize, fractions: &[f64]) -> f64 {
        self.values[agent]
            .iter()
            .zip(fractions)
            .map(|(v, x)| v * x)
            .sum()
    }

    /// Index of the first agent whose values are all zero, if any.
    pub(crate) fn first_null_agent(&self) -> Option<usize> {
        (0..self.agents.len()).find(|&a| self.values[a].iter().all(|&v| v <= 0.0))
    }
}

fn ensure_unique(kind: &str, ids: &[String]) -> AllocResult<()> {
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id.as_str()) {
            return Err(AllocError::DegenerateInput(format!("duplicate {kind} {id:?}")));
        }
    }
    Ok(())
}
