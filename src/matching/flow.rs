//! Maximum-weight bipartite b-matching by successive shortest paths.
//!
//! Each agent claims at most one unit per round; each item supplies up to
//! its remaining capacity. The matching is a min-cost flow on
//!
//! ```text
//! source -(1, 0)-> agent -(1, -w)-> item -(cap, 0)-> sink
//! ```
//!
//! augmented one unit at a time along the cheapest residual path, and
//! stopped as soon as that path no longer has negative cost. Because the
//! marginal cost of successive augmentations is non-decreasing, stopping
//! there yields a maximum-weight (not maximum-cardinality) matching.
//!
//! Arcs are scanned in insertion order and only strictly shorter paths
//! replace a label, so the same inputs always produce the same matching.

const COST_EPS: f64 = 1e-9;

#[derive(Debug, Clone)]
struct Arc {
    to: usize,
    rev: usize,
    cap: u32,
    cost: f64,
}

#[derive(Debug, Clone)]
struct FlowNetwork {
    graph: Vec<Vec<Arc>>,
}

impl FlowNetwork {
    fn new(nodes: usize) -> Self {
        Self {
            graph: vec![Vec::new(); nodes],
        }
    }

    /// Adds an arc and its residual twin; returns the forward arc position.
    fn add_arc(&mut self, from: usize, to: usize, cap: u32, cost: f64) -> usize {
        let fwd = self.graph[from].len();
        let bwd = self.graph[to].len();
        self.graph[from].push(Arc {
            to,
            rev: bwd,
            cap,
            cost,
        });
        self.graph[to].push(Arc {
            to: from,
            rev: fwd,
            cap: 0,
            cost: -cost,
        });
        fwd
    }

    /// Bellman-Ford over the residual graph. Returns distances and, per
    /// node, the `(node, arc)` it was reached through.
    fn shortest_paths(&self, source: usize) -> (Vec<f64>, Vec<Option<(usize, usize)>>) {
        let n = self.graph.len();
        let mut dist = vec![f64::INFINITY; n];
        let mut prev = vec![None; n];
        dist[source] = 0.0;

        for _ in 0..n {
            let mut changed = false;
            for u in 0..n {
                if !dist[u].is_finite() {
                    continue;
                }
                for (i, arc) in self.graph[u].iter().enumerate() {
                    if arc.cap == 0 {
                        continue;
                    }
                    let candidate = dist[u] + arc.cost;
                    if candidate < dist[arc.to] - COST_EPS {
                        dist[arc.to] = candidate;
                        prev[arc.to] = Some((u, i));
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }
        (dist, prev)
    }

    fn augment_unit(&mut self, sink: usize, prev: &[Option<(usize, usize)>]) {
        let mut v = sink;
        while let Some((u, i)) = prev[v] {
            let rev = self.graph[u][i].rev;
            self.graph[u][i].cap -= 1;
            self.graph[v][rev].cap += 1;
            v = u;
        }
    }
}

/// Computes one round of claims.
///
/// `agents` lists the agents allowed to claim, in tie-break order.
/// `item_capacity[o]` is the number of units item `o` can still supply.
/// `weight(a, o)` returns the claim weight, or `None` when agent `a` may
/// not claim item `o`; non-positive weights are never matched.
///
/// Returns `(agent, item)` pairs in the order of `agents`.
pub(crate) fn max_weight_claims<F>(
    agents: &[usize],
    item_capacity: &[u32],
    weight: F,
) -> Vec<(usize, usize)>
where
    F: Fn(usize, usize) -> Option<f64>,
{
    let n = agents.len();
    let m = item_capacity.len();
    let source = 0;
    let sink = n + m + 1;
    let agent_node = |k: usize| 1 + k;
    let item_node = |o: usize| 1 + n + o;

    let mut net = FlowNetwork::new(n + m + 2);
    let mut claim_arcs: Vec<(usize, usize, usize)> = Vec::new();
    for (k, &a) in agents.iter().enumerate() {
        net.add_arc(source, agent_node(k), 1, 0.0);
        for (o, &cap) in item_capacity.iter().enumerate() {
            if cap == 0 {
                continue;
            }
            if let Some(w) = weight(a, o).filter(|w| *w > 0.0 && w.is_finite()) {
                let pos = net.add_arc(agent_node(k), item_node(o), 1, -w);
                claim_arcs.push((k, o, pos));
            }
        }
    }
    if claim_arcs.is_empty() {
        return Vec::new();
    }
    for (o, &cap) in item_capacity.iter().enumerate() {
        if cap > 0 {
            net.add_arc(item_node(o), sink, cap, 0.0);
        }
    }

    for _ in 0..n {
        let (dist, prev) = net.shortest_paths(source);
        if !dist[sink].is_finite() || dist[sink] >= -COST_EPS {
            break;
        }
        net.augment_unit(sink, &prev);
    }

    claim_arcs
        .into_iter()
        .filter(|&(k, _, pos)| net.graph[agent_node(k)][pos].cap == 0)
        .map(|(k, o, _)| (agents[k], o))
        .collect()
}
