//! Maximum flow by Edmonds-Karp.

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;
use tracing::debug;

use crate::domain::StationId;
use crate::graph::{NodeIndex, WeightedGraph};
use crate::planner::PlannerError;

/// Outcome of a max-flow computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlowResult {
    /// Total flow pushed from source to sink.
    pub value: u64,
    /// Augmenting paths used.
    pub augmentations: usize,
    /// Whether the augmentation cap stopped the search early, in which case
    /// `value` is a lower bound.
    pub capped: bool,
}

/// Sparse residual capacities, owned by one computation.
///
/// Every forward edge gets a reverse entry, zero unless flow is pushed.
/// Parallel edges add their capacities into one entry.
struct Residual {
    remaining: Vec<BTreeMap<NodeIndex, u64>>,
}

impl Residual {
    fn from_graph(graph: &WeightedGraph) -> Self {
        let mut remaining: Vec<BTreeMap<NodeIndex, u64>> = vec![BTreeMap::new(); graph.node_count()];
        for edge in graph.edges() {
            let forward = remaining[edge.origin].entry(edge.destination).or_insert(0);
            *forward = forward.saturating_add(edge.capacity);
            remaining[edge.destination].entry(edge.origin).or_insert(0);
        }
        Self { remaining }
    }

    /// Fewest-edge path with spare capacity, as a parent array.
    fn augmenting_path(&self, source: NodeIndex, sink: NodeIndex) -> Option<Vec<Option<NodeIndex>>> {
        let mut parent = vec![None; self.remaining.len()];
        let mut visited = vec![false; self.remaining.len()];
        let mut queue = VecDeque::from([source]);
        visited[source] = true;

        while let Some(u) = queue.pop_front() {
            if u == sink {
                return Some(parent);
            }
            for (&v, &capacity) in &self.remaining[u] {
                if !visited[v] && capacity > 0 {
                    visited[v] = true;
                    parent[v] = Some(u);
                    queue.push_back(v);
                }
            }
        }
        None
    }

    /// Push the bottleneck along the path in `parent`, returning the amount.
    fn augment(&mut self, parent: &[Option<NodeIndex>], source: NodeIndex, sink: NodeIndex) -> u64 {
        let mut bottleneck = u64::MAX;
        let mut v = sink;
        while v != source {
            let Some(u) = parent[v] else {
                return 0;
            };
            bottleneck = bottleneck.min(self.remaining[u].get(&v).copied().unwrap_or(0));
            v = u;
        }

        let mut v = sink;
        while let Some(u) = parent[v] {
            if let Some(forward) = self.remaining[u].get_mut(&v) {
                *forward -= bottleneck;
            }
            if let Some(backward) = self.remaining[v].get_mut(&u) {
                *backward += bottleneck;
            }
            if u == source {
                break;
            }
            v = u;
        }
        bottleneck
    }
}

/// Maximum flow from `source` to `sink` using edge capacities.
///
/// Stops when no augmenting path remains or after `max_augmentations`
/// paths; in the latter case the flow found so far is returned.
pub fn max_flow(
    graph: &WeightedGraph,
    source: &StationId,
    sink: &StationId,
    max_augmentations: usize,
) -> Result<FlowResult, PlannerError> {
    let s = graph
        .index_of(source)
        .ok_or_else(|| PlannerError::UnknownStation(source.clone()))?;
    let t = graph
        .index_of(sink)
        .ok_or_else(|| PlannerError::UnknownStation(sink.clone()))?;

    if s == t {
        return Ok(FlowResult {
            value: 0,
            augmentations: 0,
            capped: false,
        });
    }

    let mut residual = Residual::from_graph(graph);
    let mut value = 0u64;
    let mut augmentations = 0;
    let mut capped = false;

    loop {
        if augmentations >= max_augmentations {
            capped = residual.augmenting_path(s, t).is_some();
            break;
        }
        let Some(parent) = residual.augmenting_path(s, t) else {
            break;
        };
        let pushed = residual.augment(&parent, s, t);
        if pushed == 0 {
            break;
        }
        value = value.saturating_add(pushed);
        augmentations += 1;
    }

    debug!(
        source = %source,
        sink = %sink,
        value,
        augmentations,
        capped,
        "Max flow finished"
    );

    Ok(FlowResult {
        value,
        augmentations,
        capped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(s: &str) -> StationId {
        StationId::parse(s).unwrap()
    }

    fn graph(edges: &[(&str, &str, u64)]) -> WeightedGraph {
        let mut g = WeightedGraph::new();
        for (a, b, c) in edges {
            g.add_edge(&sid(a), &sid(b), 1, *c);
        }
        g
    }

    fn diamond() -> WeightedGraph {
        graph(&[("A", "B", 10), ("A", "C", 5), ("B", "D", 5), ("C", "D", 10)])
    }

    #[test]
    fn diamond_flow() {
        let result = max_flow(&diamond(), &sid("A"), &sid("D"), 100).unwrap();
        assert_eq!(result.value, 10);
        assert_eq!(result.augmentations, 2);
        assert!(!result.capped);
    }

    #[test]
    fn flow_uses_reverse_edges() {
        // Classic case where the first path must be partly undone
        let g = graph(&[
            ("S", "A", 100),
            ("S", "B", 50),
            ("A", "B", 50),
            ("A", "T", 50),
            ("B", "T", 100),
        ]);
        let result = max_flow(&g, &sid("S"), &sid("T"), 100).unwrap();
        assert_eq!(result.value, 150);
    }

    #[test]
    fn parallel_edges_add_up() {
        let g = graph(&[("A", "B", 3), ("A", "B", 4)]);
        let result = max_flow(&g, &sid("A"), &sid("B"), 100).unwrap();
        assert_eq!(result.value, 7);
        assert_eq!(result.augmentations, 1);
    }

    #[test]
    fn residual_saturates_parallel_capacities() {
        let g = graph(&[("A", "B", u64::MAX), ("A", "B", 5)]);
        let residual = Residual::from_graph(&g);
        let (a, b) = (g.index_of(&sid("A")).unwrap(), g.index_of(&sid("B")).unwrap());
        assert_eq!(residual.remaining[a].get(&b), Some(&u64::MAX));
        assert_eq!(residual.remaining[b].get(&a), Some(&0));
    }

    #[test]
    fn no_path_means_zero() {
        let g = graph(&[("A", "B", 3), ("C", "D", 4)]);
        let result = max_flow(&g, &sid("A"), &sid("D"), 100).unwrap();
        assert_eq!(result.value, 0);
        assert!(!result.capped);
    }

    #[test]
    fn source_equals_sink() {
        let result = max_flow(&diamond(), &sid("A"), &sid("A"), 100).unwrap();
        assert_eq!(result.value, 0);
    }

    #[test]
    fn cap_returns_partial_flow() {
        let result = max_flow(&diamond(), &sid("A"), &sid("D"), 1).unwrap();
        assert_eq!(result.value, 5);
        assert_eq!(result.augmentations, 1);
        assert!(result.capped);
    }

    #[test]
    fn unknown_station_is_error() {
        let err = max_flow(&diamond(), &sid("A"), &sid("Z"), 100).unwrap_err();
        assert_eq!(err, PlannerError::UnknownStation(sid("Z")));
    }

    #[test]
    fn master_graph_is_untouched() {
        let g = diamond();
        max_flow(&g, &sid("A"), &sid("D"), 100).unwrap();
        let caps: Vec<_> = g.edges().map(|e| e.capacity).collect();
        assert_eq!(caps, vec![10, 5, 5, 10]);
    }
}
