//! Bounded breadth-first reachability.

use std::collections::VecDeque;

use crate::graph::{NodeIndex, WeightedGraph};

/// Nodes reachable from `start` along outgoing edges, in discovery order,
/// stopping once `limit` nodes have been found. `start` is always included.
pub fn forward_reach(graph: &WeightedGraph, start: NodeIndex, limit: usize) -> Vec<NodeIndex> {
    bounded_bfs(graph.node_count(), start, limit, |u| {
        graph.edges_from(u).iter().map(|e| e.destination)
    })
}

/// Nodes from which `start` is reachable, found by walking `incoming`
/// (as built by [`WeightedGraph::incoming_index`]), bounded like
/// [`forward_reach`].
pub fn backward_reach(
    incoming: &[Vec<NodeIndex>],
    start: NodeIndex,
    limit: usize,
) -> Vec<NodeIndex> {
    bounded_bfs(incoming.len(), start, limit, |u| incoming[u].iter().copied())
}

/// Whether `to` can be reached from `from`.
pub fn is_reachable(graph: &WeightedGraph, from: NodeIndex, to: NodeIndex) -> bool {
    forward_reach(graph, from, usize::MAX).contains(&to)
}

fn bounded_bfs<F, I>(node_count: usize, start: NodeIndex, limit: usize, successors: F) -> Vec<NodeIndex>
where
    F: Fn(NodeIndex) -> I,
    I: IntoIterator<Item = NodeIndex>,
{
    let limit = limit.max(1);
    let mut seen = vec![false; node_count];
    let mut found = vec![start];
    let mut queue = VecDeque::from([start]);
    seen[start] = true;

    while found.len() < limit {
        let Some(u) = queue.pop_front() else {
            break;
        };
        for v in successors(u) {
            if seen[v] {
                continue;
            }
            seen[v] = true;
            found.push(v);
            queue.push_back(v);
            if found.len() >= limit {
                break;
            }
        }
    }
    found
}
