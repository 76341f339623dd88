//! Bellman-Ford over bounded node sets.
//!
//! Full Bellman-Ford is O(V·E), which is too slow on the whole network per
//! request. Every entry point here first picks a node set (a BFS-bounded
//! prefix, or the overlap of a forward and a backward search) and relaxes
//! only edges inside it. Results on a truncated set are best-effort: a
//! path may be missed or longer than the true optimum.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::domain::StationId;
use crate::graph::{NodeIndex, WeightedGraph};

use super::error::PlannerError;
use super::path::{Path, to_station_ids};
use super::reach::forward_reach;

/// Distances and predecessors from one source.
///
/// Only stations reached from the source are recorded.
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    source: StationId,
    reached: HashMap<StationId, (i64, Option<StationId>)>,
    /// Size of the node set the search was restricted to.
    pub nodes_considered: usize,
    /// Relaxation passes run before the distances settled or the pass
    /// budget ran out.
    pub rounds: usize,
}

impl ShortestPathTree {
    pub fn source(&self) -> &StationId {
        &self.source
    }

    pub fn distance_to(&self, station: &StationId) -> Option<i64> {
        self.reached.get(station).map(|(d, _)| *d)
    }

    /// Reconstructed path to `station`, if it was reached.
    pub fn path_to(&self, station: &StationId) -> Option<Path> {
        let (distance, _) = self.reached.get(station)?;
        let mut stations = vec![station.clone()];
        let mut current = station;
        while current != &self.source {
            let (_, prev) = self.reached.get(current)?;
            current = prev.as_ref()?;
            stations.push(current.clone());
            if stations.len() > self.reached.len() {
                return None;
            }
        }
        stations.reverse();
        Some(Path {
            distance: *distance,
            stations,
        })
    }

    /// Number of stations reached, the source included.
    pub fn len(&self) -> usize {
        self.reached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reached.is_empty()
    }

    /// Reached stations with their distances, nearest first, ties by id.
    pub fn distances(&self) -> Vec<(&StationId, i64)> {
        let mut out: Vec<_> = self.reached.iter().map(|(id, (d, _))| (id, *d)).collect();
        out.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        out
    }
}

/// Outcome of an unbounded run with cycle detection.
#[derive(Debug, Clone)]
pub enum BellmanFordOutcome {
    Distances(ShortestPathTree),
    /// A negative-weight cycle reachable from the source, as a station
    /// sequence that starts and ends at the same station.
    NegativeCycle(Vec<StationId>),
}

/// Result of relaxing edges within a node set.
struct Relaxation {
    dist: Vec<Option<i64>>,
    prev: Vec<Option<NodeIndex>>,
    rounds: usize,
}

/// Bellman-Ford from `origin`, restricted to at most `node_limit` nodes
/// found by BFS from the origin. When the limit covers the whole graph every
/// node takes part, reachable or not.
pub fn bounded_single_source(
    graph: &WeightedGraph,
    origin: &StationId,
    node_limit: usize,
) -> Result<ShortestPathTree, PlannerError> {
    let source = resolve(graph, origin)?;
    let members = if node_limit >= graph.node_count() {
        (0..graph.node_count()).collect()
    } else {
        forward_reach(graph, source, node_limit)
    };

    let relaxation = relax(graph, source, &members);
    debug!(
        origin = %origin,
        nodes = members.len(),
        rounds = relaxation.rounds,
        "Bounded Bellman-Ford finished"
    );
    Ok(into_tree(graph, source, members.len(), relaxation))
}

/// Bellman-Ford between a pair, restricted to nodes met by a bidirectional
/// search.
///
/// A forward search from the origin and a backward search over incoming
/// edges from the destination take turns expanding one node each, until
/// both run dry or either side holds `side_limit` nodes. Relaxation runs on
/// the nodes both sides found, or on everything either side found when they
/// never met. Origin and destination always take part.
pub fn bidirectional(
    graph: &WeightedGraph,
    origin: &StationId,
    destination: &StationId,
    side_limit: usize,
) -> Result<ShortestPathTree, PlannerError> {
    let source = resolve(graph, origin)?;
    let target = resolve(graph, destination)?;

    let members = meeting_set(graph, source, target, side_limit);
    let relaxation = relax(graph, source, &members);
    debug!(
        origin = %origin,
        destination = %destination,
        nodes = members.len(),
        rounds = relaxation.rounds,
        "Bidirectional Bellman-Ford finished"
    );
    Ok(into_tree(graph, source, members.len(), relaxation))
}

/// Unbounded Bellman-Ford with negative-cycle detection.
///
/// After |V|−1 passes one more pass is made; if any edge still improves a
/// distance, the predecessor chain from the improved node is walked until a
/// station repeats, and the cycle is reported instead of distances.
pub fn unbounded(graph: &WeightedGraph, origin: &StationId) -> Result<BellmanFordOutcome, PlannerError> {
    let source = resolve(graph, origin)?;
    let members: Vec<NodeIndex> = (0..graph.node_count()).collect();
    let mut relaxation = relax(graph, source, &members);

    let improved = members.iter().find_map(|&u| {
        let du = relaxation.dist[u]?;
        graph.edges_from(u).iter().find_map(|edge| {
            let candidate = du.saturating_add(edge.time);
            relaxation.dist[edge.destination]
                .is_none_or(|dv| candidate < dv)
                .then_some((u, edge.destination))
        })
    });

    let Some((u, v)) = improved else {
        return Ok(BellmanFordOutcome::Distances(into_tree(
            graph,
            source,
            members.len(),
            relaxation,
        )));
    };

    relaxation.prev[v] = Some(u);
    let cycle = cycle_through(&relaxation.prev, v);
    debug!(origin = %origin, length = cycle.len(), "Negative cycle detected");
    Ok(BellmanFordOutcome::NegativeCycle(to_station_ids(graph, &cycle)))
}

/// Copy of `graph` with every edge slowed by congestion.
///
/// Each edge takes `time + time × factor × tier`, truncated, where the tier
/// depends on capacity: 1.5 below 3000, 1.0 below 5000, otherwise 0.3.
pub fn congestion_weighted(graph: &WeightedGraph, factor: f64) -> WeightedGraph {
    graph.map_edges(|edge| {
        let time = edge.time as f64;
        let penalty = time * factor * congestion_tier(edge.capacity);
        ((time + penalty) as i64, edge.capacity)
    })
}

/// Congestion multiplier for an edge of the given capacity.
pub fn congestion_tier(capacity: u64) -> f64 {
    if capacity < 3000 {
        1.5
    } else if capacity < 5000 {
        1.0
    } else {
        0.3
    }
}

/// Bounded single-source search on congestion-weighted times.
pub fn congestion_aware(
    graph: &WeightedGraph,
    origin: &StationId,
    factor: f64,
    node_limit: usize,
) -> Result<ShortestPathTree, PlannerError> {
    resolve(graph, origin)?;
    let weighted = congestion_weighted(graph, factor);
    bounded_single_source(&weighted, origin, node_limit)
}

pub(crate) fn resolve(graph: &WeightedGraph, station: &StationId) -> Result<NodeIndex, PlannerError> {
    graph
        .index_of(station)
        .ok_or_else(|| PlannerError::UnknownStation(station.clone()))
}

/// Relax edges whose endpoints both lie in `members`, at most
/// `members.len() − 1` passes, stopping after a pass with no change.
fn relax(graph: &WeightedGraph, source: NodeIndex, members: &[NodeIndex]) -> Relaxation {
    let n = graph.node_count();
    let mut in_set = vec![false; n];
    for &m in members {
        in_set[m] = true;
    }

    let mut dist: Vec<Option<i64>> = vec![None; n];
    let mut prev: Vec<Option<NodeIndex>> = vec![None; n];
    dist[source] = Some(0);

    let mut rounds = 0;
    for _ in 1..members.len() {
        rounds += 1;
        let mut changed = false;
        for &u in members {
            let Some(du) = dist[u] else {
                continue;
            };
            for edge in graph.edges_from(u) {
                let v = edge.destination;
                if !in_set[v] {
                    continue;
                }
                let candidate = du.saturating_add(edge.time);
                if dist[v].is_none_or(|dv| candidate < dv) {
                    dist[v] = Some(candidate);
                    prev[v] = Some(u);
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    Relaxation { dist, prev, rounds }
}

fn into_tree(
    graph: &WeightedGraph,
    source: NodeIndex,
    nodes_considered: usize,
    relaxation: Relaxation,
) -> ShortestPathTree {
    let reached = relaxation
        .dist
        .iter()
        .enumerate()
        .filter_map(|(node, d)| {
            let d = (*d)?;
            let prev = relaxation.prev[node].map(|p| graph.station_id(p).clone());
            Some((graph.station_id(node).clone(), (d, prev)))
        })
        .collect();

    ShortestPathTree {
        source: graph.station_id(source).clone(),
        reached,
        nodes_considered,
        rounds: relaxation.rounds,
    }
}

/// Nodes met by alternating forward and backward searches.
fn meeting_set(
    graph: &WeightedGraph,
    source: NodeIndex,
    target: NodeIndex,
    side_limit: usize,
) -> Vec<NodeIndex> {
    let n = graph.node_count();
    let incoming = graph.incoming_index();

    let mut forward = vec![false; n];
    let mut backward = vec![false; n];
    let mut forward_count = 1;
    let mut backward_count = 1;
    let mut forward_queue = VecDeque::from([source]);
    let mut backward_queue = VecDeque::from([target]);
    forward[source] = true;
    backward[target] = true;

    while (!forward_queue.is_empty() || !backward_queue.is_empty())
        && forward_count < side_limit
        && backward_count < side_limit
    {
        if let Some(u) = forward_queue.pop_front() {
            for edge in graph.edges_from(u) {
                let v = edge.destination;
                if !forward[v] {
                    forward[v] = true;
                    forward_count += 1;
                    forward_queue.push_back(v);
                }
            }
        }

        if backward_count < side_limit {
            if let Some(u) = backward_queue.pop_front() {
                for &p in &incoming[u] {
                    if !backward[p] {
                        backward[p] = true;
                        backward_count += 1;
                        backward_queue.push_back(p);
                    }
                }
            }
        }
    }

    let mut members: Vec<NodeIndex> = (0..n).filter(|&i| forward[i] && backward[i]).collect();
    if members.is_empty() {
        members = (0..n).filter(|&i| forward[i] || backward[i]).collect();
    }
    for endpoint in [source, target] {
        if !members.contains(&endpoint) {
            members.push(endpoint);
        }
    }
    members
}

/// The cycle reachable by walking `prev` back from `start`, in travel order,
/// closed by repeating its first station.
fn cycle_through(prev: &[Option<NodeIndex>], start: NodeIndex) -> Vec<NodeIndex> {
    let mut seen = vec![false; prev.len()];
    let mut current = start;
    while !seen[current] {
        seen[current] = true;
        match prev[current] {
            Some(p) => current = p,
            None => return Vec::new(),
        }
    }

    let anchor = current;
    let mut cycle = vec![anchor];
    let mut node = prev[anchor];
    while let Some(p) = node {
        cycle.push(p);
        if p == anchor {
            break;
        }
        node = prev[p];
    }
    cycle.reverse();
    cycle
}
