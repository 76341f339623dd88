//! Single-pair minimum-time search.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tracing::trace;

use crate::domain::StationId;
use crate::graph::{NodeIndex, WeightedGraph};

use super::error::PlannerError;
use super::path::{Path, to_station_ids, walk_back};

/// Minimum-time path from `origin` to `destination`.
///
/// Returns `Ok(None)` when the destination cannot be reached. Edge times are
/// assumed non-negative.
pub fn shortest_path(
    graph: &WeightedGraph,
    origin: &StationId,
    destination: &StationId,
) -> Result<Option<Path>, PlannerError> {
    let source = graph
        .index_of(origin)
        .ok_or_else(|| PlannerError::UnknownStation(origin.clone()))?;
    let target = graph
        .index_of(destination)
        .ok_or_else(|| PlannerError::UnknownStation(destination.clone()))?;

    Ok(dijkstra(graph, source, target))
}

fn dijkstra(graph: &WeightedGraph, source: NodeIndex, target: NodeIndex) -> Option<Path> {
    let n = graph.node_count();
    let mut dist: Vec<Option<i64>> = vec![None; n];
    let mut prev: Vec<Option<NodeIndex>> = vec![None; n];
    let mut settled = vec![false; n];
    // Entries may go stale when a node is improved after being queued;
    // those are skipped on pop instead of decreased in place
    let mut heap = BinaryHeap::new();

    dist[source] = Some(0);
    heap.push(Reverse((0i64, source)));

    let mut popped = 0usize;
    while let Some(Reverse((d, u))) = heap.pop() {
        if settled[u] {
            continue;
        }
        settled[u] = true;
        popped += 1;

        if u == target {
            break;
        }

        for edge in graph.edges_from(u) {
            let candidate = d.saturating_add(edge.time);
            let v = edge.destination;
            if dist[v].is_none_or(|current| candidate < current) {
                dist[v] = Some(candidate);
                prev[v] = Some(u);
                heap.push(Reverse((candidate, v)));
            }
        }
    }

    trace!(settled = popped, "Dijkstra finished");

    let distance = dist[target]?;
    let nodes = walk_back(&prev, source, target)?;
    Some(Path {
        distance,
        stations: to_station_ids(graph, &nodes),
    })
}
