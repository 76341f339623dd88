//! Paths and predecessor walks.

use serde::Serialize;

use crate::domain::StationId;
use crate::graph::{NodeIndex, WeightedGraph};

/// A route through the graph with its total travel time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Path {
    /// Sum of edge times along the path (minutes).
    pub distance: i64,
    /// Stations from origin to destination, inclusive.
    pub stations: Vec<StationId>,
}

impl Path {
    pub fn origin(&self) -> Option<&StationId> {
        self.stations.first()
    }

    pub fn destination(&self) -> Option<&StationId> {
        self.stations.last()
    }

    /// Number of edges traversed.
    pub fn hops(&self) -> usize {
        self.stations.len().saturating_sub(1)
    }
}

/// Walk `prev` back from `target` to `source`.
///
/// Returns node indices in travel order, or `None` if the chain breaks
/// before reaching `source` or runs longer than the node count.
pub(crate) fn walk_back(
    prev: &[Option<NodeIndex>],
    source: NodeIndex,
    target: NodeIndex,
) -> Option<Vec<NodeIndex>> {
    let mut nodes = vec![target];
    let mut current = target;
    while current != source {
        current = prev[current]?;
        nodes.push(current);
        if nodes.len() > prev.len() {
            return None;
        }
    }
    nodes.reverse();
    Some(nodes)
}

/// Translate node indices of `graph` into station ids.
pub(crate) fn to_station_ids(graph: &WeightedGraph, nodes: &[NodeIndex]) -> Vec<StationId> {
    nodes.iter().map(|&n| graph.station_id(n).clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_back_follows_predecessors() {
        let prev = vec![None, Some(0), Some(1), None];
        assert_eq!(walk_back(&prev, 0, 2), Some(vec![0, 1, 2]));
        assert_eq!(walk_back(&prev, 0, 0), Some(vec![0]));
        assert_eq!(walk_back(&prev, 0, 3), None);
    }

    #[test]
    fn walk_back_stops_on_cycle() {
        let prev = vec![None, Some(2), Some(1)];
        assert_eq!(walk_back(&prev, 0, 1), None);
    }

    #[test]
    fn path_accessors() {
        let path = Path {
            distance: 8,
            stations: vec![
                StationId::parse("A").unwrap(),
                StationId::parse("B").unwrap(),
                StationId::parse("C").unwrap(),
            ],
        };
        assert_eq!(path.hops(), 2);
        assert_eq!(path.origin().unwrap().as_str(), "A");
        assert_eq!(path.destination().unwrap().as_str(), "C");
    }
}
