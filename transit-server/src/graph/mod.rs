//! Weighted directed multigraph of stations.
//!
//! Stations are interned to dense node indices on insertion; each node owns a
//! contiguous vector of its outgoing edges. Algorithms work on indices and
//! translate back to [`StationId`]s only when producing results.

use std::collections::HashMap;

use crate::domain::StationId;

/// Dense index of a node inside one [`WeightedGraph`].
///
/// Indices are only meaningful for the graph that issued them.
pub type NodeIndex = usize;

/// A directed, time- and capacity-weighted connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub origin: NodeIndex,
    pub destination: NodeIndex,
    /// Travel time in minutes.
    pub time: i64,
    /// Passengers per interval.
    pub capacity: u64,
}

/// Adjacency-list directed multigraph.
///
/// Parallel edges between the same pair are kept as separate entries.
#[derive(Debug, Clone, Default)]
pub struct WeightedGraph {
    ids: Vec<StationId>,
    index: HashMap<StationId, NodeIndex>,
    adjacency: Vec<Vec<Edge>>,
    edge_count: usize,
}

impl WeightedGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node if absent, returning its index either way.
    pub fn add_node(&mut self, station: &StationId) -> NodeIndex {
        if let Some(&idx) = self.index.get(station) {
            return idx;
        }
        let idx = self.ids.len();
        self.ids.push(station.clone());
        self.index.insert(station.clone(), idx);
        self.adjacency.push(Vec::new());
        idx
    }

    /// Append a directed edge, inserting both endpoints as needed.
    pub fn add_edge(
        &mut self,
        origin: &StationId,
        destination: &StationId,
        time: i64,
        capacity: u64,
    ) {
        let from = self.add_node(origin);
        let to = self.add_node(destination);
        self.push_edge(from, to, time, capacity);
    }

    fn push_edge(&mut self, origin: NodeIndex, destination: NodeIndex, time: i64, capacity: u64) {
        self.adjacency[origin].push(Edge {
            origin,
            destination,
            time,
            capacity,
        });
        self.edge_count += 1;
    }

    /// Outgoing edges of `station`, or an empty slice if it is not a node.
    pub fn neighbors(&self, station: &StationId) -> &[Edge] {
        match self.index.get(station) {
            Some(&idx) => &self.adjacency[idx],
            None => &[],
        }
    }

    /// Outgoing edges of the node at `idx`.
    pub fn edges_from(&self, idx: NodeIndex) -> &[Edge] {
        &self.adjacency[idx]
    }

    pub fn contains(&self, station: &StationId) -> bool {
        self.index.contains_key(station)
    }

    pub fn index_of(&self, station: &StationId) -> Option<NodeIndex> {
        self.index.get(station).copied()
    }

    /// The station id of the node at `idx`.
    pub fn station_id(&self, idx: NodeIndex) -> &StationId {
        &self.ids[idx]
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Every edge, grouped by origin in node-index order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.adjacency.iter().flatten()
    }

    /// Predecessor lists: for each node, the origins of its incoming edges.
    ///
    /// An origin appears once per incoming edge, so parallel edges repeat it.
    pub fn incoming_index(&self) -> Vec<Vec<NodeIndex>> {
        let mut incoming = vec![Vec::new(); self.node_count()];
        for edge in self.edges() {
            incoming[edge.destination].push(edge.origin);
        }
        incoming
    }

    /// Copy of the graph restricted to `nodes`.
    ///
    /// Nodes are inserted in the given order; an edge is kept when both of its
    /// endpoints are in the set.
    pub fn induced_subgraph(&self, nodes: &[NodeIndex]) -> WeightedGraph {
        let mut member = vec![false; self.node_count()];
        let mut sub = WeightedGraph::new();
        for &idx in nodes {
            member[idx] = true;
            sub.add_node(&self.ids[idx]);
        }
        for &idx in nodes {
            let from = sub.index[&self.ids[idx]];
            for edge in &self.adjacency[idx] {
                if member[edge.destination] {
                    let to = sub.index[&self.ids[edge.destination]];
                    sub.push_edge(from, to, edge.time, edge.capacity);
                }
            }
        }
        sub
    }

    /// Copy of the graph with every edge's time and capacity rewritten by `f`.
    ///
    /// Node indices are preserved.
    pub fn map_edges(&self, f: impl Fn(&Edge) -> (i64, u64)) -> WeightedGraph {
        let adjacency = self
            .adjacency
            .iter()
            .map(|edges| {
                edges
                    .iter()
                    .map(|edge| {
                        let (time, capacity) = f(edge);
                        Edge {
                            time,
                            capacity,
                            ..*edge
                        }
                    })
                    .collect()
            })
            .collect();

        WeightedGraph {
            ids: self.ids.clone(),
            index: self.index.clone(),
            adjacency,
            edge_count: self.edge_count,
        }
    }

    /// Replace the `position`-th outgoing edge of `origin` with a copy
    /// carrying `time`. The old edge is removed and the new one appended, so
    /// edge order within the node changes.
    pub fn retime_edge(&mut self, origin: NodeIndex, position: usize, time: i64) {
        let old = self.adjacency[origin].remove(position);
        self.adjacency[origin].push(Edge { time, ..old });
    }

    /// Position and edge of the fastest edge from `origin` to `destination`.
    pub fn fastest_edge(&self, origin: NodeIndex, destination: NodeIndex) -> Option<(usize, &Edge)> {
        self.adjacency[origin]
            .iter()
            .enumerate()
            .filter(|(_, e)| e.destination == destination)
            .min_by_key(|(_, e)| e.time)
    }

    /// Total time along consecutive stations of `path`, taking the fastest
    /// parallel edge for each hop. `None` if some hop has no edge.
    pub fn path_time(&self, path: &[StationId]) -> Option<i64> {
        let mut total = 0;
        for pair in path.windows(2) {
            let from = self.index_of(&pair[0])?;
            let to = self.index_of(&pair[1])?;
            let (_, edge) = self.fastest_edge(from, to)?;
            total += edge.time;
        }
        Some(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(s: &str) -> StationId {
        StationId::parse(s).unwrap()
    }

    #[test]
    fn add_node_is_idempotent() {
        let mut g = WeightedGraph::new();
        let a = g.add_node(&sid("A"));
        let again = g.add_node(&sid("A"));
        assert_eq!(a, again);
        assert_eq!(g.node_count(), 1);
    }

    #[test]
    fn add_edge_inserts_endpoints() {
        let mut g = WeightedGraph::new();
        g.add_edge(&sid("A"), &sid("B"), 5, 100);

        assert!(g.contains(&sid("A")));
        assert!(g.contains(&sid("B")));
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn parallel_edges_are_not_merged() {
        let mut g = WeightedGraph::new();
        g.add_edge(&sid("A"), &sid("B"), 5, 100);
        g.add_edge(&sid("A"), &sid("B"), 7, 300);

        let edges = g.neighbors(&sid("A"));
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].time, 5);
        assert_eq!(edges[1].time, 7);
    }

    #[test]
    fn neighbors_of_missing_station_is_empty() {
        let g = WeightedGraph::new();
        assert!(g.neighbors(&sid("Z")).is_empty());
        assert!(!g.contains(&sid("Z")));
    }

    #[test]
    fn incoming_index_lists_origins() {
        let mut g = WeightedGraph::new();
        g.add_edge(&sid("A"), &sid("C"), 1, 1);
        g.add_edge(&sid("B"), &sid("C"), 1, 1);

        let incoming = g.incoming_index();
        let c = g.index_of(&sid("C")).unwrap();
        let mut origins: Vec<_> = incoming[c].iter().map(|&i| g.station_id(i).clone()).collect();
        origins.sort();
        assert_eq!(origins, vec![sid("A"), sid("B")]);
    }

    #[test]
    fn induced_subgraph_drops_outside_edges() {
        let mut g = WeightedGraph::new();
        g.add_edge(&sid("A"), &sid("B"), 1, 1);
        g.add_edge(&sid("B"), &sid("C"), 1, 1);
        g.add_edge(&sid("A"), &sid("C"), 1, 1);

        let a = g.index_of(&sid("A")).unwrap();
        let b = g.index_of(&sid("B")).unwrap();
        let sub = g.induced_subgraph(&[a, b]);

        assert_eq!(sub.node_count(), 2);
        assert_eq!(sub.edge_count(), 1);
        assert!(!sub.contains(&sid("C")));
    }

    #[test]
    fn retime_edge_moves_edge_to_back() {
        let mut g = WeightedGraph::new();
        g.add_edge(&sid("A"), &sid("B"), 5, 1);
        g.add_edge(&sid("A"), &sid("C"), 6, 1);

        let a = g.index_of(&sid("A")).unwrap();
        g.retime_edge(a, 0, 20);

        let edges = g.edges_from(a);
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[1].time, 20);
        assert_eq!(g.station_id(edges[1].destination), &sid("B"));
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn path_time_uses_fastest_parallel_edge() {
        let mut g = WeightedGraph::new();
        g.add_edge(&sid("A"), &sid("B"), 9, 1);
        g.add_edge(&sid("A"), &sid("B"), 4, 1);
        g.add_edge(&sid("B"), &sid("C"), 3, 1);

        assert_eq!(g.path_time(&[sid("A"), sid("B"), sid("C")]), Some(7));
        assert_eq!(g.path_time(&[sid("C"), sid("A")]), None);
        assert_eq!(g.path_time(&[sid("A")]), Some(0));
    }

    #[test]
    fn map_edges_preserves_indices() {
        let mut g = WeightedGraph::new();
        g.add_edge(&sid("A"), &sid("B"), 10, 100);

        let doubled = g.map_edges(|e| (e.time * 2, e.capacity / 2));
        assert_eq!(doubled.index_of(&sid("B")), g.index_of(&sid("B")));
        assert_eq!(doubled.neighbors(&sid("A"))[0].time, 20);
        assert_eq!(doubled.neighbors(&sid("A"))[0].capacity, 50);
    }
}
