//! Minimum spanning forest by Kruskal.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::domain::StationId;
use crate::graph::{NodeIndex, WeightedGraph};

/// Disjoint sets over node indices, with path compression and union by
/// rank.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut current = x;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// Merge the sets of `a` and `b`. Returns `false` if they were already
    /// one set.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        true
    }
}

/// An accepted tree edge. Direction is not meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MstEdge {
    pub a: StationId,
    pub b: StationId,
    pub time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MstResult {
    pub edges: Vec<MstEdge>,
    pub total_time: i64,
}

/// Minimum spanning forest over travel times, treating edges as undirected.
///
/// Each unordered station pair counts once, at its fastest time. On a
/// connected graph of V stations the result has V−1 edges; otherwise one
/// tree per component.
pub fn minimum_spanning_tree(graph: &WeightedGraph) -> MstResult {
    let mut fastest: HashMap<(NodeIndex, NodeIndex), i64> = HashMap::new();
    for edge in graph.edges() {
        if edge.origin == edge.destination {
            continue;
        }
        let key = (
            edge.origin.min(edge.destination),
            edge.origin.max(edge.destination),
        );
        fastest
            .entry(key)
            .and_modify(|t| *t = (*t).min(edge.time))
            .or_insert(edge.time);
    }

    let mut candidates: Vec<((NodeIndex, NodeIndex), i64)> = fastest.into_iter().collect();
    candidates.sort_by_key(|&(pair, time)| (time, pair));

    let target = graph.node_count().saturating_sub(1);
    let mut sets = UnionFind::new(graph.node_count());
    let mut edges = Vec::with_capacity(target);
    let mut total_time = 0;

    for ((a, b), time) in candidates {
        if edges.len() >= target {
            break;
        }
        if sets.union(a, b) {
            total_time += time;
            edges.push(MstEdge {
                a: graph.station_id(a).clone(),
                b: graph.station_id(b).clone(),
                time,
            });
        }
    }

    debug!(
        nodes = graph.node_count(),
        edges = edges.len(),
        total_time,
        "Kruskal finished"
    );

    MstResult { edges, total_time }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// A connected graph of V stations yields a V−1 edge tree with no
        /// cycle
        #[test]
        fn spanning_tree_of_connected_graph(
            n in 2usize..12,
            extra in prop::collection::vec((0usize..12, 0usize..12, 0i64..100), 0..30),
        ) {
            let id = |i: usize| StationId::parse(&format!("N{i}")).unwrap();
            let mut g = WeightedGraph::new();
            // A chain guarantees connectivity
            for i in 0..n - 1 {
                g.add_edge(&id(i), &id(i + 1), 50, 1);
            }
            for (a, b, t) in extra {
                g.add_edge(&id(a % n), &id(b % n), t, 1);
            }

            let mst = minimum_spanning_tree(&g);
            prop_assert_eq!(mst.edges.len(), n - 1);

            let mut uf = UnionFind::new(n);
            for edge in &mst.edges {
                let a = g.index_of(&edge.a).unwrap();
                let b = g.index_of(&edge.b).unwrap();
                prop_assert!(uf.union(a, b), "cycle through {:?}", edge);
            }
        }
    }
}
