//! Conflict-free assignment by Welsh-Powell coloring.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::domain::StationId;
use crate::graph::WeightedGraph;

/// Station to color assignment. Colors start at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coloring {
    pub colors: BTreeMap<StationId, usize>,
    /// Number of distinct colors used. An upper bound on the chromatic
    /// number, not the optimum.
    pub color_count: usize,
}

impl Coloring {
    pub fn color_of(&self, station: &StationId) -> Option<usize> {
        self.colors.get(station).copied()
    }

    /// Stations grouped by color, in color order.
    pub fn classes(&self) -> BTreeMap<usize, Vec<&StationId>> {
        let mut classes: BTreeMap<usize, Vec<&StationId>> = BTreeMap::new();
        for (station, &color) in &self.colors {
            classes.entry(color).or_default().push(station);
        }
        classes
    }
}

/// Welsh-Powell greedy coloring.
///
/// Stations are ordered by descending out-degree, ties by id. Each round
/// takes the first uncolored station, opens a new color for it, and extends
/// that color to every later uncolored station not adjacent to a station
/// already holding it. Adjacency counts edges in either direction.
pub fn welsh_powell(graph: &WeightedGraph) -> Coloring {
    let n = graph.node_count();
    let incoming = graph.incoming_index();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        graph
            .edges_from(b)
            .len()
            .cmp(&graph.edges_from(a).len())
            .then_with(|| graph.station_id(a).cmp(graph.station_id(b)))
    });

    let mut color: Vec<Option<usize>> = vec![None; n];
    let mut current = 0;

    for (pos, &start) in order.iter().enumerate() {
        if color[start].is_some() {
            continue;
        }
        current += 1;
        color[start] = Some(current);

        for &candidate in &order[pos + 1..] {
            if color[candidate].is_some() {
                continue;
            }
            let conflict = graph
                .edges_from(candidate)
                .iter()
                .map(|e| e.destination)
                .chain(incoming[candidate].iter().copied())
                .any(|neighbor| color[neighbor] == Some(current));
            if !conflict {
                color[candidate] = Some(current);
            }
        }
    }

    let colors = color
        .iter()
        .enumerate()
        .filter_map(|(node, c)| c.map(|c| (graph.station_id(node).clone(), c)))
        .collect();

    debug!(nodes = n, colors = current, "Welsh-Powell finished");

    Coloring {
        colors,
        color_count: current,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// No two directly connected stations share a color
        #[test]
        fn adjacent_stations_differ(
            edges in prop::collection::vec((0usize..10, 0usize..10), 0..40),
        ) {
            let mut g = WeightedGraph::new();
            for (a, b) in &edges {
                if a != b {
                    g.add_edge(
                        &StationId::parse(&format!("N{a}")).unwrap(),
                        &StationId::parse(&format!("N{b}")).unwrap(),
                        1,
                        1,
                    );
                }
            }

            let coloring = welsh_powell(&g);
            prop_assert_eq!(coloring.colors.len(), g.node_count());
            for edge in g.edges() {
                let a = coloring.color_of(g.station_id(edge.origin));
                let b = coloring.color_of(g.station_id(edge.destination));
                prop_assert_ne!(a, b);
            }
        }
    }
}
