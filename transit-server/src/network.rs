//! The ingested transit network.
//!
//! Built once from ingested records and shared read-only afterwards.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{Line, Route, Station, StationId};
use crate::graph::WeightedGraph;
use crate::index::{RouteIndex, StationIndex};

/// Headline counts for a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetworkStats {
    pub stations: usize,
    pub routes: usize,
    pub lines: usize,
    pub nodes: usize,
    pub edges: usize,
}

/// Immutable master network: station catalog, routes, lines, the master
/// graph and both indexes.
#[derive(Debug)]
pub struct TransitNetwork {
    stations: Vec<Station>,
    positions: HashMap<StationId, usize>,
    lines: Vec<Line>,
    graph: WeightedGraph,
    station_index: StationIndex,
    route_index: RouteIndex,
}

impl TransitNetwork {
    /// Assemble a network.
    ///
    /// Every station becomes a graph node, in input order. Each route whose
    /// endpoints are both known stations becomes one edge; others are
    /// dropped with a warning. A repeated station id or route id replaces
    /// the earlier record, so every route id maps to exactly one edge.
    pub fn new(stations: Vec<Station>, routes: Vec<Route>, lines: Vec<Line>) -> Self {
        let mut catalog: Vec<Station> = Vec::with_capacity(stations.len());
        let mut positions = HashMap::with_capacity(stations.len());
        for station in stations {
            match positions.get(&station.id) {
                Some(&pos) => catalog[pos] = station,
                None => {
                    positions.insert(station.id.clone(), catalog.len());
                    catalog.push(station);
                }
            }
        }

        let mut graph = WeightedGraph::new();
        for station in &catalog {
            graph.add_node(&station.id);
        }

        let mut kept: Vec<Route> = Vec::with_capacity(routes.len());
        let mut route_positions: HashMap<String, usize> = HashMap::with_capacity(routes.len());
        for route in routes {
            if !positions.contains_key(&route.origin) || !positions.contains_key(&route.destination)
            {
                warn!(
                    route = %route.id,
                    origin = %route.origin,
                    destination = %route.destination,
                    "Dropping route with unknown endpoint"
                );
                continue;
            }
            match route_positions.get(&route.id) {
                Some(&pos) => {
                    warn!(route = %route.id, "Repeated route id, keeping the later record");
                    kept[pos] = route;
                }
                None => {
                    route_positions.insert(route.id.clone(), kept.len());
                    kept.push(route);
                }
            }
        }

        for route in &kept {
            graph.add_edge(
                &route.origin,
                &route.destination,
                route.travel_time,
                route.capacity,
            );
        }

        let station_index = StationIndex::from_stations(&catalog);
        let route_index = RouteIndex::from_routes(kept);

        let (id_tree, name_tree) = station_index.stats();
        info!(
            stations = catalog.len(),
            routes = route_index.len(),
            lines = lines.len(),
            id_tree_height = id_tree.height,
            name_tree_height = name_tree.height,
            leaves = id_tree.leaves,
            "Built transit network"
        );

        Self {
            stations: catalog,
            positions,
            lines,
            graph,
            station_index,
            route_index,
        }
    }

    pub fn station(&self, id: &StationId) -> Option<&Station> {
        self.positions.get(id).map(|&pos| &self.stations[pos])
    }

    pub fn contains(&self, id: &StationId) -> bool {
        self.positions.contains_key(id)
    }

    /// Stations in ingestion order.
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Lines calling at `station`.
    pub fn lines_for_station(&self, station: &StationId) -> Vec<&Line> {
        self.lines.iter().filter(|l| l.serves(station)).collect()
    }

    pub fn graph(&self) -> &WeightedGraph {
        &self.graph
    }

    pub fn station_index(&self) -> &StationIndex {
        &self.station_index
    }

    pub fn route_index(&self) -> &RouteIndex {
        &self.route_index
    }

    pub fn stats(&self) -> NetworkStats {
        NetworkStats {
            stations: self.stations.len(),
            routes: self.route_index.len(),
            lines: self.lines.len(),
            nodes: self.graph.node_count(),
            edges: self.graph.edge_count(),
        }
    }
}

/// Small hand-built networks shared by tests across modules.
#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::domain::{Coordinates, StationCategory};

    pub fn sid(s: &str) -> StationId {
        StationId::parse(s).unwrap()
    }

    pub fn station_at(id: &str, latitude: f64, longitude: f64) -> Station {
        Station::new(
            sid(id),
            format!("Station {id}"),
            StationCategory::BusRapid,
            Coordinates::new(latitude, longitude),
            5000,
        )
    }

    pub fn route(id: &str, from: &str, to: &str, time: i64, capacity: u64) -> Route {
        Route::new(id, sid(from), sid(to), time, capacity, 1000.0)
    }

    /// Four stations about 1 km apart along a north-south avenue, plus a
    /// fifth far to the east with no connections.
    ///
    /// A→B(5), B→C(3), A→C(10), C→D(4), B→D(12)
    pub fn avenue() -> TransitNetwork {
        let stations = vec![
            station_at("A", 4.600, -74.080),
            station_at("B", 4.609, -74.080),
            station_at("C", 4.618, -74.080),
            station_at("D", 4.627, -74.080),
            station_at("E", 4.600, -73.500),
        ];
        let routes = vec![
            route("R1", "A", "B", 5, 3000),
            route("R2", "B", "C", 3, 6000),
            route("R3", "A", "C", 10, 2000),
            route("R4", "C", "D", 4, 4500),
            route("R5", "B", "D", 12, 8000),
        ];
        TransitNetwork::new(stations, routes, Vec::new())
    }
}
