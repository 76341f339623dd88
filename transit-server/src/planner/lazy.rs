//! Geospatial subgraph construction.
//!
//! Rather than searching the whole network, a request searches a subgraph
//! made of the stations near either endpoint and those along the straight
//! corridor between them. Connectivity inside the subgraph is best-effort.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::{Station, StationId};
use crate::graph::WeightedGraph;
use crate::network::TransitNetwork;

use super::config::LazyConfig;
use super::error::PlannerError;

/// A request-private subgraph and how it was built.
#[derive(Debug, Clone)]
pub struct LazySubgraph {
    pub graph: WeightedGraph,
    /// Great-circle distance between the endpoints (km).
    pub direct_km: f64,
    /// Expansion and corridor radius used (km).
    pub radius_km: f64,
}

/// Builds [`LazySubgraph`]s over a network.
#[derive(Debug, Clone, Copy)]
pub struct LazyGraphBuilder<'a> {
    network: &'a TransitNetwork,
    config: &'a LazyConfig,
}

impl<'a> LazyGraphBuilder<'a> {
    pub fn new(network: &'a TransitNetwork, config: &'a LazyConfig) -> Self {
        Self { network, config }
    }

    /// Subgraph for a trip from `origin` to `destination`.
    ///
    /// Stations are chosen by layered radius expansion around each endpoint
    /// plus corridor membership; edges are every route with both endpoints
    /// chosen. Origin and destination are always nodes.
    pub fn build(
        &self,
        origin: &StationId,
        destination: &StationId,
    ) -> Result<LazySubgraph, PlannerError> {
        let from = self.station(origin)?;
        let to = self.station(destination)?;

        let direct_km = from.coordinates.distance_km(&to.coordinates);
        let radius_km = self.config.radius_for(direct_km);

        let mut relevant: HashSet<StationId> = HashSet::new();
        relevant.insert(origin.clone());
        relevant.insert(destination.clone());
        relevant.extend(self.expand(from, radius_km));
        relevant.extend(self.expand(to, radius_km));
        relevant.extend(self.corridor(from, to, radius_km, direct_km));

        let mut graph = WeightedGraph::new();
        for station in self.network.stations() {
            if relevant.contains(&station.id) {
                graph.add_node(&station.id);
            }
        }

        let mut routes = self.network.route_index().routes_for_station_set(&relevant);
        routes.sort_by(|a, b| a.id.cmp(&b.id));
        for route in &routes {
            graph.add_edge(
                &route.origin,
                &route.destination,
                route.travel_time,
                route.capacity,
            );
        }

        debug!(
            origin = %origin,
            destination = %destination,
            direct_km,
            radius_km,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            total_stations = self.network.stations().len(),
            "Built lazy subgraph"
        );

        Ok(LazySubgraph {
            graph,
            direct_km,
            radius_km,
        })
    }

    fn station(&self, id: &StationId) -> Result<&'a Station, PlannerError> {
        self.network
            .station(id)
            .ok_or_else(|| PlannerError::UnknownStation(id.clone()))
    }

    /// Stations within `radius_km` of `start`, then within `radius_km` of
    /// those, for up to `max_layers` layers. Each layer expands only the
    /// stations first found in the previous one.
    fn expand(&self, start: &Station, radius_km: f64) -> HashSet<StationId> {
        let mut found: HashSet<StationId> = HashSet::from([start.id.clone()]);
        let mut frontier: Vec<&Station> = vec![start];

        for _ in 0..self.config.max_layers {
            let mut next = Vec::new();
            for station in self.network.stations() {
                if found.contains(&station.id) {
                    continue;
                }
                let near = frontier.iter().any(|f| {
                    f.coordinates.distance_km(&station.coordinates) <= radius_km
                });
                if near {
                    found.insert(station.id.clone());
                    next.push(station);
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }
        found
    }

    /// Stations near the straight line between the endpoints that do not
    /// add more than the allowed detour.
    fn corridor(
        &self,
        from: &Station,
        to: &Station,
        radius_km: f64,
        direct_km: f64,
    ) -> Vec<StationId> {
        let max_detour_km = direct_km * self.config.max_detour_ratio;
        self.network
            .stations()
            .iter()
            .filter(|s| {
                s.coordinates
                    .distance_to_line_km(&from.coordinates, &to.coordinates)
                    <= radius_km
            })
            .filter(|s| {
                let via = s.coordinates.distance_km(&from.coordinates)
                    + s.coordinates.distance_km(&to.coordinates);
                via <= max_detour_km
            })
            .map(|s| s.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::fixtures::{avenue, route, sid, station_at};

    #[test]
    fn always_contains_endpoints() {
        let network = avenue();
        let config = LazyConfig::default();
        let builder = LazyGraphBuilder::new(&network, &config);

        let sub = builder.build(&sid("A"), &sid("E")).unwrap();
        assert!(sub.graph.contains(&sid("A")));
        assert!(sub.graph.contains(&sid("E")));
    }

    #[test]
    fn nearby_stations_and_their_routes_are_included() {
        let network = avenue();
        let config = LazyConfig::default();
        let builder = LazyGraphBuilder::new(&network, &config);

        let sub = builder.build(&sid("A"), &sid("D")).unwrap();
        assert_eq!(sub.graph.node_count(), 4);
        assert_eq!(sub.graph.edge_count(), 5);
        assert!(!sub.graph.contains(&sid("E")));
        assert_eq!(sub.radius_km, 3.0);
        assert!((sub.direct_km - 3.0).abs() < 0.1, "{}", sub.direct_km);
    }

    #[test]
    fn unknown_endpoint_is_error() {
        let network = avenue();
        let config = LazyConfig::default();
        let builder = LazyGraphBuilder::new(&network, &config);
        let err = builder.build(&sid("A"), &sid("Q")).unwrap_err();
        assert_eq!(err, PlannerError::UnknownStation(sid("Q")));
    }

    #[test]
    fn layers_chain_through_neighbors() {
        // Stations 2 km apart eastward; a 2.5 km radius reaches one more
        // per layer
        let stations: Vec<_> = (0..6)
            .map(|i| station_at(&format!("S{i}"), 0.0, i as f64 * 0.018))
            .collect();
        let network = TransitNetwork::new(stations, Vec::new(), Vec::new());
        let config = LazyConfig::new(2.5, 4.0, 3, 1.1);
        let builder = LazyGraphBuilder::new(&network, &config);

        let from = network.station(&sid("S0")).unwrap();
        let found = builder.expand(from, 2.5);
        let mut ids: Vec<_> = found.iter().map(|s| s.to_string()).collect();
        ids.sort();
        assert_eq!(ids, vec!["S0", "S1", "S2", "S3"]);
    }

    #[test]
    fn corridor_excludes_stations_beyond_the_ends() {
        let stations = vec![
            station_at("O", 0.0, 0.0),
            station_at("M", 0.0, 0.09),
            station_at("D", 0.0, 0.18),
            station_at("X", 0.0, 0.30),
            station_at("N", 0.3, 0.09),
        ];
        let network = TransitNetwork::new(stations, Vec::new(), Vec::new());
        let config = LazyConfig::default();
        let builder = LazyGraphBuilder::new(&network, &config);

        let from = network.station(&sid("O")).unwrap();
        let to = network.station(&sid("D")).unwrap();
        let direct = from.coordinates.distance_km(&to.coordinates);
        let mut ids = builder.corridor(from, to, 3.0, direct);
        ids.sort();
        assert_eq!(ids, vec![sid("D"), sid("M"), sid("O")]);
    }

    #[test]
    fn routes_outside_the_set_are_dropped() {
        let stations = vec![
            station_at("A", 0.0, 0.0),
            station_at("B", 0.0, 0.01),
            station_at("F", 5.0, 5.0),
        ];
        let routes = vec![route("R1", "A", "B", 3, 100), route("R2", "B", "F", 3, 100)];
        let network = TransitNetwork::new(stations, routes, Vec::new());
        let config = LazyConfig::default();
        let builder = LazyGraphBuilder::new(&network, &config);

        let sub = builder.build(&sid("A"), &sid("B")).unwrap();
        assert_eq!(sub.graph.edge_count(), 1);
        assert!(!sub.graph.contains(&sid("F")));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::network::fixtures::{route, sid, station_at};
    use proptest::prelude::*;

    fn arb_network() -> impl Strategy<Value = TransitNetwork> {
        let coords = prop::collection::vec((-60.0f64..60.0, -170.0f64..170.0), 2..12);
        let edges = prop::collection::vec((0usize..12, 0usize..12, 0i64..60), 0..30);
        (coords, edges).prop_map(|(coords, edges)| {
            let n = coords.len();
            let stations = coords
                .iter()
                .enumerate()
                .map(|(i, &(lat, lon))| station_at(&format!("S{i}"), lat, lon))
                .collect();
            let routes = edges
                .iter()
                .enumerate()
                .map(|(i, &(a, b, t))| {
                    route(&format!("R{i}"), &format!("S{}", a % n), &format!("S{}", b % n), t, 1000)
                })
                .collect();
            TransitNetwork::new(stations, routes, Vec::new())
        })
    }

    proptest! {
        /// Any pair of known stations ends up in its own subgraph, and every
        /// subgraph edge is a master edge with the same time
        #[test]
        fn endpoints_always_included(network in arb_network(), o in 0usize..12, d in 0usize..12) {
            let n = network.stations().len();
            let origin = sid(&format!("S{}", o % n));
            let destination = sid(&format!("S{}", d % n));
            let config = LazyConfig::default();

            let sub = LazyGraphBuilder::new(&network, &config)
                .build(&origin, &destination)
                .unwrap();
            prop_assert!(sub.graph.contains(&origin));
            prop_assert!(sub.graph.contains(&destination));

            let master = network.graph();
            prop_assert!(sub.graph.edge_count() <= master.edge_count());
            for edge in sub.graph.edges() {
                let from = sub.graph.station_id(edge.origin);
                let to = sub.graph.station_id(edge.destination);
                prop_assert!(master
                    .neighbors(from)
                    .iter()
                    .any(|e| master.station_id(e.destination) == to && e.time == edge.time));
            }
        }
    }
}
