//! Data transfer objects for web requests and responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::{CongestionAnalysis, Coloring, FlowResult};
use crate::domain::{Line, Station, StationCategory, StationId};
use crate::network::TransitNetwork;
use crate::planner::{AlternativeRoute, CongestionRoute, RoutePlan, ShortestPathTree};

/// Request to search stations by name or id.
#[derive(Debug, Deserialize)]
pub struct StationSearchRequest {
    /// Search query
    pub q: String,

    /// Maximum number of results (default 10, at most 50)
    pub limit: Option<usize>,
}

/// A pair of stations to plan between.
#[derive(Debug, Deserialize)]
pub struct PairRequest {
    /// Origin station id
    pub origin: String,

    /// Destination station id
    pub destination: String,
}

/// Request for alternative routes.
#[derive(Debug, Deserialize)]
pub struct AlternativesRequest {
    pub origin: String,
    pub destination: String,

    /// Number of routes wanted (default 3)
    pub k: Option<usize>,
}

/// Request for congestion-aware routing.
///
/// Without a destination the response lists distances to every station in
/// range of the origin.
#[derive(Debug, Deserialize)]
pub struct CongestionRequest {
    pub origin: String,
    pub destination: Option<String>,

    /// Congestion strength, 0 for free flow (default 1.0)
    pub factor: Option<f64>,
}

/// Request for distances from one station.
#[derive(Debug, Deserialize)]
pub struct OriginRequest {
    pub origin: String,
}

/// A station as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationResult {
    pub id: String,
    pub name: String,
    pub category: StationCategory,
    pub latitude: f64,
    pub longitude: f64,
    pub capacity: u64,
}

/// Response for station search.
#[derive(Debug, Serialize)]
pub struct StationSearchResponse {
    pub stations: Vec<StationResult>,
}

/// A line as returned by the API.
#[derive(Debug, Serialize)]
pub struct LineResult {
    pub id: String,
    pub name: String,
    pub category: StationCategory,

    /// Member station ids in line order
    pub stations: Vec<String>,
}

/// Response for the fastest route between two stations.
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub origin: String,
    pub destination: String,

    /// Whether any route exists
    pub found: bool,

    /// Total travel time in minutes
    pub travel_time: Option<i64>,

    pub stations: Vec<StationResult>,

    /// Size of the graph that was searched
    pub searched_nodes: usize,

    /// Whether the search had to fall back to the full network
    pub full_graph: bool,
}

/// One alternative route.
#[derive(Debug, Serialize)]
pub struct AlternativeResult {
    pub rank: usize,

    /// Cost including penalties from earlier alternatives
    pub cost: i64,

    /// Travel time in minutes
    pub travel_time: i64,

    pub stations: Vec<StationResult>,
}

/// Response for alternative routes.
#[derive(Debug, Serialize)]
pub struct AlternativesResponse {
    pub origin: String,
    pub destination: String,
    pub routes: Vec<AlternativeResult>,
}

/// Distance to one reached station.
#[derive(Debug, Serialize)]
pub struct ReachedStation {
    pub id: String,
    pub distance: i64,
}

/// Response listing distances from one station.
#[derive(Debug, Serialize)]
pub struct DistancesResponse {
    pub origin: String,

    /// Stations the search was limited to
    pub nodes_considered: usize,

    /// Reached stations, nearest first
    pub reached: Vec<ReachedStation>,
}

/// Response for a congestion-aware route between two stations.
#[derive(Debug, Serialize)]
pub struct CongestionRouteResponse {
    pub origin: String,
    pub destination: String,
    pub factor: f64,
    pub found: bool,

    /// Travel time with congestion applied
    pub weighted_time: Option<i64>,

    /// Travel time of the same stations at free flow
    pub travel_time: Option<i64>,

    pub stations: Vec<StationResult>,
}

/// Response for congestion-aware routing: a single route when a
/// destination was given, otherwise distances from the origin.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CongestionResponse {
    Route(CongestionRouteResponse),
    Distances(DistancesResponse),
}

/// Response for max-flow and bottleneck analysis.
#[derive(Debug, Serialize)]
pub struct FlowResponse {
    pub origin: String,
    pub destination: String,
    pub flow: FlowResult,
    pub congestion: CongestionAnalysis,
}

/// Response for the coloring of the network.
#[derive(Debug, Serialize)]
pub struct ColoringResponse {
    pub color_count: usize,
    pub colors: BTreeMap<StationId, usize>,

    /// Stations per color
    pub classes: BTreeMap<usize, Vec<StationId>>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl StationResult {
    /// Create from a domain Station.
    pub fn from_station(station: &Station) -> Self {
        Self {
            id: station.id.to_string(),
            name: station.name.clone(),
            category: station.category,
            latitude: station.coordinates.latitude,
            longitude: station.coordinates.longitude,
            capacity: station.capacity,
        }
    }

    /// Look up each id in the network, skipping any it does not know.
    pub fn from_ids(network: &TransitNetwork, ids: &[StationId]) -> Vec<Self> {
        ids.iter()
            .filter_map(|id| network.station(id))
            .map(Self::from_station)
            .collect()
    }
}

impl LineResult {
    /// Create from a domain Line.
    pub fn from_line(line: &Line) -> Self {
        Self {
            id: line.id.clone(),
            name: line.name.clone(),
            category: line.category,
            stations: line.stations.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RouteResponse {
    /// Create from the planner's answer, which is `None` when unreachable.
    pub fn from_plan(
        network: &TransitNetwork,
        origin: &StationId,
        destination: &StationId,
        plan: Option<RoutePlan>,
    ) -> Self {
        let (travel_time, stations, searched_nodes, full_graph) = match plan {
            Some(plan) => (
                Some(plan.path.distance),
                StationResult::from_ids(network, &plan.path.stations),
                plan.searched_nodes,
                plan.full_graph,
            ),
            None => (None, Vec::new(), 0, false),
        };

        Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            found: travel_time.is_some(),
            travel_time,
            stations,
            searched_nodes,
            full_graph,
        }
    }
}

impl AlternativeResult {
    /// Create from a planner alternative.
    pub fn from_alternative(network: &TransitNetwork, route: &AlternativeRoute) -> Self {
        Self {
            rank: route.rank,
            cost: route.cost,
            travel_time: route.travel_time,
            stations: StationResult::from_ids(network, &route.stations),
        }
    }
}

impl DistancesResponse {
    /// Create from a shortest-path tree.
    pub fn from_tree(tree: &ShortestPathTree) -> Self {
        Self {
            origin: tree.source().to_string(),
            nodes_considered: tree.nodes_considered,
            reached: tree
                .distances()
                .into_iter()
                .map(|(id, distance)| ReachedStation {
                    id: id.to_string(),
                    distance,
                })
                .collect(),
        }
    }
}

impl CongestionRouteResponse {
    /// Create from the planner's answer, which is `None` when unreachable.
    pub fn from_route(
        network: &TransitNetwork,
        origin: &StationId,
        destination: &StationId,
        factor: f64,
        route: Option<CongestionRoute>,
    ) -> Self {
        Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            factor,
            found: route.is_some(),
            weighted_time: route.as_ref().map(|r| r.weighted_time),
            travel_time: route.as_ref().map(|r| r.travel_time),
            stations: route
                .map(|r| StationResult::from_ids(network, &r.stations))
                .unwrap_or_default(),
        }
    }
}

impl ColoringResponse {
    /// Create from a network coloring.
    pub fn from_coloring(coloring: &Coloring) -> Self {
        let classes = coloring
            .classes()
            .into_iter()
            .map(|(color, stations)| (color, stations.into_iter().cloned().collect()))
            .collect();

        Self {
            color_count: coloring.color_count,
            colors: coloring.colors.clone(),
            classes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::welsh_powell;
    use crate::network::fixtures::{avenue, sid};
    use crate::planner::{Path, Planner, PlannerConfig};

    #[test]
    fn station_result_fields() {
        let network = avenue();
        let station = network.station(&sid("B")).unwrap();
        let result = StationResult::from_station(station);

        assert_eq!(result.id, "B");
        assert_eq!(result.name, "Station B");
        assert_eq!(result.category, StationCategory::BusRapid);
        assert_eq!(result.latitude, 4.609);
        assert_eq!(result.capacity, 5000);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["category"], "bus-rapid");
    }

    #[test]
    fn unknown_ids_are_skipped() {
        let network = avenue();
        let results = StationResult::from_ids(&network, &[sid("A"), sid("Z"), sid("C")]);
        let ids: Vec<_> = results.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C"]);
    }

    #[test]
    fn route_response_found() {
        let network = avenue();
        let plan = RoutePlan {
            path: Path {
                distance: 8,
                stations: vec![sid("A"), sid("B"), sid("C")],
            },
            searched_nodes: 4,
            full_graph: false,
        };
        let response = RouteResponse::from_plan(&network, &sid("A"), &sid("C"), Some(plan));

        assert!(response.found);
        assert_eq!(response.travel_time, Some(8));
        assert_eq!(response.stations.len(), 3);
        assert_eq!(response.stations[1].id, "B");
    }

    #[test]
    fn route_response_not_found() {
        let network = avenue();
        let response = RouteResponse::from_plan(&network, &sid("A"), &sid("E"), None);
        assert!(!response.found);
        assert_eq!(response.travel_time, None);
        assert!(response.stations.is_empty());
    }

    #[test]
    fn distances_nearest_first() {
        let network = avenue();
        let config = PlannerConfig::default();
        let tree = Planner::new(&network, &config)
            .bounded_routes(&sid("A"))
            .unwrap();
        let response = DistancesResponse::from_tree(&tree);

        assert_eq!(response.origin, "A");
        let reached: Vec<_> = response
            .reached
            .iter()
            .map(|r| (r.id.as_str(), r.distance))
            .collect();
        assert_eq!(reached, vec![("A", 0), ("B", 5), ("C", 8), ("D", 12)]);
    }

    #[test]
    fn coloring_classes_cover_every_station() {
        let network = avenue();
        let coloring = welsh_powell(network.graph());
        let response = ColoringResponse::from_coloring(&coloring);

        let total: usize = response.classes.values().map(Vec::len).sum();
        assert_eq!(total, 5);
        assert_eq!(response.classes.len(), response.color_count);
    }

    #[test]
    fn line_result_keeps_order() {
        let line = Line {
            id: "L1".to_string(),
            name: "Avenue".to_string(),
            category: StationCategory::BusRapid,
            stations: vec![sid("C"), sid("A")],
        };
        let result = LineResult::from_line(&line);
        assert_eq!(result.stations, vec!["C", "A"]);
    }
}
