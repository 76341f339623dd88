//! Request-level planning over a transit network.
//!
//! Every operation resolves its station ids against the network first and
//! fails fast on unknown ones. Pair queries then work on a lazily built
//! subgraph around the two stations rather than the master graph.

use serde::Serialize;
use tracing::debug;

use crate::analysis::{CongestionAnalysis, FlowResult, analyze, max_flow};
use crate::domain::StationId;
use crate::network::TransitNetwork;

use super::alternatives::{self, AlternativeRoute};
use super::bellman_ford::{
    ShortestPathTree, bidirectional, bounded_single_source, congestion_aware, congestion_weighted,
};
use super::config::PlannerConfig;
use super::dijkstra::shortest_path;
use super::error::PlannerError;
use super::lazy::{LazyGraphBuilder, LazySubgraph};
use super::path::Path;

/// A shortest route and where it was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutePlan {
    #[serde(flatten)]
    pub path: Path,
    /// Nodes in the graph that produced the path.
    pub searched_nodes: usize,
    /// Whether the lazy subgraph had no path and the master graph was
    /// searched instead.
    pub full_graph: bool,
}

/// A route chosen under congestion-weighted times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CongestionRoute {
    /// Travel time with congestion applied (minutes).
    pub weighted_time: i64,
    /// The same stations at free-flow times on the master graph.
    pub travel_time: i64,
    pub stations: Vec<StationId>,
}

/// Answers routing and capacity questions about one network.
pub struct Planner<'a> {
    network: &'a TransitNetwork,
    config: &'a PlannerConfig,
}

impl<'a> Planner<'a> {
    /// Create a new planner.
    pub fn new(network: &'a TransitNetwork, config: &'a PlannerConfig) -> Self {
        Self { network, config }
    }

    /// Fastest route by Dijkstra on the lazy subgraph.
    ///
    /// When the subgraph holds no path and `full_graph_fallback` is set,
    /// the master graph is searched before giving up. `Ok(None)` means the
    /// destination is unreachable.
    pub fn shortest_route(
        &self,
        origin: &StationId,
        destination: &StationId,
    ) -> Result<Option<RoutePlan>, PlannerError> {
        let sub = self.subgraph(origin, destination)?;
        if let Some(path) = shortest_path(&sub.graph, origin, destination)? {
            return Ok(Some(RoutePlan {
                path,
                searched_nodes: sub.graph.node_count(),
                full_graph: false,
            }));
        }

        if !self.config.full_graph_fallback {
            return Ok(None);
        }

        let graph = self.network.graph();
        debug!(
            origin = %origin,
            destination = %destination,
            subgraph_nodes = sub.graph.node_count(),
            "No path in subgraph, searching full graph"
        );
        Ok(shortest_path(graph, origin, destination)?.map(|path| RoutePlan {
            path,
            searched_nodes: graph.node_count(),
            full_graph: true,
        }))
    }

    /// Up to `k` distinct routes, best first.
    pub fn alternative_routes(
        &self,
        origin: &StationId,
        destination: &StationId,
        k: usize,
    ) -> Result<Vec<AlternativeRoute>, PlannerError> {
        self.resolve(origin)?;
        self.resolve(destination)?;
        alternatives::alternative_routes(self.network.graph(), origin, destination, k, self.config)
    }

    /// Congestion-weighted distances from `origin` to every station within
    /// the Bellman-Ford node limit.
    pub fn congestion_routes(
        &self,
        origin: &StationId,
        factor: f64,
    ) -> Result<ShortestPathTree, PlannerError> {
        self.resolve(origin)?;
        congestion_aware(
            self.network.graph(),
            origin,
            factor,
            self.config.bellman_ford_node_limit,
        )
    }

    /// Best route under congestion-weighted times, by bidirectional
    /// Bellman-Ford on the lazy subgraph.
    pub fn congestion_path(
        &self,
        origin: &StationId,
        destination: &StationId,
        factor: f64,
    ) -> Result<Option<CongestionRoute>, PlannerError> {
        let sub = self.subgraph(origin, destination)?;
        let weighted = congestion_weighted(&sub.graph, factor);
        let tree = bidirectional(
            &weighted,
            origin,
            destination,
            self.config.bidirectional_side_limit,
        )?;

        Ok(tree.path_to(destination).map(|path| CongestionRoute {
            weighted_time: path.distance,
            travel_time: self
                .network
                .graph()
                .path_time(&path.stations)
                .unwrap_or(path.distance),
            stations: path.stations,
        }))
    }

    /// Free-flow distances from `origin` within the Bellman-Ford node limit.
    pub fn bounded_routes(&self, origin: &StationId) -> Result<ShortestPathTree, PlannerError> {
        self.resolve(origin)?;
        bounded_single_source(
            self.network.graph(),
            origin,
            self.config.bellman_ford_node_limit,
        )
    }

    /// Peak-hour congestion and bottleneck analysis between two stations.
    pub fn bottleneck(
        &self,
        origin: &StationId,
        destination: &StationId,
    ) -> Result<CongestionAnalysis, PlannerError> {
        let sub = self.subgraph(origin, destination)?;
        let cap = self.config.max_flow_cap(sub.graph.node_count());
        analyze(&sub.graph, origin, destination, cap, &self.config.congestion)
    }

    /// Maximum flow between two stations on the lazy subgraph.
    pub fn flow(
        &self,
        origin: &StationId,
        destination: &StationId,
    ) -> Result<FlowResult, PlannerError> {
        let sub = self.subgraph(origin, destination)?;
        let cap = self.config.max_flow_cap(sub.graph.node_count());
        max_flow(&sub.graph, origin, destination, cap)
    }

    fn subgraph(
        &self,
        origin: &StationId,
        destination: &StationId,
    ) -> Result<LazySubgraph, PlannerError> {
        LazyGraphBuilder::new(self.network, &self.config.lazy).build(origin, destination)
    }

    fn resolve(&self, station: &StationId) -> Result<(), PlannerError> {
        if self.network.contains(station) {
            Ok(())
        } else {
            Err(PlannerError::UnknownStation(station.clone()))
        }
    }
}
