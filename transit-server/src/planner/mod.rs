//! Route planning over weighted transit graphs.
//!
//! The algorithms here take any [`WeightedGraph`](crate::graph::WeightedGraph):
//! Dijkstra for single pairs, Bellman-Ford restricted to bounded node sets,
//! and k alternatives by edge penalization. [`Planner`] ties them to a
//! [`TransitNetwork`](crate::network::TransitNetwork), building a lazy
//! subgraph per request so that no request searches the whole network
//! unless it has to.

mod alternatives;
mod bellman_ford;
mod config;
mod dijkstra;
mod error;
mod lazy;
mod path;
mod reach;
mod search;

pub use alternatives::{AlternativeRoute, alternative_routes};
pub use bellman_ford::{
    BellmanFordOutcome, ShortestPathTree, bidirectional, bounded_single_source, congestion_aware,
    congestion_tier, congestion_weighted, unbounded,
};
pub use config::{LazyConfig, PlannerConfig};
pub use dijkstra::shortest_path;
pub use error::PlannerError;
pub use lazy::{LazyGraphBuilder, LazySubgraph};
pub use path::Path;
pub use reach::{backward_reach, forward_reach, is_reachable};
pub use search::{CongestionRoute, Planner, RoutePlan};
