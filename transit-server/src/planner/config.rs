//! Planner configuration.

use crate::analysis::CongestionConfig;

/// Constants of the geospatial subgraph builder.
#[derive(Debug, Clone, PartialEq)]
pub struct LazyConfig {
    /// Smallest expansion radius (km).
    pub min_radius_km: f64,

    /// The radius is the direct distance divided by this, unless that falls
    /// below `min_radius_km`.
    pub radius_divisor: f64,

    /// Maximum number of expansion layers from each endpoint.
    pub max_layers: usize,

    /// Corridor stations may add at most this factor over the direct
    /// distance.
    pub max_detour_ratio: f64,
}

impl LazyConfig {
    pub fn new(
        min_radius_km: f64,
        radius_divisor: f64,
        max_layers: usize,
        max_detour_ratio: f64,
    ) -> Self {
        Self {
            min_radius_km,
            radius_divisor,
            max_layers,
            max_detour_ratio,
        }
    }

    /// Expansion radius for a trip of `direct_km`.
    pub fn radius_for(&self, direct_km: f64) -> f64 {
        self.min_radius_km.max(direct_km / self.radius_divisor)
    }
}

impl Default for LazyConfig {
    fn default() -> Self {
        Self {
            min_radius_km: 3.0,
            radius_divisor: 4.0,
            max_layers: 3,
            max_detour_ratio: 1.1,
        }
    }
}

/// Configuration parameters for route planning.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// Node cap for bounded single-source Bellman-Ford.
    pub bellman_ford_node_limit: usize,

    /// Per-side node cap for the bidirectional pair query.
    pub bidirectional_side_limit: usize,

    /// Upper bound on k for alternative routes.
    pub max_alternatives: usize,

    /// Multiplier applied to edges of an already-found alternative.
    pub penalty_factor: f64,

    /// Added to penalized edge times (minutes).
    pub penalty_offset: i64,

    /// Per-side caps tried in turn when building the alternatives subgraph,
    /// until the destination is reachable inside it.
    pub subgraph_limits: Vec<usize>,

    /// Per-side cap used when none of `subgraph_limits` connects the pair.
    pub subgraph_fallback_limit: usize,

    /// Absolute cap on max-flow augmentations. The effective cap is the
    /// smaller of this and twice the node count.
    pub max_flow_iteration_cap: usize,

    /// Retry shortest-path on the master graph when the lazy subgraph has
    /// no path.
    pub full_graph_fallback: bool,

    pub lazy: LazyConfig,

    /// Peak-hour congestion model.
    pub congestion: CongestionConfig,
}

impl PlannerConfig {
    /// Create a new configuration with the given parameters.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bellman_ford_node_limit: usize,
        bidirectional_side_limit: usize,
        max_alternatives: usize,
        penalty_factor: f64,
        penalty_offset: i64,
        subgraph_limits: Vec<usize>,
        subgraph_fallback_limit: usize,
        max_flow_iteration_cap: usize,
        full_graph_fallback: bool,
        lazy: LazyConfig,
        congestion: CongestionConfig,
    ) -> Self {
        Self {
            bellman_ford_node_limit,
            bidirectional_side_limit,
            max_alternatives,
            penalty_factor,
            penalty_offset,
            subgraph_limits,
            subgraph_fallback_limit,
            max_flow_iteration_cap,
            full_graph_fallback,
            lazy,
            congestion,
        }
    }

    /// Penalized time for an edge that an earlier alternative used.
    pub fn penalize(&self, time: i64) -> i64 {
        (time as f64 * self.penalty_factor) as i64 + self.penalty_offset
    }

    /// Effective augmentation cap for a graph of `nodes` nodes.
    pub fn max_flow_cap(&self, nodes: usize) -> usize {
        self.max_flow_iteration_cap.min(nodes.saturating_mul(2))
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            bellman_ford_node_limit: 800,
            bidirectional_side_limit: 500,
            max_alternatives: 5,
            penalty_factor: 1.5,
            penalty_offset: 10,
            subgraph_limits: vec![500, 1000, 2000, 5000],
            subgraph_fallback_limit: 10_000,
            max_flow_iteration_cap: 10_000,
            full_graph_fallback: true,
            lazy: LazyConfig::default(),
            congestion: CongestionConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlannerConfig::default();

        assert_eq!(config.bellman_ford_node_limit, 800);
        assert_eq!(config.bidirectional_side_limit, 500);
        assert_eq!(config.max_alternatives, 5);
        assert_eq!(config.penalty_offset, 10);
        assert_eq!(config.subgraph_limits, vec![500, 1000, 2000, 5000]);
        assert_eq!(config.subgraph_fallback_limit, 10_000);
        assert!(config.full_graph_fallback);
        assert_eq!(config.lazy.max_layers, 3);
    }

    #[test]
    fn penalty_truncates_then_offsets() {
        let config = PlannerConfig::default();
        assert_eq!(config.penalize(10), 25);
        assert_eq!(config.penalize(5), 17);
        assert_eq!(config.penalize(0), 10);
    }

    #[test]
    fn max_flow_cap_scales_with_size() {
        let config = PlannerConfig::default();
        assert_eq!(config.max_flow_cap(4), 8);
        assert_eq!(config.max_flow_cap(100_000), 10_000);
    }

    #[test]
    fn radius_has_floor() {
        let lazy = LazyConfig::default();
        assert_eq!(lazy.radius_for(4.0), 3.0);
        assert_eq!(lazy.radius_for(20.0), 5.0);
    }

    #[test]
    fn custom_config() {
        let config = PlannerConfig::new(
            100,
            50,
            3,
            2.0,
            0,
            vec![10],
            20,
            30,
            false,
            LazyConfig::new(1.0, 2.0, 1, 1.5),
            CongestionConfig::new(0.5, 1000, 60.0, 2000.0, 2),
        );
        assert_eq!(config.penalize(7), 14);
        assert_eq!(config.max_flow_cap(100), 30);
        assert_eq!(config.lazy.radius_for(10.0), 5.0);
        assert_eq!(config.congestion.max_bottlenecks, 2);
    }
}
