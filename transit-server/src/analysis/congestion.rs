//! Peak-hour congestion analysis.
//!
//! Compares max-flow between two stations under normal and reduced
//! capacity, and flags thin edges as likely bottlenecks.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::domain::StationId;
use crate::graph::WeightedGraph;
use crate::planner::PlannerError;

use super::flow::max_flow;

/// Constants of the congestion model.
#[derive(Debug, Clone, PartialEq)]
pub struct CongestionConfig {
    /// Share of nominal capacity available at peak hour.
    pub peak_capacity_factor: f64,

    /// Edges below this capacity are bottleneck candidates.
    pub bottleneck_capacity: u64,

    /// Candidates whose estimated usage exceeds this percentage are
    /// reported.
    pub usage_threshold_percent: f64,

    /// Capacity at which estimated usage bottoms out at 50 %.
    pub reference_capacity: f64,

    /// At most this many bottlenecks are reported.
    pub max_bottlenecks: usize,
}

impl CongestionConfig {
    pub fn new(
        peak_capacity_factor: f64,
        bottleneck_capacity: u64,
        usage_threshold_percent: f64,
        reference_capacity: f64,
        max_bottlenecks: usize,
    ) -> Self {
        Self {
            peak_capacity_factor,
            bottleneck_capacity,
            usage_threshold_percent,
            reference_capacity,
            max_bottlenecks,
        }
    }

    /// Estimated usage of an edge: 50 % plus up to 40 % more as capacity
    /// falls below the reference. Zero-capacity edges carry nothing.
    pub fn estimated_usage(&self, capacity: u64) -> f64 {
        if capacity == 0 {
            return 0.0;
        }
        50.0 + (1.0 - capacity as f64 / self.reference_capacity) * 40.0
    }
}

impl Default for CongestionConfig {
    fn default() -> Self {
        Self {
            peak_capacity_factor: 0.6,
            bottleneck_capacity: 4000,
            usage_threshold_percent: 70.0,
            reference_capacity: 8000.0,
            max_bottlenecks: 5,
        }
    }
}

/// Severity of the peak-hour flow reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CongestionLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl CongestionLevel {
    /// Level for a flow reduction given in percent.
    pub fn from_reduction(percent: f64) -> Self {
        if percent < 10.0 {
            CongestionLevel::Low
        } else if percent < 25.0 {
            CongestionLevel::Medium
        } else if percent < 40.0 {
            CongestionLevel::High
        } else {
            CongestionLevel::Critical
        }
    }
}

impl fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CongestionLevel::Low => "low",
            CongestionLevel::Medium => "medium",
            CongestionLevel::High => "high",
            CongestionLevel::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// An edge likely to saturate at peak hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bottleneck {
    pub origin: StationId,
    pub destination: StationId,
    /// Peak-hour capacity.
    pub capacity: u64,
    /// Capacity times estimated usage.
    pub estimated_flow: u64,
    pub usage_percent: f64,
}

/// Result of [`analyze`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CongestionAnalysis {
    pub normal_flow: u64,
    pub peak_flow: u64,
    pub reduction_percent: f64,
    pub level: CongestionLevel,
    pub bottlenecks: Vec<Bottleneck>,
    pub recommendations: Vec<String>,
}

/// Analyze peak-hour congestion between `origin` and `destination`.
pub fn analyze(
    graph: &WeightedGraph,
    origin: &StationId,
    destination: &StationId,
    max_augmentations: usize,
    config: &CongestionConfig,
) -> Result<CongestionAnalysis, PlannerError> {
    let peak = peak_hour(graph, config.peak_capacity_factor);

    let normal_flow = max_flow(graph, origin, destination, max_augmentations)?.value;
    let peak_flow = max_flow(&peak, origin, destination, max_augmentations)?.value;

    let reduction_percent = if normal_flow == 0 {
        0.0
    } else {
        (normal_flow as f64 - peak_flow as f64) / normal_flow as f64 * 100.0
    };
    let level = CongestionLevel::from_reduction(reduction_percent);
    let bottlenecks = find_bottlenecks(&peak, config);
    let recommendations = recommendations(level, &bottlenecks, peak_flow);

    debug!(
        origin = %origin,
        destination = %destination,
        normal_flow,
        peak_flow,
        reduction_percent,
        %level,
        bottlenecks = bottlenecks.len(),
        "Congestion analysis finished"
    );

    Ok(CongestionAnalysis {
        normal_flow,
        peak_flow,
        reduction_percent,
        level,
        bottlenecks,
        recommendations,
    })
}

/// Copy of `graph` with every capacity scaled by `factor`, truncated.
pub fn peak_hour(graph: &WeightedGraph, factor: f64) -> WeightedGraph {
    graph.map_edges(|edge| (edge.time, (edge.capacity as f64 * factor) as u64))
}

/// Thin edges whose estimated usage crosses the threshold, busiest first.
pub fn find_bottlenecks(graph: &WeightedGraph, config: &CongestionConfig) -> Vec<Bottleneck> {
    let mut found: Vec<Bottleneck> = graph
        .edges()
        .filter(|edge| edge.capacity < config.bottleneck_capacity)
        .filter_map(|edge| {
            let usage = config.estimated_usage(edge.capacity);
            (usage > config.usage_threshold_percent).then(|| Bottleneck {
                origin: graph.station_id(edge.origin).clone(),
                destination: graph.station_id(edge.destination).clone(),
                capacity: edge.capacity,
                estimated_flow: (edge.capacity as f64 * usage / 100.0) as u64,
                usage_percent: usage,
            })
        })
        .collect();

    found.sort_by(|a, b| {
        b.usage_percent
            .total_cmp(&a.usage_percent)
            .then_with(|| a.origin.cmp(&b.origin))
            .then_with(|| a.destination.cmp(&b.destination))
    });
    found.truncate(config.max_bottlenecks);
    found
}

fn recommendations(level: CongestionLevel, bottlenecks: &[Bottleneck], peak_flow: u64) -> Vec<String> {
    let mut lines: Vec<String> = match level {
        CongestionLevel::Low => vec![
            "Traffic conditions are favourable".into(),
            "No special action required".into(),
        ],
        CongestionLevel::Medium => vec![
            "Moderate congestion detected".into(),
            "Consider alternative routes at peak hours".into(),
            "Avoid 7-9 AM and 5-7 PM where possible".into(),
        ],
        CongestionLevel::High => vec![
            "High congestion on this route".into(),
            "Alternative routes are recommended".into(),
            format!("Increase vehicle frequency by {} units", peak_flow / 500),
        ],
        CongestionLevel::Critical => vec![
            "Critical congestion: immediate action required".into(),
            "Avoid this route at peak hours".into(),
            "Introduce express services".into(),
            "Consider dedicated lanes on congested segments".into(),
        ],
    };

    if !bottlenecks.is_empty() {
        lines.push("Bottlenecks identified:".into());
        for b in bottlenecks.iter().take(3) {
            lines.push(format!(
                "{} -> {} ({:.0}% usage)",
                b.origin, b.destination, b.usage_percent
            ));
        }
        lines.push("Prioritise improvements on these segments".into());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(s: &str) -> StationId {
        StationId::parse(s).unwrap()
    }

    fn graph(edges: &[(&str, &str, u64)]) -> WeightedGraph {
        let mut g = WeightedGraph::new();
        for (a, b, c) in edges {
            g.add_edge(&sid(a), &sid(b), 4, *c);
        }
        g
    }

    #[test]
    fn levels() {
        assert_eq!(CongestionLevel::from_reduction(0.0), CongestionLevel::Low);
        assert_eq!(CongestionLevel::from_reduction(9.99), CongestionLevel::Low);
        assert_eq!(CongestionLevel::from_reduction(10.0), CongestionLevel::Medium);
        assert_eq!(CongestionLevel::from_reduction(25.0), CongestionLevel::High);
        assert_eq!(CongestionLevel::from_reduction(40.0), CongestionLevel::Critical);
    }

    #[test]
    fn usage_estimate() {
        let config = CongestionConfig::default();
        assert_eq!(config.estimated_usage(8000), 50.0);
        assert_eq!(config.estimated_usage(4000), 70.0);
        assert_eq!(config.estimated_usage(2000), 80.0);
        assert_eq!(config.estimated_usage(0), 0.0);
    }

    #[test]
    fn peak_hour_scales_capacity() {
        let g = graph(&[("A", "B", 1000), ("B", "C", 333)]);
        let peak = peak_hour(&g, 0.6);
        let caps: Vec<_> = peak.edges().map(|e| e.capacity).collect();
        assert_eq!(caps, vec![600, 199]);
        let times: Vec<_> = peak.edges().map(|e| e.time).collect();
        assert_eq!(times, vec![4, 4]);
    }

    #[test]
    fn uniform_scaling_is_critical() {
        let config = CongestionConfig::default();
        let g = graph(&[("A", "B", 5000), ("B", "C", 5000)]);
        let analysis = analyze(&g, &sid("A"), &sid("C"), 100, &config).unwrap();

        assert_eq!(analysis.normal_flow, 5000);
        assert_eq!(analysis.peak_flow, 3000);
        assert!((analysis.reduction_percent - 40.0).abs() < 1e-9);
        assert_eq!(analysis.level, CongestionLevel::Critical);
        assert!(analysis.recommendations[0].starts_with("Critical"));
    }

    #[test]
    fn zero_normal_flow_means_no_reduction() {
        let config = CongestionConfig::default();
        let g = graph(&[("A", "B", 5000), ("C", "D", 5000)]);
        let analysis = analyze(&g, &sid("A"), &sid("D"), 100, &config).unwrap();
        assert_eq!(analysis.normal_flow, 0);
        assert_eq!(analysis.reduction_percent, 0.0);
        assert_eq!(analysis.level, CongestionLevel::Low);
    }

    #[test]
    fn bottlenecks_sorted_and_limited() {
        let config = CongestionConfig::default();
        let g = graph(&[
            ("A", "B", 3900),
            ("B", "C", 1000),
            ("C", "D", 2000),
            ("D", "E", 500),
            ("E", "F", 3000),
            ("F", "G", 2500),
            ("G", "H", 9000),
        ]);

        let found = find_bottlenecks(&g, &config);
        assert_eq!(found.len(), 5);
        assert_eq!(found[0].origin, sid("D"));
        assert_eq!(found[0].capacity, 500);
        for pair in found.windows(2) {
            assert!(pair[0].usage_percent >= pair[1].usage_percent);
        }
        // 3900 qualifies at 70.5 % usage but ranks sixth
        assert!(found.iter().all(|b| b.origin != sid("A")));
        assert!(found.iter().all(|b| b.origin != sid("G")));
    }

    #[test]
    fn bottleneck_estimated_flow() {
        let config = CongestionConfig::default();
        let g = graph(&[("A", "B", 2000)]);
        let found = find_bottlenecks(&g, &config);
        assert_eq!(found[0].estimated_flow, 1600);
    }

    #[test]
    fn recommendations_mention_bottlenecks() {
        let config = CongestionConfig::default();
        let g = graph(&[("A", "B", 2000)]);
        let analysis = analyze(&g, &sid("A"), &sid("B"), 100, &config).unwrap();
        assert!(analysis.recommendations.iter().any(|l| l == "A -> B (84% usage)"));
    }

    #[test]
    fn unknown_station_is_error() {
        let config = CongestionConfig::default();
        let g = graph(&[("A", "B", 2000)]);
        let err = analyze(&g, &sid("A"), &sid("Q"), 100, &config).unwrap_err();
        assert_eq!(err, PlannerError::UnknownStation(sid("Q")));
    }
}
