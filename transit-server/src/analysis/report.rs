//! Network-wide report computed once at startup.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::domain::{StationCategory, StationId};
use crate::network::TransitNetwork;
use crate::planner::{PlannerConfig, PlannerError};

use super::coloring::{Coloring, welsh_powell};
use super::flow::{FlowResult, max_flow};
use super::mst::{MstResult, minimum_spanning_tree};

/// Max-flow between a fixed pair of stations, as a health indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleFlow {
    pub source: StationId,
    pub sink: StationId,
    #[serde(flatten)]
    pub result: FlowResult,
}

/// Summary of the whole network.
///
/// The spanning tree and coloring are kept in full for the endpoints that
/// serve them, but only their totals are part of the serialized summary.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkReport {
    pub generated_at: DateTime<Utc>,
    pub stations: usize,
    pub routes: usize,
    pub lines: usize,
    pub stations_per_category: BTreeMap<StationCategory, usize>,
    pub total_capacity: u64,
    pub mst_edges: usize,
    pub mst_total_time: i64,
    pub color_count: usize,
    pub sample_flow: Option<SampleFlow>,
    #[serde(skip)]
    pub mst: MstResult,
    #[serde(skip)]
    pub coloring: Coloring,
}

impl NetworkReport {
    /// Run the network-wide algorithms over the master graph.
    pub fn compute(network: &TransitNetwork, config: &PlannerConfig) -> Result<Self, PlannerError> {
        let graph = network.graph();

        let mut stations_per_category = BTreeMap::new();
        let mut total_capacity = 0u64;
        for station in network.stations() {
            *stations_per_category.entry(station.category).or_insert(0) += 1;
            total_capacity = total_capacity.saturating_add(station.capacity);
        }

        let mst = minimum_spanning_tree(graph);
        let coloring = welsh_powell(graph);

        let mut ids: Vec<&StationId> = network.stations().iter().map(|s| &s.id).collect();
        ids.sort();
        let sample_flow = match ids.as_slice() {
            [source, sink, ..] => {
                let cap = config.max_flow_cap(graph.node_count());
                let result = max_flow(graph, source, sink, cap)?;
                Some(SampleFlow {
                    source: (*source).clone(),
                    sink: (*sink).clone(),
                    result,
                })
            }
            _ => None,
        };

        let stats = network.stats();
        let report = Self {
            generated_at: Utc::now(),
            stations: stats.stations,
            routes: stats.routes,
            lines: stats.lines,
            stations_per_category,
            total_capacity,
            mst_edges: mst.edges.len(),
            mst_total_time: mst.total_time,
            color_count: coloring.color_count,
            sample_flow,
            mst,
            coloring,
        };

        info!(
            stations = report.stations,
            routes = report.routes,
            mst_edges = report.mst_edges,
            mst_total_time = report.mst_total_time,
            colors = report.color_count,
            sample_flow = report.sample_flow.as_ref().map(|f| f.result.value),
            "Computed network report"
        );

        Ok(report)
    }
}
