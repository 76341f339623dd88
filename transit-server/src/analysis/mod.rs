//! Network-wide analyses: max-flow, congestion, spanning tree, coloring.
//!
//! Flow and congestion run per request on a subgraph; the spanning tree and
//! coloring run over the master graph for the startup report.

mod coloring;
mod congestion;
mod flow;
mod mst;
mod report;

pub use coloring::{Coloring, welsh_powell};
pub use congestion::{
    Bottleneck, CongestionAnalysis, CongestionConfig, CongestionLevel, analyze, find_bottlenecks,
    peak_hour,
};
pub use flow::{FlowResult, max_flow};
pub use mst::{MstEdge, MstResult, UnionFind, minimum_spanning_tree};
pub use report::{NetworkReport, SampleFlow};
