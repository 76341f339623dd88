//! Application state for the web layer.

use std::sync::Arc;

use crate::analysis::NetworkReport;
use crate::network::TransitNetwork;
use crate::planner::PlannerConfig;

/// Shared application state.
///
/// Everything here is read-only after startup, so handlers share it
/// without locking.
#[derive(Clone)]
pub struct AppState {
    /// The ingested network
    pub network: Arc<TransitNetwork>,

    /// Planner configuration
    pub config: Arc<PlannerConfig>,

    /// Report computed at startup
    pub report: Arc<NetworkReport>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(network: TransitNetwork, config: PlannerConfig, report: NetworkReport) -> Self {
        Self {
            network: Arc::new(network),
            config: Arc::new(config),
            report: Arc::new(report),
        }
    }
}
