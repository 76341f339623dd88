use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use transit_server::analysis::NetworkReport;
use transit_server::loader;
use transit_server::planner::PlannerConfig;
use transit_server::web::{AppState, create_router};

/// Directory holding the CSV data when `TRANSIT_DATA_DIR` is unset.
const DEFAULT_DATA_DIR: &str = "data";

/// Listen address when `TRANSIT_ADDR` is unset.
const DEFAULT_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let data_dir = PathBuf::from(
        std::env::var("TRANSIT_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string()),
    );
    let addr_raw = std::env::var("TRANSIT_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let addr: SocketAddr = match addr_raw.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(addr = %addr_raw, "Invalid TRANSIT_ADDR: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Load the network (fail fast if the data is unusable)
    let network = match loader::load_dir(&data_dir) {
        Ok(network) => network,
        Err(e) => {
            error!(dir = %data_dir.display(), "Failed to load network: {e}");
            return ExitCode::FAILURE;
        }
    };

    let config = PlannerConfig::default();
    let report = match NetworkReport::compute(&network, &config) {
        Ok(report) => report,
        Err(e) => {
            error!("Failed to compute network report: {e}");
            return ExitCode::FAILURE;
        }
    };

    let state = AppState::new(network, config, report);
    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, "Failed to bind: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(%addr, "Transit server listening");
    info!("Endpoints: /health, /api/stats, /api/report, /api/stations, /api/route/*, /api/flow, /api/mst, /api/coloring");

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
