//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::analysis::{MstResult, NetworkReport};
use crate::domain::{Route, StationId};
use crate::network::{NetworkStats, TransitNetwork};
use crate::planner::{Planner, PlannerError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stats", get(stats))
        .route("/api/report", get(report))
        .route("/api/stations", get(list_stations))
        .route("/api/stations/search", get(search_stations))
        .route("/api/stations/:id", get(get_station))
        .route("/api/routes", get(list_routes))
        .route("/api/lines", get(list_lines))
        .route("/api/lines/station/:id", get(lines_for_station))
        .route("/api/route/shortest", get(shortest_route))
        .route("/api/route/alternatives", get(alternative_routes))
        .route("/api/route/congestion", get(congestion_route))
        .route("/api/route/from", get(routes_from))
        .route("/api/flow", get(flow))
        .route("/api/mst", get(mst))
        .route("/api/coloring", get(coloring))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Live network counts.
async fn stats(State(state): State<AppState>) -> Json<NetworkStats> {
    Json(state.network.stats())
}

/// Report computed at startup.
async fn report(State(state): State<AppState>) -> Json<NetworkReport> {
    Json(NetworkReport::clone(&state.report))
}

/// All stations in id order.
async fn list_stations(State(state): State<AppState>) -> Json<Vec<StationResult>> {
    Json(
        state
            .network
            .station_index()
            .stations()
            .map(StationResult::from_station)
            .collect(),
    )
}

/// A single station by id.
async fn get_station(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StationResult>, AppError> {
    let id = parse_station(&id, "station")?;
    let station = state.network.station(&id).ok_or_else(|| AppError::NotFound {
        message: format!("Station not found: {id}"),
    })?;
    Ok(Json(StationResult::from_station(station)))
}

/// Search stations by name or id.
async fn search_stations(
    State(state): State<AppState>,
    Query(req): Query<StationSearchRequest>,
) -> Json<StationSearchResponse> {
    let limit = req.limit.unwrap_or(10).min(50);
    let stations = state
        .network
        .station_index()
        .search(&req.q, limit)
        .into_iter()
        .map(StationResult::from_station)
        .collect();

    Json(StationSearchResponse { stations })
}

/// All ingested routes.
async fn list_routes(State(state): State<AppState>) -> Json<Vec<Route>> {
    Json(state.network.route_index().routes().to_vec())
}

/// All lines.
async fn list_lines(State(state): State<AppState>) -> Json<Vec<LineResult>> {
    Json(state.network.lines().iter().map(LineResult::from_line).collect())
}

/// Lines calling at a station.
async fn lines_for_station(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<LineResult>>, AppError> {
    let id = parse_station(&id, "station")?;
    if !state.network.contains(&id) {
        return Err(PlannerError::UnknownStation(id).into());
    }
    Ok(Json(
        state
            .network
            .lines_for_station(&id)
            .into_iter()
            .map(LineResult::from_line)
            .collect(),
    ))
}

/// Fastest route between two stations.
async fn shortest_route(
    State(state): State<AppState>,
    Query(req): Query<PairRequest>,
) -> Result<Json<RouteResponse>, AppError> {
    let origin = parse_station(&req.origin, "origin")?;
    let destination = parse_station(&req.destination, "destination")?;

    let response = plan(state, move |planner, network| {
        let route = planner.shortest_route(&origin, &destination)?;
        Ok(RouteResponse::from_plan(network, &origin, &destination, route))
    })
    .await?;

    Ok(Json(response))
}

/// Up to k distinct routes between two stations.
async fn alternative_routes(
    State(state): State<AppState>,
    Query(req): Query<AlternativesRequest>,
) -> Result<Json<AlternativesResponse>, AppError> {
    let origin = parse_station(&req.origin, "origin")?;
    let destination = parse_station(&req.destination, "destination")?;
    let k = req.k.unwrap_or(3);
    if k == 0 {
        return Err(AppError::BadRequest {
            message: "k must be at least 1".to_string(),
        });
    }

    let response = plan(state, move |planner, network| {
        let routes = planner.alternative_routes(&origin, &destination, k)?;
        Ok(AlternativesResponse {
            origin: origin.to_string(),
            destination: destination.to_string(),
            routes: routes
                .iter()
                .map(|r| AlternativeResult::from_alternative(network, r))
                .collect(),
        })
    })
    .await?;

    Ok(Json(response))
}

/// Congestion-aware route, or distances from the origin when no
/// destination is given.
async fn congestion_route(
    State(state): State<AppState>,
    Query(req): Query<CongestionRequest>,
) -> Result<Json<CongestionResponse>, AppError> {
    let origin = parse_station(&req.origin, "origin")?;
    let destination = req
        .destination
        .as_deref()
        .map(|d| parse_station(d, "destination"))
        .transpose()?;
    let factor = req.factor.unwrap_or(1.0);
    if !factor.is_finite() || factor < 0.0 {
        return Err(AppError::BadRequest {
            message: format!("Invalid congestion factor: {factor}"),
        });
    }

    let response = plan(state, move |planner, network| match destination {
        Some(destination) => {
            let route = planner.congestion_path(&origin, &destination, factor)?;
            Ok(CongestionResponse::Route(CongestionRouteResponse::from_route(
                network,
                &origin,
                &destination,
                factor,
                route,
            )))
        }
        None => {
            let tree = planner.congestion_routes(&origin, factor)?;
            Ok(CongestionResponse::Distances(DistancesResponse::from_tree(
                &tree,
            )))
        }
    })
    .await?;

    Ok(Json(response))
}

/// Free-flow distances from one station.
async fn routes_from(
    State(state): State<AppState>,
    Query(req): Query<OriginRequest>,
) -> Result<Json<DistancesResponse>, AppError> {
    let origin = parse_station(&req.origin, "origin")?;

    let response = plan(state, move |planner, _| {
        let tree = planner.bounded_routes(&origin)?;
        Ok(DistancesResponse::from_tree(&tree))
    })
    .await?;

    Ok(Json(response))
}

/// Maximum flow and peak-hour bottlenecks between two stations.
async fn flow(
    State(state): State<AppState>,
    Query(req): Query<PairRequest>,
) -> Result<Json<FlowResponse>, AppError> {
    let origin = parse_station(&req.origin, "origin")?;
    let destination = parse_station(&req.destination, "destination")?;

    let response = plan(state, move |planner, _| {
        let flow = planner.flow(&origin, &destination)?;
        let congestion = planner.bottleneck(&origin, &destination)?;
        Ok(FlowResponse {
            origin: origin.to_string(),
            destination: destination.to_string(),
            flow,
            congestion,
        })
    })
    .await?;

    Ok(Json(response))
}

/// Minimum spanning forest of the network.
async fn mst(State(state): State<AppState>) -> Json<MstResult> {
    Json(state.report.mst.clone())
}

/// Welsh-Powell coloring of the network.
async fn coloring(State(state): State<AppState>) -> Json<ColoringResponse> {
    Json(ColoringResponse::from_coloring(&state.report.coloring))
}

/// Parse a station id from a request parameter.
fn parse_station(raw: &str, field: &str) -> Result<StationId, AppError> {
    StationId::parse(raw).map_err(|_| AppError::BadRequest {
        message: format!("Invalid {field} station id: {raw:?}"),
    })
}

/// Run a planner computation on the blocking pool.
async fn plan<T, F>(state: AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&Planner<'_>, &TransitNetwork) -> Result<T, PlannerError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let network: &TransitNetwork = &state.network;
        let planner = Planner::new(network, &state.config);
        f(&planner, network)
    })
    .await
    .map_err(|e| AppError::Internal {
        message: format!("Planner task failed: {e}"),
    })?
    .map_err(AppError::from)
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<PlannerError> for AppError {
    fn from(e: PlannerError) -> Self {
        match e {
            PlannerError::UnknownStation(_) => AppError::NotFound {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, "{message}");
        } else {
            warn!(%status, "{message}");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
