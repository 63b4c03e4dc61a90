//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::domain::{Coordinate, LocationId};
use crate::planner::RouteFindRequest;
use crate::store::{AlertRepository, StoreError};
use crate::walking::nearest_within;

use super::dto::*;
use super::state::AppState;

/// Default number of stops returned by the nearby lookup.
const DEFAULT_NEARBY_LIMIT: usize = 5;

/// Upper bound on the nearby lookup.
const MAX_NEARBY_LIMIT: usize = 50;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/route/find", post(find_route))
        .route("/api/stops/nearby", get(nearby_stops))
        .route("/api/alerts", get(active_alerts))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Find a route between two locations.
///
/// A search that finds nothing is still a 200 with `success: false`;
/// only malformed requests are errors.
async fn find_route(
    State(state): State<AppState>,
    Json(req): Json<FindRouteRequest>,
) -> Result<Json<FindRouteResponse>, AppError> {
    let start = parse_location_id(req.start_location_id, "start")?;
    let end = parse_location_id(req.end_location_id, "end")?;

    let request = RouteFindRequest::new(start, end)
        .with_passenger(req.passenger())
        .with_user_points(req.user_start(), req.user_end());

    let outcome = state.finder.find(&request).await;
    Ok(Json(outcome.into()))
}

fn parse_location_id(raw: u32, which: &str) -> Result<LocationId, AppError> {
    LocationId::new(raw).map_err(|_| AppError::BadRequest {
        message: format!("Invalid {which} location id: {raw}"),
    })
}

/// Served stops near a point, nearest first.
async fn nearby_stops(
    State(state): State<AppState>,
    Query(query): Query<NearbyStopsQuery>,
) -> Result<Json<NearbyStopsResponse>, AppError> {
    let coord = Coordinate::new(query.lat, query.lng).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;
    let limit = query.limit.unwrap_or(DEFAULT_NEARBY_LIMIT).min(MAX_NEARBY_LIMIT);

    let graph = state.finder.load_graph().await?;
    let stops = nearest_within(&graph, coord, query.radius, limit);

    Ok(Json(NearbyStopsResponse { stops }))
}

/// Alerts that have not yet expired.
async fn active_alerts(State(state): State<AppState>) -> Result<Json<AlertsResponse>, AppError> {
    let alerts = state.store.active_alerts(Utc::now()).await?;
    Ok(Json(AlertsResponse {
        alerts: alerts.iter().map(AlertResult::from).collect(),
    }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Unavailable { message: String },
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Unavailable {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Unavailable { message } => {
                error!(error = %message, "store read failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Route data is temporarily unavailable.".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
