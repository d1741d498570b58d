//! HTTP API for route mileage calculation.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use crate::error::MileageError;
use crate::mileage::MileageCalculator;
use crate::models::{CalculationResult, GeoPoint, RouteRequest};

/// Application state shared across handlers
pub struct AppState {
    pub calculator: MileageCalculator,
}

impl AppState {
    pub fn new(calculator: MileageCalculator) -> Self {
        Self { calculator }
    }
}

/// Build the router with CORS (the route form calls from the browser) and
/// request tracing.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/calculate-route", post(calculate_handler))
        .route("/v1/classify", get(classify_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub states: usize,
    /// Boundary dataset fingerprint, when loaded from a file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let store = state.calculator.classifier().store();

    Json(HealthResponse {
        status: "ok".to_string(),
        states: store.len(),
        dataset: store.fingerprint().map(|f| format!("{:016x}", f)),
    })
}

/// Per-state mileage for a route
async fn calculate_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RouteRequest>,
) -> Result<Json<CalculationResult>, ApiError> {
    debug!(
        points = request.route_details.len(),
        total = request.total_distance,
        "Route calculation request"
    );

    let result = tokio::task::spawn_blocking(move || state.calculator.calculate(&request))
        .await
        .map_err(|e| {
            error!("Calculation task failed: {}", e);
            ApiError::Internal(e.to_string())
        })??;

    Ok(Json(result))
}

#[derive(Deserialize)]
struct ClassifyQueryParams {
    lat: f64,
    #[serde(alias = "lng")]
    lon: f64,
}

#[derive(Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub lat: f64,
    pub lon: f64,
    /// Canonical code, or null when outside every state
    pub state: Option<String>,
    pub name: Option<String>,
}

/// Owning state for a single point
async fn classify_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ClassifyQueryParams>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let point = GeoPoint::new(params.lat, params.lon);
    if !point.is_valid() {
        return Err(MileageError::invalid(format!(
            "invalid coordinates (lat={}, lon={})",
            params.lat, params.lon
        ))
        .into());
    }

    let boundary = state.calculator.classifier().lookup(&point);

    Ok(Json(ClassifyResponse {
        lat: params.lat,
        lon: params.lon,
        state: boundary.map(|b| b.code.clone()),
        name: boundary.map(|b| b.name.clone()),
    }))
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
    /// Best-effort breakdown for unreliable results
    #[serde(flatten)]
    pub result: Option<CalculationResult>,
}

/// Errors surfaced by handlers
pub enum ApiError {
    Mileage(MileageError),
    Internal(String),
}

impl From<MileageError> for ApiError {
    fn from(e: MileageError) -> Self {
        ApiError::Mileage(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Mileage(e) => {
                let status = match &e {
                    MileageError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
                    MileageError::Unreliable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                };
                warn!(kind = e.kind(), error = %e, "Route calculation rejected");
                (
                    status,
                    ErrorResponse {
                        error: e.to_string(),
                        kind: e.kind().to_string(),
                        result: e.result().cloned(),
                    },
                )
            }
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: message,
                    kind: "internal".to_string(),
                    result: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}
