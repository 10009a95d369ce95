//! Health check endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub upstream: String,
}

/// GET /health - basic status with the configured upstream.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        upstream: format!("{}://{}", state.upstream.scheme, state.upstream.host),
    })
}

/// GET /health/live - liveness probe.
pub async fn live_handler() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready - readiness probe. The gate is stateless; it is ready
/// as soon as it serves.
pub async fn ready_handler() -> StatusCode {
    StatusCode::OK
}
