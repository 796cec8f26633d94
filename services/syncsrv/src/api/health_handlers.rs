//! Health check endpoint

use axum::{extract::State, response::Json};
use serde::Serialize;
use std::sync::Arc;

use crate::app_state::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub database: String,
}

/// Service health, including a database ping
///
/// @route GET /health
#[cfg_attr(feature = "swagger-ui", utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health report")
    )
))]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = match state.sqlite_client.ping().await {
        Ok(()) => "ok".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        service: "syncsrv".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
    })
}
