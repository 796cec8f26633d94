//! Scan trigger and scan status endpoints

use axum::{extract::State, response::Json};
use std::sync::Arc;

use common::SuccessResponse;

use crate::app_state::AppState;
use crate::error::SyncSrvError;
use crate::scanner::ScanReport;
use crate::store::SyncMeta;

/// Trigger a full discovery scan
///
/// Lists the upstream entity catalog, probes every entity and reconciles the
/// configuration store. Partial failures are reported in the response, not
/// as an HTTP error; only an unreachable catalog or missing credentials
/// fail the request outright.
///
/// @route POST /api/sync/scan
/// @status 200 - Scan report with per-entity results
/// @status 502 - Upstream catalog unavailable
/// @status 503 - ERP credentials not configured
#[cfg_attr(feature = "swagger-ui", utoipa::path(
    post,
    path = "/api/sync/scan",
    tag = "sync",
    responses(
        (status = 200, description = "Scan completed, possibly with per-entity errors"),
        (status = 502, description = "Upstream catalog unavailable"),
        (status = 503, description = "ERP credentials not configured")
    )
))]
pub async fn trigger_scan(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse<ScanReport>>, SyncSrvError> {
    // Credential precondition: checked before any scan work starts
    state.config.validate()?;

    let report = state.scan_service().run_scan().await?;
    Ok(Json(SuccessResponse::new(report)))
}

/// Last scan metadata
///
/// @route GET /api/sync/status
/// @status 200 - Sync meta singleton
/// @status 404 - No scan has run yet
#[cfg_attr(feature = "swagger-ui", utoipa::path(
    get,
    path = "/api/sync/status",
    tag = "sync",
    responses(
        (status = 200, description = "Last scan metadata"),
        (status = 404, description = "No scan has run yet")
    )
))]
pub async fn get_sync_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse<SyncMeta>>, SyncSrvError> {
    let meta = state
        .store
        .sync_meta()
        .await?
        .ok_or_else(|| SyncSrvError::NotFound("no scan has run yet".to_string()))?;

    Ok(Json(SuccessResponse::new(meta)))
}
