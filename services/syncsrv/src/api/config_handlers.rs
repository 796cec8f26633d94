//! Sync configuration endpoints

use axum::{
    extract::{Path, State},
    response::Json,
};
use std::sync::Arc;

use common::SuccessResponse;

use crate::api::dto::{ConfigListResponse, UpdateEnabledRequest, UpdateEnabledResponse};
use crate::app_state::AppState;
use crate::error::SyncSrvError;
use crate::store::ConfigRow;

/// List all persisted sync configuration rows in sync order
///
/// @route GET /api/sync/config
#[cfg_attr(feature = "swagger-ui", utoipa::path(
    get,
    path = "/api/sync/config",
    tag = "config",
    responses(
        (status = 200, description = "Configuration rows in sync order")
    )
))]
pub async fn list_configs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse<ConfigListResponse>>, SyncSrvError> {
    let configs = state.store.list().await?;
    Ok(Json(SuccessResponse::new(ConfigListResponse {
        total: configs.len(),
        configs,
    })))
}

/// Fetch one configuration row
///
/// @route GET /api/sync/config/{mapping_key}
/// @status 404 - Unknown mapping key
#[cfg_attr(feature = "swagger-ui", utoipa::path(
    get,
    path = "/api/sync/config/{mapping_key}",
    tag = "config",
    params(
        ("mapping_key" = String, Path, description = "Stable pluralized mapping key")
    ),
    responses(
        (status = 200, description = "Configuration row"),
        (status = 404, description = "Unknown mapping key")
    )
))]
pub async fn get_config(
    State(state): State<Arc<AppState>>,
    Path(mapping_key): Path<String>,
) -> Result<Json<SuccessResponse<ConfigRow>>, SyncSrvError> {
    let config = state.store.get(&mapping_key).await?.ok_or_else(|| {
        SyncSrvError::NotFound(format!("no sync configuration for '{}'", mapping_key))
    })?;

    Ok(Json(SuccessResponse::new(config)))
}

/// Set the operator subscription flag for one mapping key
///
/// The flag set here survives rescans: reconciliation preserves it instead
/// of recomputing the default.
///
/// @route PUT /api/sync/config/{mapping_key}/enabled
/// @status 404 - Unknown mapping key
#[cfg_attr(feature = "swagger-ui", utoipa::path(
    put,
    path = "/api/sync/config/{mapping_key}/enabled",
    tag = "config",
    params(
        ("mapping_key" = String, Path, description = "Stable pluralized mapping key")
    ),
    responses(
        (status = 200, description = "Flag updated"),
        (status = 404, description = "Unknown mapping key")
    )
))]
pub async fn set_enabled(
    State(state): State<Arc<AppState>>,
    Path(mapping_key): Path<String>,
    Json(request): Json<UpdateEnabledRequest>,
) -> Result<Json<SuccessResponse<UpdateEnabledResponse>>, SyncSrvError> {
    let found = state.store.set_enabled(&mapping_key, request.enabled).await?;
    if !found {
        return Err(SyncSrvError::NotFound(format!(
            "no sync configuration for '{}'",
            mapping_key
        )));
    }

    Ok(Json(SuccessResponse::new(UpdateEnabledResponse {
        mapping_key,
        enabled: request.enabled,
    })))
}
