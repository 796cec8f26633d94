//! Field introspection endpoint

use axum::{
    extract::{Path, State},
    response::Json,
};
use std::sync::Arc;

use common::SuccessResponse;

use crate::app_state::AppState;
use crate::error::SyncSrvError;
use crate::fields::FieldReport;

/// Discover the field list of one configured entity
///
/// Runs the metadata / sample-row / static fallback chain upstream and
/// annotates each discovered field with its persisted column mapping. An
/// entity where every tier comes up empty yields an empty list, not an
/// error.
///
/// @route GET /api/sync/config/{mapping_key}/fields
/// @status 200 - Field report with coverage counts
/// @status 404 - Unknown mapping key
#[cfg_attr(feature = "swagger-ui", utoipa::path(
    get,
    path = "/api/sync/config/{mapping_key}/fields",
    tag = "fields",
    params(
        ("mapping_key" = String, Path, description = "Stable pluralized mapping key")
    ),
    responses(
        (status = 200, description = "Discovered fields with mapping coverage"),
        (status = 404, description = "Unknown mapping key")
    )
))]
pub async fn get_fields(
    State(state): State<Arc<AppState>>,
    Path(mapping_key): Path<String>,
) -> Result<Json<SuccessResponse<FieldReport>>, SyncSrvError> {
    let report = state.field_introspector().introspect(&mapping_key).await?;
    Ok(Json(SuccessResponse::new(report)))
}
