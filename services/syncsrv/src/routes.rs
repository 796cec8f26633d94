//! API route configuration
//!
//! Central route definition for all sync service endpoints

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

#[cfg(feature = "swagger-ui")]
use utoipa::OpenApi;

use crate::api::config_handlers::{get_config, list_configs, set_enabled};
use crate::api::field_handlers::get_fields;
use crate::api::health_handlers::health_check;
use crate::api::scan_handlers::{get_sync_status, trigger_scan};
use crate::app_state::AppState;

// OpenAPI documentation - only compiled when swagger-ui feature is enabled
#[cfg(feature = "swagger-ui")]
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::health_handlers::health_check,
        crate::api::scan_handlers::trigger_scan,
        crate::api::scan_handlers::get_sync_status,
        crate::api::config_handlers::list_configs,
        crate::api::config_handlers::get_config,
        crate::api::config_handlers::set_enabled,
        crate::api::field_handlers::get_fields
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "sync", description = "Discovery scans"),
        (name = "config", description = "Sync configuration rows"),
        (name = "fields", description = "Field introspection")
    )
)]
struct ApiDoc;

/// Build the service router
pub fn create_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/api/sync/scan", post(trigger_scan))
        .route("/api/sync/status", get(get_sync_status))
        .route("/api/sync/config", get(list_configs))
        .route("/api/sync/config/{mapping_key}", get(get_config))
        .route("/api/sync/config/{mapping_key}/enabled", put(set_enabled))
        .route("/api/sync/config/{mapping_key}/fields", get(get_fields));

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router.with_state(state)
}
