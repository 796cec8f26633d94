//! API integration tests

#![allow(clippy::disallowed_methods)] // Integration test - unwrap is acceptable

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

mod common;
use common::{MockErpClient, TestEnv};

/// Helper to make JSON requests
async fn json_request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = if let Some(json) = body {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap()
    } else {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let body: Value = if body_bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, body)
}

#[tokio::test]
async fn test_health_check() {
    let env = TestEnv::create().await.unwrap();
    let app = env.router(Arc::new(MockErpClient::new()));

    let (status, body) = json_request(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "syncsrv");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn test_scan_then_list_configs() {
    let env = TestEnv::create().await.unwrap();
    let erp = Arc::new(
        MockErpClient::new()
            .with_catalog(["subsidiary", "customer"])
            .with_count("subsidiary", json!(2))
            .with_count("customer", json!(40)),
    );
    let app = env.router(erp);

    let (status, body) = json_request(&app, "POST", "/api/sync/scan", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["created"], 2);
    assert_eq!(body["data"]["error_count"], 0);

    let (status, body) = json_request(&app, "GET", "/api/sync/config", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
    // Sorted by sync order: subsidiary is foundational
    assert_eq!(body["data"]["configs"][0]["mapping_key"], "subsidiaries");
    assert_eq!(body["data"]["configs"][1]["mapping_key"], "customers");

    let (status, body) = json_request(&app, "GET", "/api/sync/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["available_count"], 2);
    assert_eq!(body["data"]["total_count"], 2);
}

#[tokio::test]
async fn test_scan_without_credentials_is_rejected() {
    let env = TestEnv::create().await.unwrap();
    let erp = Arc::new(MockErpClient::new().with_catalog(["customer"]));

    // Default config carries no ERP credentials
    let mut config = syncsrv::config::SyncSrvConfig::default();
    config.erp.probe_concurrency = 4;
    let state = syncsrv::app_state::AppState::new(Arc::new(config), env.sqlite_client(), erp);
    let app = syncsrv::routes::create_router(Arc::new(state));

    let (status, body) = json_request(&app, "POST", "/api/sync/scan", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_scan_with_unreachable_catalog_is_bad_gateway() {
    let env = TestEnv::create().await.unwrap();
    let app = env.router(Arc::new(MockErpClient::new().with_failing_catalog()));

    let (status, body) = json_request(&app, "POST", "/api/sync/scan", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_status_before_any_scan_is_not_found() {
    let env = TestEnv::create().await.unwrap();
    let app = env.router(Arc::new(MockErpClient::new()));

    let (status, _) = json_request(&app, "GET", "/api/sync/status", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_single_config() {
    let env = TestEnv::create().await.unwrap();
    let erp = Arc::new(
        MockErpClient::new()
            .with_catalog(["salesorder"])
            .with_count("transaction:SalesOrd", json!(7)),
    );
    let app = env.router(erp);

    json_request(&app, "POST", "/api/sync/scan", None).await;

    let (status, body) = json_request(&app, "GET", "/api/sync/config/salesorders", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["upstream_target"], "transaction");
    assert_eq!(body["data"]["transaction_subtype"], "SalesOrd");
    assert_eq!(body["data"]["api_route"], "/api/sync/data/salesorders");
    assert_eq!(body["data"]["conflict_column"], "remote_id");

    let (status, _) = json_request(&app, "GET", "/api/sync/config/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_set_enabled_roundtrip() {
    let env = TestEnv::create().await.unwrap();
    let erp = Arc::new(
        MockErpClient::new()
            .with_catalog(["customer"])
            .with_count("customer", json!(5)),
    );
    let app = env.router(erp);

    json_request(&app, "POST", "/api/sync/scan", None).await;

    let (status, body) = json_request(
        &app,
        "PUT",
        "/api/sync/config/customers/enabled",
        Some(json!({"enabled": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["enabled"], false);

    let (_, body) = json_request(&app, "GET", "/api/sync/config/customers", None).await;
    assert_eq!(body["data"]["is_enabled"], false);

    // Unknown mapping keys are rejected, not created
    let (status, _) = json_request(
        &app,
        "PUT",
        "/api/sync/config/widgets/enabled",
        Some(json!({"enabled": true})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_fields_endpoint() {
    let env = TestEnv::create().await.unwrap();
    let erp = Arc::new(
        MockErpClient::new()
            .with_catalog(["customer"])
            .with_count("customer", json!(5))
            .with_sample("customer", json!({"entityid": "C-1", "balance": 12.5})),
    );
    let app = env.router(erp);

    json_request(&app, "POST", "/api/sync/scan", None).await;

    let (status, body) =
        json_request(&app, "GET", "/api/sync/config/customers/fields", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["mapping_key"], "customers");
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["mapped"], 0);

    let (status, _) = json_request(&app, "GET", "/api/sync/config/ghosts/fields", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
