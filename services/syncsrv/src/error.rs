//! Error handling for the sync service
//!
//! Only two failures abort a scan outright: the upstream catalog being
//! unreachable and missing ERP credentials. Everything else is recovered
//! per entity or per row and aggregated into the scan report.

use common::AppError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncSrvError>;

#[derive(Error, Debug)]
pub enum SyncSrvError {
    /// Upstream cannot list entity types at all (fatal, scan-level)
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// Required ERP connection credentials are absent (fatal, upfront)
    #[error("Missing precondition: {0}")]
    PreconditionMissing(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Persisted store errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// ERP request errors (probe, metadata, sample)
    #[error("ERP request failed: {0}")]
    ErpError(String),

    /// Requested mapping key has no configuration row
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input/Output operation errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Internal errors
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<sqlx::Error> for SyncSrvError {
    fn from(err: sqlx::Error) -> Self {
        SyncSrvError::DatabaseError(err.to_string())
    }
}

impl From<reqwest::Error> for SyncSrvError {
    fn from(err: reqwest::Error) -> Self {
        SyncSrvError::ErpError(err.to_string())
    }
}

impl From<SyncSrvError> for AppError {
    fn from(err: SyncSrvError) -> Self {
        match &err {
            SyncSrvError::NotFound(_) => AppError::not_found(err.to_string()),
            SyncSrvError::CatalogUnavailable(_) | SyncSrvError::ErpError(_) => {
                AppError::bad_gateway(err.to_string())
            }
            SyncSrvError::PreconditionMissing(_) => AppError::service_unavailable(err.to_string()),
            SyncSrvError::ConfigError(_) => AppError::bad_request(err.to_string()),
            _ => AppError::internal_error(err.to_string()),
        }
    }
}

impl axum::response::IntoResponse for SyncSrvError {
    fn into_response(self) -> axum::response::Response {
        AppError::from(self).into_response()
    }
}
