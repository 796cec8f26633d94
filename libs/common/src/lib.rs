//! Shared infrastructure for the ERP sync services
//!
//! Provides the pieces every service needs:
//! - standard API response envelopes
//! - logging initialization
//! - SQLite connection pooling
//! - Serde default helpers

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub mod api_types;
pub mod logging;
pub mod serde_helpers;

pub use api_types::{ErrorInfo, ErrorResponse, SuccessResponse};

#[cfg(feature = "axum")]
pub use api_types::AppError;
