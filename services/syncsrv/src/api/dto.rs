//! Request/response payloads for the sync API

use serde::{Deserialize, Serialize};

use crate::store::ConfigRow;

/// Body of the subscription toggle endpoint
#[derive(Debug, Deserialize)]
pub struct UpdateEnabledRequest {
    pub enabled: bool,
}

/// Configuration listing payload
#[derive(Debug, Serialize)]
pub struct ConfigListResponse {
    pub total: usize,
    pub configs: Vec<ConfigRow>,
}

/// Subscription toggle payload
#[derive(Debug, Serialize)]
pub struct UpdateEnabledResponse {
    pub mapping_key: String,
    pub enabled: bool,
}
