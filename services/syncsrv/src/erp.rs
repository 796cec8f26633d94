//! Upstream ERP client boundary
//!
//! The scan and field-introspection logic only ever talks to the ERP
//! platform through the [`ErpClient`] trait: list the entity catalog, run a
//! count probe, fetch a sample row, or ask for a schema description. The
//! production implementation is [`http_client::HttpErpClient`]; tests plug
//! in mocks.

pub mod http_client;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use http_client::HttpErpClient;

/// One entity type as reported by the upstream metadata catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityType {
    pub name: String,
}

/// Equality filter applied to count/sample queries
///
/// Used to scope shared physical stores, e.g. `type = 'SalesOrd'` on the
/// transaction table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqFilter {
    pub field: String,
    pub equals: String,
}

impl EqFilter {
    pub fn new(field: impl Into<String>, equals: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            equals: equals.into(),
        }
    }
}

/// One field from a schema description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub label: Option<String>,
}

/// A single sampled record, keys and raw JSON values
pub type SampleRow = serde_json::Map<String, serde_json::Value>;

/// Remote operations against the upstream ERP platform.
///
/// Every method is a blocking remote call; callers are responsible for
/// timeouts and for deciding which failures are fatal.
#[async_trait]
pub trait ErpClient: Send + Sync {
    /// List all entity types known to the metadata catalog.
    async fn list_entity_types(&self) -> Result<Vec<EntityType>>;

    /// Run a single-row aggregate count over `target`, optionally filtered.
    ///
    /// Returns the raw count value as reported upstream; the platform is
    /// known to answer with either a native number or a numeric string, so
    /// parsing leniency is left to the caller.
    async fn count_rows(&self, target: &str, filter: Option<&EqFilter>)
        -> Result<serde_json::Value>;

    /// Fetch at most one row from `target`. `None` means the query succeeded
    /// but the table is empty.
    async fn sample_row(&self, target: &str, filter: Option<&EqFilter>)
        -> Result<Option<SampleRow>>;

    /// Request a schema description for one entity type.
    async fn describe_schema(&self, entity: &str) -> Result<Vec<SchemaField>>;
}
