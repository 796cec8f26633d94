//! Shared test scaffolding
//!
//! Provides a temp-database environment and a configurable mock ERP client.

#![allow(dead_code)] // Not every test file uses every helper
#![allow(clippy::disallowed_methods)] // Integration test - unwrap is acceptable

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tempfile::TempDir;

use common::sqlite::SqliteClient;
use syncsrv::app_state::AppState;
use syncsrv::config::{ErpConfig, SyncSrvConfig};
use syncsrv::erp::{EntityType, EqFilter, ErpClient, SampleRow, SchemaField};
use syncsrv::fields::FieldIntrospector;
use syncsrv::routes::create_router;
use syncsrv::scanner::ScanService;
use syncsrv::store::ConfigStore;

/// Test environment with a temporary SQLite configuration store
pub struct TestEnv {
    pub pool: SqlitePool,
    pub store: ConfigStore,
    pub temp_dir: TempDir,
}

impl TestEnv {
    pub async fn create() -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let db_path = temp_dir.path().join("syncsrv_test.db");
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path.display())).await?;

        let store = ConfigStore::new(pool.clone());
        store.init_schema().await?;

        Ok(Self {
            pool,
            store,
            temp_dir,
        })
    }

    /// Scan orchestrator over this environment and the given mock
    pub fn scan_service(&self, erp: Arc<MockErpClient>) -> ScanService {
        ScanService::new(erp, self.store.clone(), &test_erp_config())
    }

    /// Field introspector over this environment and the given mock
    pub fn field_introspector(&self, erp: Arc<MockErpClient>) -> FieldIntrospector {
        FieldIntrospector::new(erp, self.store.clone())
    }

    /// SQLite handle over this environment's pool
    pub fn sqlite_client(&self) -> SqliteClient {
        SqliteClient::from_pool(self.pool.clone())
    }

    /// Full service router over this environment, for endpoint-level tests
    pub fn router(&self, erp: Arc<MockErpClient>) -> axum::Router {
        let mut config = SyncSrvConfig::default();
        config.erp = test_erp_config();

        let state = AppState::new(Arc::new(config), self.sqlite_client(), erp);
        create_router(Arc::new(state))
    }
}

/// ERP settings used by tests: short timeout, modest fan-out
pub fn test_erp_config() -> ErpConfig {
    ErpConfig {
        base_url: "https://test.example.com".to_string(),
        account: "TEST".to_string(),
        token: "test-token".to_string(),
        probe_concurrency: 4,
        probe_timeout_secs: 2,
    }
}

/// Configurable in-memory ERP client
///
/// Count and sample lookups are keyed by the query target, or by
/// "target:subtype" when an equality filter applies.
#[derive(Default)]
pub struct MockErpClient {
    catalog: Vec<String>,
    fail_catalog: bool,
    counts: HashMap<String, serde_json::Value>,
    failing_counts: HashSet<String>,
    schemas: HashMap<String, Vec<SchemaField>>,
    samples: HashMap<String, SampleRow>,
}

impl MockErpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.catalog = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_failing_catalog(mut self) -> Self {
        self.fail_catalog = true;
        self
    }

    pub fn with_count(mut self, key: impl Into<String>, count: serde_json::Value) -> Self {
        self.counts.insert(key.into(), count);
        self
    }

    pub fn with_failing_count(mut self, key: impl Into<String>) -> Self {
        self.failing_counts.insert(key.into());
        self
    }

    pub fn with_schema(mut self, entity: impl Into<String>, fields: Vec<SchemaField>) -> Self {
        self.schemas.insert(entity.into(), fields);
        self
    }

    pub fn with_sample(mut self, key: impl Into<String>, row: serde_json::Value) -> Self {
        let serde_json::Value::Object(map) = row else {
            panic!("sample must be a JSON object");
        };
        self.samples.insert(key.into(), map);
        self
    }

    fn probe_key(target: &str, filter: Option<&EqFilter>) -> String {
        match filter {
            Some(f) => format!("{}:{}", target, f.equals),
            None => target.to_string(),
        }
    }
}

#[async_trait]
impl ErpClient for MockErpClient {
    async fn list_entity_types(&self) -> Result<Vec<EntityType>> {
        if self.fail_catalog {
            return Err(anyhow!("metadata catalog unreachable"));
        }
        Ok(self
            .catalog
            .iter()
            .map(|name| EntityType { name: name.clone() })
            .collect())
    }

    async fn count_rows(
        &self,
        target: &str,
        filter: Option<&EqFilter>,
    ) -> Result<serde_json::Value> {
        let key = Self::probe_key(target, filter);
        if self.failing_counts.contains(&key) {
            return Err(anyhow!("table '{}' does not exist or is not queryable", key));
        }
        Ok(self.counts.get(&key).cloned().unwrap_or(serde_json::json!(0)))
    }

    async fn sample_row(
        &self,
        target: &str,
        filter: Option<&EqFilter>,
    ) -> Result<Option<SampleRow>> {
        let key = Self::probe_key(target, filter);
        Ok(self.samples.get(&key).cloned())
    }

    async fn describe_schema(&self, entity: &str) -> Result<Vec<SchemaField>> {
        match self.schemas.get(entity) {
            Some(fields) => Ok(fields.clone()),
            None => Err(anyhow!("no schema description for '{}'", entity)),
        }
    }
}

/// Shorthand for a schema field in mock setups
pub fn schema_field(name: &str, field_type: Option<&str>, label: Option<&str>) -> SchemaField {
    SchemaField {
        name: name.to_string(),
        field_type: field_type.map(str::to_string),
        label: label.map(str::to_string),
    }
}
