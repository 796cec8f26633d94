//! Application state shared across API handlers

use std::sync::Arc;

use common::sqlite::SqliteClient;

use crate::config::SyncSrvConfig;
use crate::erp::ErpClient;
use crate::fields::FieldIntrospector;
use crate::scanner::ScanService;
use crate::store::ConfigStore;

/// Shared resources for the HTTP surface
pub struct AppState {
    pub config: Arc<SyncSrvConfig>,
    pub store: ConfigStore,
    pub erp: Arc<dyn ErpClient>,
    /// SQLite client kept for health checks
    pub sqlite_client: SqliteClient,
}

impl AppState {
    pub fn new(
        config: Arc<SyncSrvConfig>,
        sqlite_client: SqliteClient,
        erp: Arc<dyn ErpClient>,
    ) -> Self {
        Self {
            store: ConfigStore::new(sqlite_client.pool().clone()),
            config,
            erp,
            sqlite_client,
        }
    }

    /// Build a scan orchestrator over the shared resources
    pub fn scan_service(&self) -> ScanService {
        ScanService::new(Arc::clone(&self.erp), self.store.clone(), &self.config.erp)
    }

    /// Build a field introspector over the shared resources
    pub fn field_introspector(&self) -> FieldIntrospector {
        FieldIntrospector::new(Arc::clone(&self.erp), self.store.clone())
    }
}
