//! Scan orchestration and configuration reconciliation
//!
//! One scan: list the upstream entity catalog (fatal if that fails),
//! classify and probe every entity concurrently, derive labels and sync
//! plans, then merge the result into the persisted configuration store
//! without clobbering operator-set subscription flags.
//!
//! Per-entity and per-row failures are recovered locally and aggregated into
//! a bounded error list; the caller always gets a report unless the catalog
//! itself was unreachable.

use futures::StreamExt;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::catalog::{classify, Classification, EntityCategory};
use crate::config::ErpConfig;
use crate::erp::ErpClient;
use crate::error::{Result, SyncSrvError};
use crate::labels::{derive_label, derive_mapping_key};
use crate::planner::{plan, SyncPriority};
use crate::probe::{probe_entity, truncate_error, ProbeOutcome};
use crate::store::{ConfigRow, ConfigStore, CONFLICT_COLUMN};

/// Cap on the number of errors carried in one scan report
pub const MAX_SCAN_ERRORS: usize = 50;

/// Rows per upsert transaction
pub const UPSERT_CHUNK_SIZE: usize = 100;

/// One scanned entity in the report, in upstream discovery order
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub mapping_key: String,
    pub raw_type_name: String,
    pub upstream_target: String,
    pub category: EntityCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_subtype: Option<String>,
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<i64>,
    pub priority: SyncPriority,
    pub sync_order: i64,
    pub is_enabled: bool,
}

/// Aggregate outcome of one scan
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub total_scanned: usize,
    pub valid_tables: usize,
    pub invalid_tables: usize,
    pub created: usize,
    pub updated: usize,
    pub error_count: usize,
    pub errors: Vec<String>,
    pub tables: Vec<TableReport>,
}

/// Scan orchestrator
pub struct ScanService {
    erp: Arc<dyn ErpClient>,
    store: ConfigStore,
    probe_timeout: Duration,
    probe_concurrency: usize,
}

impl ScanService {
    pub fn new(erp: Arc<dyn ErpClient>, store: ConfigStore, config: &ErpConfig) -> Self {
        Self {
            erp,
            store,
            probe_timeout: Duration::from_secs(config.probe_timeout_secs),
            probe_concurrency: config.probe_concurrency.max(1),
        }
    }

    /// Run one full discovery scan and reconcile the configuration store.
    pub async fn run_scan(&self) -> Result<ScanReport> {
        // Step 0: catalog listing is the only fatal remote call
        let entity_types = self
            .erp
            .list_entity_types()
            .await
            .map_err(|e| SyncSrvError::CatalogUnavailable(format!("{:#}", e)))?;

        if entity_types.is_empty() {
            return Err(SyncSrvError::CatalogUnavailable(
                "catalog returned no entity types".to_string(),
            ));
        }

        let total_scanned = entity_types.len();
        info!("Scanning {} upstream entity types", total_scanned);

        // Probe every entity independently, bounded fan-out. `buffered`
        // preserves discovery order in the output regardless of completion
        // order; probes share no mutable state.
        let erp = Arc::clone(&self.erp);
        let timeout = self.probe_timeout;
        let outcomes: Vec<(Classification, ProbeOutcome)> =
            futures::stream::iter(entity_types.into_iter().map(move |entity| {
                let erp = Arc::clone(&erp);
                async move {
                    let classification = classify(&entity.name);
                    let outcome = probe_entity(erp.as_ref(), &classification, timeout).await;
                    (classification, outcome)
                }
            }))
            .buffered(self.probe_concurrency)
            .collect()
            .await;

        let mut errors: Vec<String> = Vec::new();
        for (_, outcome) in &outcomes {
            if let Some(message) = &outcome.error {
                push_error(&mut errors, message.clone());
            }
        }

        // Snapshot operator flags once, before any write
        let enabled_snapshot = self.store.enabled_flags().await?;

        let (candidates, tables) = self.build_candidates(&outcomes, &enabled_snapshot, &mut errors);

        // Merge the candidates in chunks; a failed chunk degrades to per-row
        // upserts so one bad row cannot block its siblings.
        let (created, updated) = self
            .upsert_candidates(&candidates, &enabled_snapshot, &mut errors)
            .await;

        let valid_tables = outcomes.iter().filter(|(_, o)| o.is_available).count();
        let invalid_tables = total_scanned - valid_tables;

        if let Err(e) = self
            .store
            .write_sync_meta(valid_tables as i64, total_scanned as i64)
            .await
        {
            push_error(&mut errors, truncate_error(&format!("sync meta: {}", e)));
        }

        info!(
            "Scan complete: {} valid, {} invalid, {} created, {} updated, {} errors",
            valid_tables,
            invalid_tables,
            created,
            updated,
            errors.len()
        );

        Ok(ScanReport {
            total_scanned,
            valid_tables,
            invalid_tables,
            created,
            updated,
            error_count: errors.len(),
            errors,
            tables,
        })
    }

    /// Derive a candidate ConfigRow per scanned entity, preserving existing
    /// subscription flags and rejecting mapping-key collisions.
    fn build_candidates(
        &self,
        outcomes: &[(Classification, ProbeOutcome)],
        enabled_snapshot: &HashMap<String, bool>,
        errors: &mut Vec<String>,
    ) -> (Vec<ConfigRow>, Vec<TableReport>) {
        let mut seen_keys: HashMap<String, String> = HashMap::new();
        let mut candidates = Vec::with_capacity(outcomes.len());
        let mut tables = Vec::with_capacity(outcomes.len());

        for (classification, outcome) in outcomes {
            let mapping_key = derive_mapping_key(&classification.raw_type_name);

            let sync_plan = plan(
                classification.category,
                &classification.raw_type_name,
                classification.transaction_subtype.is_some(),
                outcome.row_count,
            );

            let is_enabled = enabled_snapshot
                .get(&mapping_key)
                .copied()
                .unwrap_or(sync_plan.enabled_by_default);

            tables.push(TableReport {
                mapping_key: mapping_key.clone(),
                raw_type_name: classification.raw_type_name.clone(),
                upstream_target: classification.target_table.clone(),
                category: classification.category,
                transaction_subtype: classification.transaction_subtype.clone(),
                is_available: outcome.is_available,
                row_count: outcome.row_count,
                priority: sync_plan.priority,
                sync_order: sync_plan.sync_order,
                is_enabled,
            });

            // Regular pluralization can collide across distinct raw names;
            // never silently overwrite the earlier row.
            if let Some(first) = seen_keys.get(&mapping_key) {
                push_error(
                    errors,
                    truncate_error(&format!(
                        "mapping key collision: '{}' and '{}' both derive '{}'",
                        first, classification.raw_type_name, mapping_key
                    )),
                );
                continue;
            }
            seen_keys.insert(mapping_key.clone(), classification.raw_type_name.clone());

            candidates.push(ConfigRow {
                local_table: mapping_key.clone(),
                api_route: format!("/api/sync/data/{}", mapping_key),
                mapping_key,
                raw_type_name: classification.raw_type_name.clone(),
                upstream_target: classification.target_table.clone(),
                label: derive_label(&classification.raw_type_name),
                category: classification.category,
                transaction_subtype: classification.transaction_subtype.clone(),
                priority: sync_plan.priority,
                sync_order: sync_plan.sync_order,
                depends_on: Vec::new(),
                is_enabled,
                disabled_reason: if is_enabled {
                    None
                } else {
                    sync_plan.disabled_reason
                },
                conflict_column: CONFLICT_COLUMN.to_string(),
                row_count: outcome.row_count,
            });
        }

        (candidates, tables)
    }

    /// Upsert candidates in fixed-size chunks with per-row fallback.
    async fn upsert_candidates(
        &self,
        candidates: &[ConfigRow],
        enabled_snapshot: &HashMap<String, bool>,
        errors: &mut Vec<String>,
    ) -> (usize, usize) {
        let mut created = 0usize;
        let mut updated = 0usize;

        for chunk in candidates.chunks(UPSERT_CHUNK_SIZE) {
            match self.store.upsert_chunk(chunk).await {
                Ok(()) => {
                    for row in chunk {
                        if enabled_snapshot.contains_key(&row.mapping_key) {
                            updated += 1;
                        } else {
                            created += 1;
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        "Chunk upsert of {} rows failed, retrying per row: {}",
                        chunk.len(),
                        e
                    );
                    for row in chunk {
                        match self.upsert_single(row).await {
                            Ok(()) => {
                                if enabled_snapshot.contains_key(&row.mapping_key) {
                                    updated += 1;
                                } else {
                                    created += 1;
                                }
                            }
                            Err(e) => {
                                push_error(
                                    errors,
                                    truncate_error(&format!(
                                        "upsert {}: {}",
                                        row.mapping_key, e
                                    )),
                                );
                            }
                        }
                    }
                }
            }
        }

        (created, updated)
    }

    /// Per-row fallback upsert. Re-checks the live subscription flag right
    /// before writing: an operator-enabled row stays enabled even if the
    /// batch default was recomputed differently.
    async fn upsert_single(&self, row: &ConfigRow) -> Result<()> {
        let mut row = row.clone();
        if let Some(true) = self.store.is_enabled(&row.mapping_key).await? {
            row.is_enabled = true;
            row.disabled_reason = None;
        }
        self.store.upsert_row(&row).await
    }
}

/// Append to the bounded scan error list
fn push_error(errors: &mut Vec<String>, message: String) {
    if errors.len() < MAX_SCAN_ERRORS {
        errors.push(message);
    }
}
