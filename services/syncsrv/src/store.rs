//! Persisted sync-configuration store
//!
//! Three tables on SQLite: `sync_config` (one row per mapping key, the
//! durable output of a scan), `field_mappings` (per-field column mappings,
//! owned by a separate configuration surface and only read here) and the
//! `sync_meta` singleton describing the last scan.
//!
//! All writes go through upsert-by-unique-key; the store never deletes
//! configuration rows. Repeated scans are idempotent because identity is the
//! mapping key, and the store relies on SQLite's atomic
//! insert-or-update-on-conflict rather than application-level locking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;

use crate::catalog::EntityCategory;
use crate::error::{Result, SyncSrvError};
use crate::planner::SyncPriority;

/// Fixed conflict column convention for local data tables
pub const CONFLICT_COLUMN: &str = "remote_id";

/// One durable configuration row, keyed by mapping key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigRow {
    /// Unique, stable across rescans for the same raw type name
    pub mapping_key: String,
    /// Upstream identifier as discovered
    pub raw_type_name: String,
    /// Query target upstream (shared transaction store for documents)
    pub upstream_target: String,
    /// Local table the sync jobs write into
    pub local_table: String,
    pub label: String,
    pub category: EntityCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_subtype: Option<String>,
    pub priority: SyncPriority,
    pub sync_order: i64,
    /// Mapping keys this entity depends on; placeholder, currently always empty
    pub depends_on: Vec<String>,
    /// Operator-owned subscription flag; must survive rescans
    pub is_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled_reason: Option<String>,
    pub api_route: String,
    pub conflict_column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<i64>,
}

/// One persisted field mapping, unique per (mapping_key, upstream_field)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMappingRow {
    pub mapping_key: String,
    pub upstream_field: String,
    pub local_column: String,
    pub is_active: bool,
}

/// Singleton scan metadata, overwritten wholesale on every scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncMeta {
    pub last_scan_at: DateTime<Utc>,
    pub available_count: i64,
    pub total_count: i64,
}

/// Repository over the configuration tables
#[derive(Clone)]
pub struct ConfigStore {
    pool: SqlitePool,
}

impl ConfigStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create tables if they do not exist
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sync_config (
                mapping_key TEXT PRIMARY KEY,
                raw_type_name TEXT NOT NULL,
                upstream_target TEXT NOT NULL,
                local_table TEXT NOT NULL,
                label TEXT NOT NULL,
                category TEXT NOT NULL,
                transaction_subtype TEXT,
                priority INTEGER NOT NULL,
                sync_order INTEGER NOT NULL,
                depends_on TEXT NOT NULL DEFAULT '[]',
                is_enabled INTEGER NOT NULL DEFAULT 0,
                disabled_reason TEXT,
                api_route TEXT NOT NULL,
                conflict_column TEXT NOT NULL,
                row_count INTEGER,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS field_mappings (
                mapping_key TEXT NOT NULL,
                upstream_field TEXT NOT NULL,
                local_column TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                PRIMARY KEY (mapping_key, upstream_field)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sync_meta (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                last_scan_at TEXT NOT NULL,
                available_count INTEGER NOT NULL,
                total_count INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ========================================================================
    // sync_config
    // ========================================================================

    /// Snapshot the subscription flag of every existing row.
    ///
    /// Taken once, read-only, before any concurrent scan work so rescans
    /// cannot clobber operator-set flags.
    pub async fn enabled_flags(&self) -> Result<HashMap<String, bool>> {
        let rows = sqlx::query("SELECT mapping_key, is_enabled FROM sync_config")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get::<String, _>("mapping_key"), row.get::<bool, _>("is_enabled")))
            .collect())
    }

    /// Current subscription flag for one mapping key, if the row exists
    pub async fn is_enabled(&self, mapping_key: &str) -> Result<Option<bool>> {
        let row = sqlx::query("SELECT is_enabled FROM sync_config WHERE mapping_key = ?")
            .bind(mapping_key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get::<bool, _>("is_enabled")))
    }

    /// Fetch one configuration row
    pub async fn get(&self, mapping_key: &str) -> Result<Option<ConfigRow>> {
        let row = sqlx::query("SELECT * FROM sync_config WHERE mapping_key = ?")
            .bind(mapping_key)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_config(&r)).transpose()
    }

    /// List all configuration rows in sync order
    pub async fn list(&self) -> Result<Vec<ConfigRow>> {
        let rows = sqlx::query("SELECT * FROM sync_config ORDER BY sync_order, mapping_key")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_config).collect()
    }

    /// Set the operator subscription flag. Returns false when no row exists.
    pub async fn set_enabled(&self, mapping_key: &str, enabled: bool) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE sync_config SET is_enabled = ?, updated_at = CURRENT_TIMESTAMP \
             WHERE mapping_key = ?",
        )
        .bind(enabled)
        .bind(mapping_key)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Upsert a chunk of rows in one transaction.
    ///
    /// Either the whole chunk lands or none of it does; the reconciler falls
    /// back to per-row upserts when a chunk fails.
    pub async fn upsert_chunk(&self, rows: &[ConfigRow]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for row in rows {
            bind_upsert(row).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Upsert a single row
    pub async fn upsert_row(&self, row: &ConfigRow) -> Result<()> {
        bind_upsert(row).execute(&self.pool).await?;
        Ok(())
    }

    // ========================================================================
    // field_mappings
    // ========================================================================

    /// All field mappings for one mapping key
    pub async fn field_mappings(&self, mapping_key: &str) -> Result<Vec<FieldMappingRow>> {
        let rows = sqlx::query(
            "SELECT mapping_key, upstream_field, local_column, is_active \
             FROM field_mappings WHERE mapping_key = ?",
        )
        .bind(mapping_key)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| FieldMappingRow {
                mapping_key: row.get("mapping_key"),
                upstream_field: row.get("upstream_field"),
                local_column: row.get("local_column"),
                is_active: row.get("is_active"),
            })
            .collect())
    }

    /// Upsert one field mapping, keyed by (mapping_key, upstream_field)
    pub async fn upsert_field_mapping(&self, mapping: &FieldMappingRow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO field_mappings (mapping_key, upstream_field, local_column, is_active)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(mapping_key, upstream_field) DO UPDATE SET
                local_column = excluded.local_column,
                is_active = excluded.is_active
            "#,
        )
        .bind(&mapping.mapping_key)
        .bind(&mapping.upstream_field)
        .bind(&mapping.local_column)
        .bind(mapping.is_active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // ========================================================================
    // sync_meta
    // ========================================================================

    /// Overwrite the scan metadata singleton
    pub async fn write_sync_meta(&self, available_count: i64, total_count: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sync_meta (id, last_scan_at, available_count, total_count)
            VALUES (1, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                last_scan_at = excluded.last_scan_at,
                available_count = excluded.available_count,
                total_count = excluded.total_count
            "#,
        )
        .bind(Utc::now().to_rfc3339())
        .bind(available_count)
        .bind(total_count)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Last scan metadata, if a scan ever ran
    pub async fn sync_meta(&self) -> Result<Option<SyncMeta>> {
        let row = sqlx::query(
            "SELECT last_scan_at, available_count, total_count FROM sync_meta WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| {
            let raw: String = r.get("last_scan_at");
            let last_scan_at = DateTime::parse_from_rfc3339(&raw)
                .map_err(|e| SyncSrvError::DatabaseError(format!("bad last_scan_at: {}", e)))?
                .with_timezone(&Utc);
            Ok(SyncMeta {
                last_scan_at,
                available_count: r.get("available_count"),
                total_count: r.get("total_count"),
            })
        })
        .transpose()
    }
}

fn bind_upsert(row: &ConfigRow) -> sqlx::query::Query<'_, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'_>> {
    sqlx::query(
        r#"
        INSERT INTO sync_config (
            mapping_key, raw_type_name, upstream_target, local_table, label,
            category, transaction_subtype, priority, sync_order, depends_on,
            is_enabled, disabled_reason, api_route, conflict_column, row_count
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(mapping_key) DO UPDATE SET
            raw_type_name = excluded.raw_type_name,
            upstream_target = excluded.upstream_target,
            local_table = excluded.local_table,
            label = excluded.label,
            category = excluded.category,
            transaction_subtype = excluded.transaction_subtype,
            priority = excluded.priority,
            sync_order = excluded.sync_order,
            depends_on = excluded.depends_on,
            is_enabled = excluded.is_enabled,
            disabled_reason = excluded.disabled_reason,
            api_route = excluded.api_route,
            conflict_column = excluded.conflict_column,
            row_count = excluded.row_count,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(&row.mapping_key)
    .bind(&row.raw_type_name)
    .bind(&row.upstream_target)
    .bind(&row.local_table)
    .bind(&row.label)
    .bind(row.category.as_str())
    .bind(&row.transaction_subtype)
    .bind(row.priority.as_i64())
    .bind(row.sync_order)
    .bind(serde_json::to_string(&row.depends_on).unwrap_or_else(|_| "[]".to_string()))
    .bind(row.is_enabled)
    .bind(&row.disabled_reason)
    .bind(&row.api_route)
    .bind(&row.conflict_column)
    .bind(row.row_count)
}

fn row_to_config(row: &sqlx::sqlite::SqliteRow) -> Result<ConfigRow> {
    let category: String = row.get("category");
    let category = category
        .parse::<EntityCategory>()
        .map_err(SyncSrvError::DatabaseError)?;

    let depends_on: String = row.get("depends_on");
    let depends_on: Vec<String> = serde_json::from_str(&depends_on)
        .map_err(|e| SyncSrvError::DatabaseError(format!("bad depends_on: {}", e)))?;

    Ok(ConfigRow {
        mapping_key: row.get("mapping_key"),
        raw_type_name: row.get("raw_type_name"),
        upstream_target: row.get("upstream_target"),
        local_table: row.get("local_table"),
        label: row.get("label"),
        category,
        transaction_subtype: row.get("transaction_subtype"),
        priority: SyncPriority::from_i64(row.get("priority")),
        sync_order: row.get("sync_order"),
        depends_on,
        is_enabled: row.get("is_enabled"),
        disabled_reason: row.get("disabled_reason"),
        api_route: row.get("api_route"),
        conflict_column: row.get("conflict_column"),
        row_count: row.get("row_count"),
    })
}
