//! Field-level introspection
//!
//! Produces the column list of one configured entity through a three-tier
//! fallback (schema metadata, sample row, static list) and annotates each
//! field against the persisted field-mapping table. Tier failures are
//! recovered; the only hard failure is an unknown mapping key.

use futures::FutureExt;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use crate::catalog::TRANSACTION_TYPE_FIELD;
use crate::erp::{EqFilter, ErpClient};
use crate::error::{Result, SyncSrvError};
use crate::fallback::{first_non_empty, Tier};
use crate::store::{ConfigRow, ConfigStore};

/// Prefixes marking operator-defined custom fields upstream
pub const CUSTOM_FIELD_PREFIXES: &[&str] = &[
    "custrecord",
    "custbody",
    "custcol",
    "custentity",
    "custitem",
    "custpage",
];

/// Date-shaped string prefix: YYYY-MM-DD or YYYY/MM/DD
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}[-/]\d{2}[-/]\d{2}").expect("static regex"));

/// Hard-coded fallback field lists for well-known entities, used when both
/// the metadata catalog and sampling come up empty. Keyed by lower-cased raw
/// type name.
static STATIC_FIELDS: LazyLock<HashMap<&'static str, &'static [(&'static str, &'static str)]>> =
    LazyLock::new(|| {
        HashMap::from([
            (
                "customer",
                [
                    ("entityid", "text"),
                    ("companyname", "text"),
                    ("email", "text"),
                    ("phone", "text"),
                    ("datecreated", "date"),
                ]
                .as_slice(),
            ),
            (
                "vendor",
                [
                    ("entityid", "text"),
                    ("companyname", "text"),
                    ("email", "text"),
                ]
                .as_slice(),
            ),
            (
                "employee",
                [
                    ("entityid", "text"),
                    ("firstname", "text"),
                    ("lastname", "text"),
                    ("email", "text"),
                ]
                .as_slice(),
            ),
            (
                "subsidiary",
                [("name", "text"), ("country", "text"), ("currency", "text")].as_slice(),
            ),
            (
                "currency",
                [
                    ("name", "text"),
                    ("symbol", "text"),
                    ("exchangerate", "number"),
                ]
                .as_slice(),
            ),
            (
                "inventoryitem",
                [
                    ("itemid", "text"),
                    ("displayname", "text"),
                    ("itemtype", "text"),
                    ("baseprice", "number"),
                ]
                .as_slice(),
            ),
        ])
    });

/// Primitive type inferred from a sampled value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InferredType {
    Unknown,
    Boolean,
    Integer,
    Number,
    Date,
    Text,
}

impl InferredType {
    pub fn as_str(self) -> &'static str {
        match self {
            InferredType::Unknown => "unknown",
            InferredType::Boolean => "boolean",
            InferredType::Integer => "integer",
            InferredType::Number => "number",
            InferredType::Date => "date",
            InferredType::Text => "text",
        }
    }
}

/// Infer the primitive shape of one sampled JSON value. Pure and total.
pub fn infer_type(value: &serde_json::Value) -> InferredType {
    match value {
        serde_json::Value::Null => InferredType::Unknown,
        serde_json::Value::Bool(_) => InferredType::Boolean,
        serde_json::Value::Number(n) => {
            if n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0) {
                InferredType::Integer
            } else {
                InferredType::Number
            }
        }
        serde_json::Value::String(s) => {
            if DATE_PATTERN.is_match(s) {
                InferredType::Date
            } else {
                InferredType::Text
            }
        }
        _ => InferredType::Unknown,
    }
}

/// Whether a field name carries one of the custom-field prefixes
pub fn is_custom_field(name: &str) -> bool {
    let lower = name.to_lowercase();
    CUSTOM_FIELD_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

/// One discovered field before the mapping merge
#[derive(Debug, Clone)]
pub struct DiscoveredField {
    pub name: String,
    pub field_type: String,
    pub label: Option<String>,
    pub is_custom: bool,
}

/// One field in the final report, annotated with mapping coverage
#[derive(Debug, Clone, Serialize)]
pub struct FieldInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub is_custom: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapped_to: Option<String>,
    pub is_mapped: bool,
    pub is_active: bool,
}

/// Field introspection result for one mapping key
#[derive(Debug, Clone, Serialize)]
pub struct FieldReport {
    pub mapping_key: String,
    pub upstream_target: String,
    pub fields: Vec<FieldInfo>,
    pub total: usize,
    pub mapped: usize,
    pub unmapped: usize,
}

/// Field-level analogue of the scan probe
pub struct FieldIntrospector {
    erp: Arc<dyn ErpClient>,
    store: ConfigStore,
}

impl FieldIntrospector {
    pub fn new(erp: Arc<dyn ErpClient>, store: ConfigStore) -> Self {
        Self { erp, store }
    }

    /// Discover the field list of one configured entity and annotate it
    /// against existing field mappings.
    ///
    /// Returns `NotFound` when the mapping key has no configuration row; an
    /// entity whose every discovery tier comes up empty yields an empty
    /// field list, not an error.
    pub async fn introspect(&self, mapping_key: &str) -> Result<FieldReport> {
        let config = self.store.get(mapping_key).await?.ok_or_else(|| {
            SyncSrvError::NotFound(format!("no sync configuration for '{}'", mapping_key))
        })?;

        let discovered = self.discover(&config).await;
        let mappings = self.store.field_mappings(mapping_key).await?;
        let by_field: HashMap<&str, (&str, bool)> = mappings
            .iter()
            .map(|m| (m.upstream_field.as_str(), (m.local_column.as_str(), m.is_active)))
            .collect();

        let fields: Vec<FieldInfo> = discovered
            .into_iter()
            .map(|field| {
                let mapping = by_field.get(field.name.as_str());
                FieldInfo {
                    mapped_to: mapping.map(|(column, _)| (*column).to_string()),
                    is_mapped: mapping.is_some(),
                    is_active: mapping.map(|(_, active)| *active).unwrap_or(false),
                    name: field.name,
                    field_type: field.field_type,
                    label: field.label,
                    is_custom: field.is_custom,
                }
            })
            .collect();

        let total = fields.len();
        let mapped = fields.iter().filter(|f| f.is_mapped).count();

        Ok(FieldReport {
            mapping_key: config.mapping_key,
            upstream_target: config.upstream_target,
            total,
            mapped,
            unmapped: total - mapped,
            fields,
        })
    }

    /// Run the three discovery tiers in priority order
    async fn discover(&self, config: &ConfigRow) -> Vec<DiscoveredField> {
        let metadata = {
            let erp = Arc::clone(&self.erp);
            let entity = config.raw_type_name.clone();
            async move {
                let fields = erp.describe_schema(&entity).await?;
                Ok(fields
                    .into_iter()
                    .filter(|f| !f.name.is_empty())
                    .map(|f| DiscoveredField {
                        is_custom: is_custom_field(&f.name),
                        field_type: f
                            .field_type
                            .unwrap_or_else(|| InferredType::Unknown.as_str().to_string()),
                        label: f.label,
                        name: f.name,
                    })
                    .collect())
            }
            .boxed()
        };

        let sample = {
            let erp = Arc::clone(&self.erp);
            let target = config.upstream_target.clone();
            let filter = config
                .transaction_subtype
                .clone()
                .map(|subtype| EqFilter::new(TRANSACTION_TYPE_FIELD, subtype));
            async move {
                let row = erp.sample_row(&target, filter.as_ref()).await?;
                Ok(row
                    .map(|row| {
                        row.into_iter()
                            .map(|(name, value)| DiscoveredField {
                                field_type: infer_type(&value).as_str().to_string(),
                                label: None,
                                is_custom: is_custom_field(&name),
                                name,
                            })
                            .collect()
                    })
                    .unwrap_or_default())
            }
            .boxed()
        };

        let fallback = {
            let raw_type_name = config.raw_type_name.to_lowercase();
            async move {
                Ok(STATIC_FIELDS
                    .get(raw_type_name.as_str())
                    .map(|fields| {
                        fields
                            .iter()
                            .map(|(name, field_type)| DiscoveredField {
                                name: (*name).to_string(),
                                field_type: (*field_type).to_string(),
                                label: None,
                                is_custom: is_custom_field(name),
                            })
                            .collect()
                    })
                    .unwrap_or_default())
            }
            .boxed()
        };

        first_non_empty(
            &config.mapping_key,
            vec![
                Tier::new("metadata-catalog", metadata),
                Tier::new("sample-row", sample),
                Tier::new("static-fallback", fallback),
            ],
        )
        .await
    }
}
