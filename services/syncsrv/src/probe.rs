//! Entity availability probing
//!
//! For each classified entity a single count query decides whether the
//! target is actually queryable. Probes never abort the scan: any failure
//! (network, permissions, unknown table, timeout) marks the entity
//! unavailable and captures a truncated error message for the report.

use std::time::Duration;
use tracing::debug;

use crate::catalog::{Classification, TRANSACTION_TYPE_FIELD};
use crate::erp::{EqFilter, ErpClient};

/// Maximum length of a captured probe error message
pub const MAX_ERROR_LEN: usize = 100;

/// Result of probing one entity
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub is_available: bool,
    pub row_count: Option<i64>,
    /// Truncated error message when the probe failed
    pub error: Option<String>,
}

impl ProbeOutcome {
    fn available(row_count: i64) -> Self {
        Self {
            is_available: true,
            row_count: Some(row_count),
            error: None,
        }
    }

    fn unavailable(raw_type_name: &str, message: impl std::fmt::Display) -> Self {
        Self {
            is_available: false,
            row_count: None,
            error: Some(truncate_error(&format!("{}: {}", raw_type_name, message))),
        }
    }
}

/// Probe one classified entity with a count query.
///
/// Transaction-category entities are filtered down to their subtype so the
/// count reflects the entity rather than the whole shared store. A probe
/// that exceeds `timeout` counts as a failure.
pub async fn probe_entity(
    erp: &dyn ErpClient,
    classification: &Classification,
    timeout: Duration,
) -> ProbeOutcome {
    let filter = classification
        .transaction_subtype
        .as_ref()
        .map(|subtype| EqFilter::new(TRANSACTION_TYPE_FIELD, subtype.clone()));

    let probe = erp.count_rows(&classification.target_table, filter.as_ref());

    match tokio::time::timeout(timeout, probe).await {
        Ok(Ok(raw_count)) => {
            let count = parse_count(&raw_count);
            debug!(
                entity = %classification.raw_type_name,
                target = %classification.target_table,
                count,
                "probe succeeded"
            );
            ProbeOutcome::available(count)
        }
        Ok(Err(e)) => {
            debug!(entity = %classification.raw_type_name, "probe failed: {:#}", e);
            ProbeOutcome::unavailable(&classification.raw_type_name, format!("{:#}", e))
        }
        Err(_) => ProbeOutcome::unavailable(
            &classification.raw_type_name,
            format!("probe timed out after {:?}", timeout),
        ),
    }
}

/// Parse the count value from a probe response.
///
/// The platform answers with either a native number or a numeric string; an
/// unparseable value is substituted with 0 but the probe still counts as
/// successful (the query target exists and answered).
pub fn parse_count(value: &serde_json::Value) -> i64 {
    let count = match value {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    count.unwrap_or(0).max(0)
}

/// Truncate an error message for the bounded scan error list
pub fn truncate_error(message: &str) -> String {
    if message.chars().count() <= MAX_ERROR_LEN {
        message.to_string()
    } else {
        message.chars().take(MAX_ERROR_LEN).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::classify;
    use crate::erp::{EntityType, SampleRow, SchemaField};
    use serde_json::json;

    /// ERP client whose count query never answers in time
    struct StalledErp;

    #[async_trait::async_trait]
    impl ErpClient for StalledErp {
        async fn list_entity_types(&self) -> anyhow::Result<Vec<EntityType>> {
            Ok(Vec::new())
        }

        async fn count_rows(
            &self,
            _target: &str,
            _filter: Option<&EqFilter>,
        ) -> anyhow::Result<serde_json::Value> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(json!(1))
        }

        async fn sample_row(
            &self,
            _target: &str,
            _filter: Option<&EqFilter>,
        ) -> anyhow::Result<Option<SampleRow>> {
            Ok(None)
        }

        async fn describe_schema(&self, _entity: &str) -> anyhow::Result<Vec<SchemaField>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failure() {
        let classification = classify("customer");
        let outcome =
            probe_entity(&StalledErp, &classification, Duration::from_millis(20)).await;

        assert!(!outcome.is_available);
        assert_eq!(outcome.row_count, None);
        let error = outcome.error.expect("timeout must record an error");
        assert!(error.contains("timed out"));
        assert!(error.chars().count() <= MAX_ERROR_LEN);
    }

    #[test]
    fn test_parse_native_number() {
        assert_eq!(parse_count(&json!(42)), 42);
        assert_eq!(parse_count(&json!(0)), 0);
    }

    #[test]
    fn test_parse_numeric_string() {
        assert_eq!(parse_count(&json!("17")), 17);
        assert_eq!(parse_count(&json!(" 5 ")), 5);
    }

    #[test]
    fn test_unparseable_substitutes_zero() {
        assert_eq!(parse_count(&json!("lots")), 0);
        assert_eq!(parse_count(&json!(null)), 0);
        assert_eq!(parse_count(&json!({"nested": 1})), 0);
    }

    #[test]
    fn test_negative_counts_clamped() {
        assert_eq!(parse_count(&json!(-3)), 0);
    }

    #[test]
    fn test_error_truncation() {
        let long = "x".repeat(300);
        assert_eq!(truncate_error(&long).len(), MAX_ERROR_LEN);
        assert_eq!(truncate_error("short"), "short");
    }
}
