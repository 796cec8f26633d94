//! Sync order planning
//!
//! Derives the coarse scheduling metadata for one classified entity:
//! priority tier, integer sync order and whether the entity should be
//! subscribed by default. The sync job runner (out of scope here) uses the
//! order to sequence entity synchronization so reference data lands before
//! the documents that point at it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::catalog::EntityCategory;

/// Fixed reason attached to rows that are not enabled by default
pub const DISABLED_REASON: &str = "requires manual verification";

/// Foundational master entities everything else depends on. Explicit sync
/// orders in the reserved 1-10 range; set members without an explicit order
/// fall back to 10.
static FOUNDATIONAL_ORDERS: LazyLock<HashMap<&'static str, i64>> = LazyLock::new(|| {
    HashMap::from([("subsidiary", 1), ("currency", 2), ("inventoryitem", 3)])
});

static FOUNDATIONAL_SET: &[&str] = &["subsidiary", "currency", "inventoryitem", "accountingperiod"];

/// Master entities that matter early but have no hard ordering dependency
static IMPORTANT_SET: &[&str] = &["customer", "vendor", "employee", "account", "salestaxitem"];

const FOUNDATIONAL_DEFAULT_ORDER: i64 = 10;
const IMPORTANT_ORDER: i64 = 11;
const MASTER_ORDER: i64 = 30;
const TRANSACTION_ORDER: i64 = 100;
const CUSTOM_ORDER: i64 = 999;

/// Priority tier, ordinal (stored as its integer value)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPriority {
    Highest = 1,
    High = 2,
    Medium = 3,
    Low = 4,
}

impl SyncPriority {
    pub fn as_i64(self) -> i64 {
        self as i64
    }

    pub fn from_i64(value: i64) -> Self {
        match value {
            1 => SyncPriority::Highest,
            2 => SyncPriority::High,
            4 => SyncPriority::Low,
            _ => SyncPriority::Medium,
        }
    }
}

/// Scheduling metadata for one entity
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub priority: SyncPriority,
    pub sync_order: i64,
    pub enabled_by_default: bool,
    /// Set only when the entity is not enabled by default
    pub disabled_reason: Option<String>,
}

/// Derive the sync plan for one classified entity.
///
/// Rules are evaluated top-down, first match wins. `has_subtype` reports
/// whether classification resolved a transaction subtype; `row_count` is the
/// probe result, if any.
pub fn plan(
    category: EntityCategory,
    raw_type_name: &str,
    has_subtype: bool,
    row_count: Option<i64>,
) -> SyncPlan {
    let lower = raw_type_name.to_lowercase();

    let (priority, sync_order) = if category == EntityCategory::Master
        && FOUNDATIONAL_SET.contains(&lower.as_str())
    {
        let order = FOUNDATIONAL_ORDERS
            .get(lower.as_str())
            .copied()
            .unwrap_or(FOUNDATIONAL_DEFAULT_ORDER);
        (SyncPriority::Highest, order)
    } else if category == EntityCategory::Master && IMPORTANT_SET.contains(&lower.as_str()) {
        (SyncPriority::High, IMPORTANT_ORDER)
    } else if category == EntityCategory::Master {
        (SyncPriority::Medium, MASTER_ORDER)
    } else if category == EntityCategory::Transaction {
        (SyncPriority::Low, TRANSACTION_ORDER)
    } else {
        (SyncPriority::Medium, CUSTOM_ORDER)
    };

    let enabled_by_default = category == EntityCategory::Master
        || (category == EntityCategory::Transaction && has_subtype)
        || row_count.unwrap_or(0) > 0;

    SyncPlan {
        priority,
        sync_order,
        enabled_by_default,
        disabled_reason: if enabled_by_default {
            None
        } else {
            Some(DISABLED_REASON.to_string())
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foundational_masters_get_explicit_orders() {
        let p = plan(EntityCategory::Master, "subsidiary", false, Some(5));
        assert_eq!(p.priority, SyncPriority::Highest);
        assert_eq!(p.sync_order, 1);

        let p = plan(EntityCategory::Master, "currency", false, None);
        assert_eq!(p.sync_order, 2);

        // In the foundational set but without an explicit order
        let p = plan(EntityCategory::Master, "accountingperiod", false, None);
        assert_eq!(p.priority, SyncPriority::Highest);
        assert_eq!(p.sync_order, 10);
    }

    #[test]
    fn test_important_masters() {
        let p = plan(EntityCategory::Master, "customer", false, Some(0));
        assert_eq!(p.priority, SyncPriority::High);
        assert_eq!(p.sync_order, 11);
    }

    #[test]
    fn test_other_masters_default_to_medium() {
        let p = plan(EntityCategory::Master, "department", false, None);
        assert_eq!(p.priority, SyncPriority::Medium);
        assert_eq!(p.sync_order, 30);
    }

    #[test]
    fn test_transactions_sort_last() {
        let p = plan(EntityCategory::Transaction, "salesorder", true, Some(20));
        assert_eq!(p.priority, SyncPriority::Low);
        assert_eq!(p.sync_order, 100);
        assert!(p.enabled_by_default);
    }

    #[test]
    fn test_custom_entities() {
        let p = plan(EntityCategory::Custom, "customfoo", false, Some(0));
        assert_eq!(p.priority, SyncPriority::Medium);
        assert_eq!(p.sync_order, 999);
        assert!(!p.enabled_by_default);
        assert_eq!(p.disabled_reason.as_deref(), Some(DISABLED_REASON));
    }

    #[test]
    fn test_custom_with_rows_is_enabled() {
        let p = plan(EntityCategory::Custom, "customfoo", false, Some(7));
        assert!(p.enabled_by_default);
        assert!(p.disabled_reason.is_none());
    }

    #[test]
    fn test_masters_enabled_regardless_of_counts() {
        let p = plan(EntityCategory::Master, "department", false, Some(0));
        assert!(p.enabled_by_default);
    }

    #[test]
    fn test_priority_ordinal_round_trip() {
        for priority in [
            SyncPriority::Highest,
            SyncPriority::High,
            SyncPriority::Medium,
            SyncPriority::Low,
        ] {
            assert_eq!(SyncPriority::from_i64(priority.as_i64()), priority);
        }
    }
}
