//! Entity classification
//!
//! Maps a raw upstream entity-type name to its query target and category.
//! Business documents all live in one shared transaction store upstream and
//! are told apart by a subtype code; reference data maps to a dedicated
//! store per type; anything unknown is treated as a custom entity and
//! validated later by probing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

/// The shared physical store for all transaction-category entities
pub const TRANSACTION_TABLE: &str = "transaction";

/// Column that discriminates transaction subtypes in the shared store
pub const TRANSACTION_TYPE_FIELD: &str = "type";

/// Raw transaction type -> subtype code in the shared transaction store.
/// Hand-maintained; extend the table, not the algorithm.
static TRANSACTION_TYPES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("salesorder", "SalesOrd"),
        ("purchaseorder", "PurchOrd"),
        ("invoice", "CustInvc"),
        ("vendorbill", "VendBill"),
        ("creditmemo", "CustCred"),
        ("itemfulfillment", "ItemShip"),
        ("itemreceipt", "ItemRcpt"),
    ])
});

/// Raw master entity -> canonical query target. Most map to themselves;
/// inventoryitem is the irregular one, queried through the generic item store.
static MASTER_TYPES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("customer", "customer"),
        ("vendor", "vendor"),
        ("employee", "employee"),
        ("subsidiary", "subsidiary"),
        ("currency", "currency"),
        ("department", "department"),
        ("location", "location"),
        ("classification", "classification"),
        ("account", "account"),
        ("salestaxitem", "salestaxitem"),
        ("accountingperiod", "accountingperiod"),
        ("inventoryitem", "item"),
    ])
});

/// Entity category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityCategory {
    /// Reference data (customers, currencies, org units...)
    Master,
    /// Business documents sharing one physical store
    Transaction,
    /// Unclassified; validity unknown until probed
    Custom,
}

impl EntityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityCategory::Master => "master",
            EntityCategory::Transaction => "transaction",
            EntityCategory::Custom => "custom",
        }
    }
}

impl std::str::FromStr for EntityCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "master" => Ok(EntityCategory::Master),
            "transaction" => Ok(EntityCategory::Transaction),
            "custom" => Ok(EntityCategory::Custom),
            other => Err(format!("unknown entity category: {}", other)),
        }
    }
}

/// Classification result for one raw entity-type name
#[derive(Debug, Clone)]
pub struct Classification {
    /// Upstream identifier as discovered, immutable key of the scan
    pub raw_type_name: String,
    /// Name to use in probe/count queries; may differ from the raw name
    pub target_table: String,
    pub category: EntityCategory,
    /// Present only for transaction-category entities
    pub transaction_subtype: Option<String>,
}

/// Classify a raw entity-type name. Total: unknown input is Custom with the
/// name passed through unchanged. Lookup is case-insensitive.
pub fn classify(raw_type_name: &str) -> Classification {
    let lookup = raw_type_name.to_lowercase();

    if let Some(subtype) = TRANSACTION_TYPES.get(lookup.as_str()) {
        return Classification {
            raw_type_name: raw_type_name.to_string(),
            target_table: TRANSACTION_TABLE.to_string(),
            category: EntityCategory::Transaction,
            transaction_subtype: Some((*subtype).to_string()),
        };
    }

    if let Some(target) = MASTER_TYPES.get(lookup.as_str()) {
        return Classification {
            raw_type_name: raw_type_name.to_string(),
            target_table: (*target).to_string(),
            category: EntityCategory::Master,
            transaction_subtype: None,
        };
    }

    Classification {
        raw_type_name: raw_type_name.to_string(),
        target_table: raw_type_name.to_string(),
        category: EntityCategory::Custom,
        transaction_subtype: None,
    }
}
