//! Label and mapping-key derivation
//!
//! Two pure functions over a raw entity-type name: a human-readable label
//! for the dashboard, and the pluralized mapping key that identifies the
//! configuration row (and the local table) across rescans.
//!
//! The regular pluralization rules can in principle produce the same key for
//! two distinct raw names; callers must treat such collisions as errors
//! rather than silently overwriting (see the scan reconciler).

use std::collections::HashMap;
use std::sync::LazyLock;

/// Display labels for well-known entity types
static LABELS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("customer", "Customer"),
        ("vendor", "Vendor"),
        ("employee", "Employee"),
        ("subsidiary", "Subsidiary"),
        ("currency", "Currency"),
        ("department", "Department"),
        ("location", "Location"),
        ("classification", "Class"),
        ("account", "Account"),
        ("salestaxitem", "Tax Code"),
        ("accountingperiod", "Accounting Period"),
        ("inventoryitem", "Inventory Item"),
        ("salesorder", "Sales Order"),
        ("purchaseorder", "Purchase Order"),
        ("invoice", "Invoice"),
        ("vendorbill", "Vendor Bill"),
        ("creditmemo", "Credit Memo"),
        ("itemfulfillment", "Item Fulfillment"),
        ("itemreceipt", "Item Receipt"),
    ])
});

/// Irregular plural overrides, keyed by lower-cased raw name
static IRREGULAR_PLURALS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("currency", "currencies"),
        ("classification", "classifications"),
        ("inventoryitem", "items"),
        ("salestaxitem", "salestaxitems"),
    ])
});

/// Derive a human label for a raw entity-type name.
///
/// Static lookup first; on miss, title-case the name split on case
/// boundaries. Never empty: falls back to the raw name itself.
pub fn derive_label(raw_type_name: &str) -> String {
    if let Some(label) = LABELS.get(raw_type_name.to_lowercase().as_str()) {
        return (*label).to_string();
    }

    let tokens = split_case_boundaries(raw_type_name);
    if tokens.is_empty() {
        return raw_type_name.to_string();
    }

    tokens
        .iter()
        .map(|token| capitalize(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Derive the pluralized mapping key for a raw entity-type name.
///
/// Irregular override first (looked up case-insensitively); otherwise
/// regular English rules applied to the name as given, in order: trailing
/// "y" -> "ies"; trailing "s"/"x"/"ch" -> append "es"; else append "s".
pub fn derive_mapping_key(raw_type_name: &str) -> String {
    if let Some(plural) = IRREGULAR_PLURALS.get(raw_type_name.to_lowercase().as_str()) {
        return (*plural).to_string();
    }

    if let Some(stem) = raw_type_name.strip_suffix('y') {
        return format!("{}ies", stem);
    }
    if raw_type_name.ends_with('s') || raw_type_name.ends_with('x') || raw_type_name.ends_with("ch")
    {
        return format!("{}es", raw_type_name);
    }
    format!("{}s", raw_type_name)
}

/// Split a name into tokens on lower-to-upper case boundaries
fn split_case_boundaries(name: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();

    for ch in name.chars() {
        if ch.is_uppercase() && !current.is_empty() && !current.ends_with(char::is_uppercase) {
            tokens.push(std::mem::take(&mut current));
        }
        if ch.is_alphanumeric() {
            current.push(ch);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_static_lookup() {
        assert_eq!(derive_label("salesorder"), "Sales Order");
        assert_eq!(derive_label("classification"), "Class");
    }

    #[test]
    fn test_label_camel_case_fallback() {
        assert_eq!(derive_label("customFooRecord"), "Custom Foo Record");
        assert_eq!(derive_label("customfoo"), "Customfoo");
    }

    #[test]
    fn test_label_never_empty() {
        assert_eq!(derive_label("___"), "___");
    }

    #[test]
    fn test_mapping_key_irregular_overrides() {
        assert_eq!(derive_mapping_key("Currency"), "currencies");
        assert_eq!(derive_mapping_key("Classification"), "classifications");
        assert_eq!(derive_mapping_key("inventoryitem"), "items");
    }

    #[test]
    fn test_mapping_key_regular_rules() {
        // No override: regular rules apply
        assert_eq!(derive_mapping_key("subsidiary"), "subsidiaries");
        assert_eq!(derive_mapping_key("tax"), "taxes");
        assert_eq!(derive_mapping_key("batch"), "batches");
        assert_eq!(derive_mapping_key("address"), "addresses");
        assert_eq!(derive_mapping_key("customer"), "customers");
    }

    #[test]
    fn test_mapping_key_regular_rules_preserve_casing() {
        // Only the irregular lookup is case-insensitive; the regular rules
        // pluralize the name exactly as the catalog reported it
        assert_eq!(derive_mapping_key("Invoice"), "Invoices");
        assert_eq!(derive_mapping_key("SalesOrder"), "SalesOrders");
        assert_eq!(derive_mapping_key("Currency"), "currencies");
    }
}
