//! Shared Serde default helpers
//!
//! Default value functions for `#[serde(default = "...")]` attributes.

/// Default value: true
pub fn bool_true() -> bool {
    true
}

/// Default value: false
pub fn bool_false() -> bool {
    false
}
