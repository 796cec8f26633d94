//! Ordered fallback chains
//!
//! The same pattern recurs throughout discovery: try providers in priority
//! order, first non-empty result wins, a provider failure is logged and
//! treated as empty. Field introspection runs its metadata, sample-row and
//! static tiers through this combinator instead of ad hoc try/catch ladders.

use futures::future::BoxFuture;
use tracing::{debug, warn};

/// One provider in a fallback chain
pub struct Tier<'a, T> {
    pub name: &'static str,
    pub provider: BoxFuture<'a, anyhow::Result<Vec<T>>>,
}

impl<'a, T> Tier<'a, T> {
    pub fn new(name: &'static str, provider: BoxFuture<'a, anyhow::Result<Vec<T>>>) -> Self {
        Self { name, provider }
    }
}

/// Try tiers in order; return the first non-empty result.
///
/// A tier that errors or returns nothing hands over to the next one. When
/// every tier comes up empty the result is an empty list, not an error.
pub async fn first_non_empty<T>(subject: &str, tiers: Vec<Tier<'_, T>>) -> Vec<T> {
    for tier in tiers {
        match tier.provider.await {
            Ok(items) if !items.is_empty() => {
                debug!(
                    subject,
                    tier = tier.name,
                    count = items.len(),
                    "fallback tier produced results"
                );
                return items;
            }
            Ok(_) => {
                debug!(subject, tier = tier.name, "fallback tier returned nothing");
            }
            Err(e) => {
                warn!(subject, tier = tier.name, "fallback tier failed: {:#}", e);
            }
        }
    }
    Vec::new()
}
