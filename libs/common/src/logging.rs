//! Logging initialization for the sync services
//!
//! Console logging with `EnvFilter` support. The filter string accepts either
//! a bare level ("info") or a full directive list ("info,syncsrv=debug").

use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level so operators can
/// raise verbosity without touching the config file. Safe to call more than
/// once; subsequent calls are no-ops (useful in tests).
pub fn init(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut result = Ok(());
    INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let fmt_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_line_number(false);

        result = tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| e.into());
    });
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        assert!(init("debug").is_ok());
        // Second call hits the OnceLock fast path
        assert!(init("info").is_ok());
    }
}
