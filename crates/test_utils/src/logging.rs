//! Test Logging
//!
//! Installs a `tracing` subscriber once per test binary so `debug!` output
//! from the service and adapters shows up with `RUST_LOG=debug`.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs a test-writer subscriber filtered by `RUST_LOG` (default `warn`)
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
