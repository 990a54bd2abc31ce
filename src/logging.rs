//! Logging setup
//!
//! Structured logging via `tracing`. The filter honors `RUST_LOG`
//! when set and otherwise falls back to the configured level, so a
//! single noisy module can be turned up without rebuilding.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialize tracing for the process.
///
/// `level` is the fallback when `RUST_LOG` is not set. Safe to call
/// once per process; later calls are ignored.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    // try_init: the test harness may initialize more than once
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
