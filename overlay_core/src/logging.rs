//! Tracing setup for the overlay binary.
//!
//! The assessment itself (text or JSON) is the only thing written to stdout,
//! so every log line goes to stderr. The default level is `warn`: a normal run
//! only reports skipped log records and config fallbacks that need attention.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the stderr subscriber at `warn`, unless `RUST_LOG` says otherwise.
pub fn init() {
    init_with_level("warn");
}

/// Install the stderr subscriber with `default_level` as the fallback filter.
///
/// Returns `false` when a global subscriber was already installed, e.g. when
/// the engine is embedded in a host that set up its own tracing.
pub fn init_with_level(default_level: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}

/// Route engine logs into the test harness output at `debug`.
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
