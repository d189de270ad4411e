//! Diagnostic tracing for the loop.
//!
//! Tracing goes to stderr and is controlled by `RUST_LOG`. The durable
//! per-cycle records under `.taskloop/cycles/` are written regardless of the
//! filter (see `io::cycle_log`).

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`; defaults to `info` so each cycle's selection and outcome
/// are visible. Output: stderr, compact format.
///
/// ```bash
/// RUST_LOG=taskloop=debug taskloop run --max-cycles 1
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
