//! Diagnostic tracing for the governor binary.
//!
//! Governance artifacts (store documents, checkpoints) are the durable record.
//! Tracing is for operators: transitions, halts, and store access, written to
//! stderr and filtered by `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Defaults to `warn` if unset, so runtime halts are always
/// visible.
///
/// # Example
/// ```bash
/// RUST_LOG=governor=debug governor replay INIT AMENDMENT_PREP
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
