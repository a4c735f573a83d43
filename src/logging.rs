// SPDX-License-Identifier: MIT

//! Structured JSON logging setup for embedding processes.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured JSON logging filtered by `RUST_LOG`.
///
/// Call once from the embedding process; repeated calls are no-ops so test
/// binaries can call it freely.
pub fn init() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(format)
        .try_init();
}
