//! Tracing setup for the gateway binary.
//!
//! The filter sits behind a reload handle so the level from gatehouse.toml
//! can be applied after configuration is parsed, without restarting the
//! subscriber that already captured startup logs.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

static FILTER_HANDLE: OnceLock<reload::Handle<EnvFilter, tracing_subscriber::Registry>> =
    OnceLock::new();

pub fn init_tracing() {
    init_tracing_with_level("info");
}

/// Installs the global subscriber. RUST_LOG wins over `level` when set.
pub fn init_tracing_with_level(level: &str) {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level));

    let (reload_layer, handle) = reload::Layer::new(filter);
    let _ = FILTER_HANDLE.set(handle);

    let _ = tracing_subscriber::registry()
        .with(reload_layer)
        .with(fmt::layer())
        .try_init();
}

/// Swaps the active filter for `level`. No-op before `init_tracing` runs.
pub fn apply_logging_level(level: &str) {
    if let Some(handle) = FILTER_HANDLE.get() {
        let _ = handle.modify(|filter| {
            *filter = EnvFilter::new(level);
        });
    }
}
