//! Tracing bootstrap
//!
//! The engine only emits events. Applications that want them printed call
//! `init_tracing` once at startup.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Installs a global fmt subscriber filtered by `RUST_LOG`,
/// defaulting to `budget_engine=info`
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("budget_engine=info"));

        // Another subscriber may already be installed by the host application.
        let _ = fmt().with_env_filter(filter).try_init();
        tracing::info!("budget engine tracing initialized");
    });
}
