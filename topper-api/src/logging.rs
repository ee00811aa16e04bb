//! Tracing setup shared by the server and the import tool

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter for `level`, unless `RUST_LOG` says otherwise
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "topper_api={level},topper_common={level},tower_http={level}"
        ))
    })
}

/// Install the global subscriber: registry + env filter + fmt layer
pub fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
