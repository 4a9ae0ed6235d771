//! Tracing initialization shared by the migrator binaries.

use std::env;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Library targets every binary logs through.
const LIBRARY_TARGETS: [&str; 2] = ["strapi_migrate", "content_store"];

/// Default `EnvFilter` directives for a binary whose events carry `target`.
pub fn default_filter(target: &str) -> String {
    std::iter::once(target)
        .chain(LIBRARY_TARGETS.iter().copied().filter(|t| *t != target))
        .map(|t| format!("{}=info", t))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize tracing/logging.
///
/// `target` is the calling binary's crate name, so its own events pass the
/// default filter. `RUST_LOG` overrides the default. With `LOG_FORMAT=json`
/// events are written as JSON lines, otherwise as pretty console output.
pub fn init_tracing(service_name: &'static str, target: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(target)));

    let json = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .init();
    }

    info!(
        service_name = service_name,
        service_version = env!("CARGO_PKG_VERSION"),
        "Tracing initialized"
    );
}
