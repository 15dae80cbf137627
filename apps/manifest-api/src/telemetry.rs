//! Tracing setup.
//!
//! Console subscriber with an env-filter; `RUST_LOG` controls verbosity
//! (default: `info`).

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init_telemetry() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let is_development = std::env::var("MANIFEST_ENV")
        .map(|v| v == "development")
        .unwrap_or(false);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(!is_development)
        .with_ansi(is_development)
        .init();
}
