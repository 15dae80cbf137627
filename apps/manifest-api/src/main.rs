//! Manifest API Binary
//!
//! Starts the passenger record service.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin manifest-api
//! ```
//!
//! # Environment Variables
//!
//! - `MANIFEST_CONFIG`: Path to the YAML config file (default: config.yaml,
//!   defaults apply when the file is absent)
//! - `MANIFEST_ENV`: Set to `development` for human-oriented console output
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;

use manifest_api::application::PassengerService;
use manifest_api::config::{Config, StoreBackend, load_config};
use manifest_api::domain::passenger::PassengerRepository;
use manifest_api::infrastructure::http::{AppState, create_router};
use manifest_api::infrastructure::persistence::{
    CockroachPassengerRepository, InMemoryPassengerRepository,
};
use manifest_api::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_telemetry();
    tracing::info!("service started");

    let config_path = std::env::var("MANIFEST_CONFIG").ok();
    let config = load_config(config_path.as_deref()).context("loading configuration")?;

    // The backend is chosen exactly once; everything downstream is generic
    // over the store port.
    let router = match config.store.backend {
        StoreBackend::Memory => {
            tracing::info!(backend = "memory", "store selected");
            build_router(&config, Arc::new(InMemoryPassengerRepository::new()))
        }
        StoreBackend::Cockroach => {
            tracing::info!(backend = "cockroach", "store selected");
            let repository = CockroachPassengerRepository::connect(
                &config.store.database_url,
                config.store.max_connections,
                config.store.retry.clone(),
            )
            .await
            .context("connecting to CockroachDB")?;
            build_router(&config, Arc::new(repository))
        }
    };

    let listener = TcpListener::bind(&config.server.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.server.listen_addr))?;
    tracing::info!(addr = %config.server.listen_addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server")?;

    tracing::info!("service ended");
    Ok(())
}

fn build_router<R>(config: &Config, repository: Arc<R>) -> Router
where
    R: PassengerRepository + 'static,
{
    let deadline = Duration::from_secs(config.server.operation_deadline_secs);
    create_router(AppState {
        service: Arc::new(PassengerService::with_deadline(repository, deadline)),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
///
/// # Panics
///
/// Panics if signal handlers cannot be installed: a process that cannot
/// respond to termination signals should fail fast at startup instead.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, initiating shutdown");
        }
    }
}
