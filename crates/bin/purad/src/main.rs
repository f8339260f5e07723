//! # purad — purahub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialise `tracing` output
//! - Construct the Pura cloud client (adapter)
//! - Construct the coordinator, the entity registry and the timer service
//! - Keep the device snapshot fresh on the poll interval
//! - Build the axum router and serve until Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use purahub_adapter_http_axum::state::AppState;
use purahub_adapter_virtual::VirtualPuraApi;
use purahub_app::registry::EntityRegistry;
use purahub_app::services::coordinator::DeviceCoordinator;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Cloud client
    let api = match &config.pura.virtual_devices {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading virtual devices");
            VirtualPuraApi::from_json(&std::fs::read_to_string(path)?)?
        }
        None => VirtualPuraApi::default(),
    };

    // Services
    let coordinator = Arc::new(DeviceCoordinator::new(api));
    let registry = Arc::new(EntityRegistry::new());
    match coordinator.refresh().await {
        Ok(count) => tracing::info!(devices = count, "initial device refresh"),
        Err(err) => tracing::warn!(%err, "initial device refresh failed"),
    }
    registry.sync(&coordinator.devices().await);

    let poller = {
        let coordinator = Arc::clone(&coordinator);
        let registry = Arc::clone(&registry);
        let interval = config.poll_interval();
        tokio::spawn(async move {
            coordinator
                .run_polling(interval, |devices| registry.sync(devices))
                .await;
        })
    };

    // HTTP
    let state = AppState::new(coordinator, registry);
    let app = purahub_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("purad listening on http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    poller.abort();
    tracing::info!("purad stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
    }
}
