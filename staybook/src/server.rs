use std::sync::Arc;

use signal::ctrl_c;
#[cfg(unix)]
use signal::unix::{SignalKind, signal};
use thiserror::Error;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use staybook_core::{error::DocumentStoreError, store::DocumentStore};

use crate::{
    api::{self, AppState, SharedState},
    config::{Config, ConfigError},
    database,
    notify::PushHub,
    service::{OrderService, StayService},
};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("document store: {0}")]
    Store(#[from] DocumentStoreError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds the request state around an open store.
pub fn app_state(store: Arc<DocumentStore>, push_capacity: usize) -> SharedState {
    Arc::new(AppState {
        orders: OrderService::new(Arc::clone(&store)),
        stays: StayService::new(store),
        push: PushHub::new(push_capacity),
    })
}

/// Connects the store, serves the API until a shutdown signal arrives, then closes the store.
pub async fn start_server(config: Config) -> Result<(), ServerError> {
    info!("Connecting store...");
    let store = Arc::new(database::connect(&config).await?);

    info!("Starting server...");
    let app = api::router(app_state(Arc::clone(&store), config.push_capacity));

    let address = format!("0.0.0.0:{}", config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");

    match Arc::try_unwrap(store) {
        Ok(store) => store.shutdown().await?,
        Err(_) => warn!("Store still referenced, skipping shutdown"),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
