//! Serve command - loads configuration, opens storage and runs the HTTP server

use std::net::SocketAddr;
use std::path::Path;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use crate::api::create_router;
use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::Storage;

/// Run the API server until Ctrl+C or SIGTERM
pub async fn run(config_path: &Path) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load(config_path)?;
    logging::init_logging(&config.logging);
    info!(config_path = %config_path.display(), "Configuration loaded");

    let hasher = crate::create_password_hasher();
    let storage = Storage::open(&config.storage, hasher.clone()).await?;
    let state = crate::create_app_state(&config, storage.users.clone(), hasher);
    let app = create_router(state);

    let addr = config.server.socket_addr()?;
    info!("Starting API server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    storage.close().await;
    served?;

    info!("API server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
