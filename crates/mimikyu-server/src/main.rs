//! Mimikyu board server entry point.

use mimikyu_server::{AppState, ServerConfig, serve};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mimikyu_server=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let state = Arc::new(AppState::new(config.grid, config.channel_capacity));

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("Mimikyu server listening on http://{}", listener.local_addr()?);
    info!("Board is {}x{}", config.grid.rows(), config.grid.cols());

    serve(listener, state, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Unable to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
}
