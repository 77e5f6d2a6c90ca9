//! Instant Dashboard HTTP backend
//!
//! Serves `POST /api/generate-dashboard` and `GET /health`. The generation
//! strategy (live completion API or demo documents) is chosen once here from
//! the environment and shared by every request.

mod app;
mod handler;
mod logging;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use instadash_core::{select_generator, ServerConfig, GENERATE_PATH};

use crate::handler::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config = ServerConfig::from_env()?;
    let generator = select_generator(&config);
    let state = Arc::new(AppState::new(generator));
    let app = app::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server running on http://localhost:{}", config.port);
    tracing::info!(
        "Dashboard API available at http://localhost:{}{}",
        config.port,
        GENERATE_PATH
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
