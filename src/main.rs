use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use studio_dashboard::config::{self, AppConfig};
use studio_dashboard::services::memory::MemoryStore;
use studio_dashboard::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config: AppConfig = config::config().clone();
    tracing::info!("Starting Studio Dashboard in {:?} mode", config.environment);

    let port = config.server.port;
    let state = if std::env::var("DATABASE_URL").is_ok() {
        AppState::connect(config).context("failed to configure database")?
    } else {
        tracing::warn!("DATABASE_URL not set, serving from in-memory stores");
        AppState::in_memory(config, Arc::new(MemoryStore::new()))
    };

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Studio Dashboard listening on http://{}", bind_addr);

    let database = state.database.clone();
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(database) = database {
        database.close().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
