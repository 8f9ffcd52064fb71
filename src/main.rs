use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use finsight_api::agent::{AnthropicBackend, SystemClock};
use finsight_api::config;
use finsight_api::database::open_record_store;
use finsight_api::is_development;
use finsight_api::routes::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, ANTHROPIC_API_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Finsight API in {:?} mode", config.environment);

    if config.reasoning.api_key.is_empty() {
        tracing::warn!("ANTHROPIC_API_KEY not set; analysis runs will fail until it is configured");
    }

    let (store, database) = open_record_store(config).await?;
    if database.is_none() && !is_development!() {
        tracing::warn!("Running outside development without a database");
    }

    let backend = Arc::new(AnthropicBackend::new(&config.reasoning)?);
    tracing::info!("Reasoning backend: {}", backend.model());

    let state = AppState::assemble(store, backend, Arc::new(SystemClock), &config.agent);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Finsight API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(database) = database {
        database.close().await;
    }
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown signal received");
}
