use anyhow::Context;
use tracing_subscriber::EnvFilter;

use request_gate::{app, config, validation};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up APP_ENV, API_PORT, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting request gate in {:?} mode", config.environment);

    // Build the rule registry up front rather than on the first request
    let fields: Vec<_> = validation::registry().fields().collect();
    tracing::info!("Rule registry ready: {}", fields.join(", "));

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Request gate listening on http://{}", bind_addr);

    axum::serve(listener, app()).await.context("server error")?;

    Ok(())
}
