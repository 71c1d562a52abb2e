use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use patent_review::core::config::{AppPaths, ConfigService};
use patent_review::core::logging;
use patent_review::server;
use patent_review::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    let config_service = ConfigService::new(paths.clone());
    let config = config_service
        .load()
        .with_context(|| format!("Failed to load {}", config_service.config_path().display()))?;

    logging::init(&config.logging, &paths.log_dir);

    match serde_json::to_value(&config) {
        Ok(effective) => tracing::info!(
            "Effective configuration: {}",
            config_service.redact_sensitive_values(&effective)
        ),
        Err(err) => tracing::warn!("Failed to serialise configuration for logging: {}", err),
    }

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::initialize(config).context("Failed to initialize application")?;

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    println!("PATENT_REVIEW_PORT={}", addr.port());
    tracing::info!("Listening on {}", addr);

    let app: Router = server::router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
