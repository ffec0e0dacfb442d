mod config;
mod errors;
mod form;
mod predictor_client;
mod render;
mod routes;
mod state;
mod submission;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::predictor_client::PredictorClient;
use crate::render::PageRenderer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Placement Predictor v{}", env!("CARGO_PKG_VERSION"));

    let client = PredictorClient::new(config.predictor_url.clone())
        .context("Failed to build HTTP client")?;
    info!("Prediction service endpoint: {}", client.endpoint());

    if config.warm_up {
        let client = client.clone();
        tokio::spawn(async move {
            match client.warm_up().await {
                Ok(()) => info!("Prediction service is awake"),
                Err(e) => warn!(kind = e.kind(), "Prediction service warm-up failed: {e}"),
            }
        });
    }

    let renderer = PageRenderer::new().context("Failed to load page template")?;
    let state = AppState::new(config.clone(), renderer, Arc::new(client));

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
