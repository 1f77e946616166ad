//! Safepath server - route risk evaluation over HTTP

use anyhow::{Context, Result};
use safepath_server::{api, config::Config, state::AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    let filter = EnvFilter::from_default_env()
        .add_directive("safepath_server=debug".parse()?)
        .add_directive("safepath_core=info".parse()?);
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Safepath server...");
    if config.hazard_feed_url.trim().is_empty() {
        tracing::warn!("SAFEPATH_HAZARD_FEED_URL is not set; trip planning will report risk data unavailable");
    }

    let port = config.server_port;
    let state = Arc::new(AppState::new(config).context("building upstream HTTP client")?);

    let app = api::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
