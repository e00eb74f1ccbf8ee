mod acquisition;
mod config;
mod errors;
mod export;
mod graph;
mod normalize;
mod profile;
mod resume;
mod routes;
mod sections;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::acquisition::VoyagerClient;
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME").replace('-', "_"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume export API v{}", env!("CARGO_PKG_VERSION"));

    // Live fetcher; without a session only embedded payloads can be parsed
    let client = VoyagerClient::new(
        config.voyager_base_url.clone(),
        config.session_csrf_token.clone(),
        config.session_cookie.clone(),
        config.fetch_timeout,
    )
    .context("Failed to build the profile API client")?;
    if client.has_session() {
        info!("Profile API client initialized ({})", config.voyager_base_url);
    } else {
        warn!("No session configured; live fetches will fail until SESSION_COOKIE is set");
    }

    let state = AppState::new(config.clone(), Arc::new(client));

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
