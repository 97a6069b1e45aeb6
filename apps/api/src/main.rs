mod config;
mod errors;
mod export;
mod ingest;
mod llm_client;
mod models;
mod planning;
mod portfolio;
mod render;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, PlannerBackend};
use crate::llm_client::{LlmClient, TextModel};
use crate::planning::{LlmPlanner, Planner, PresetPlanner};
use crate::portfolio::session::SessionStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client (keys arrive per session, none is configured here)
    let model: Arc<dyn TextModel> = Arc::new(LlmClient::new(
        config.llm_api_base.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    ));
    info!(
        "LLM client initialized ({}, default model {})",
        config.llm_api_base, config.llm_default_model
    );

    // Initialize planner (LlmPlanner by default, swap via PLANNER_BACKEND)
    let planner: Arc<dyn Planner> = match config.planner_backend {
        PlannerBackend::Llm => Arc::new(LlmPlanner::new(model.clone())),
        PlannerBackend::Preset => Arc::new(PresetPlanner),
    };
    info!("Planner backend: {}", planner.backend());

    // Sessions live in memory only; idle ones are swept every minute
    let sessions = Arc::new(SessionStore::new(Duration::from_secs(
        config.session_idle_secs,
    )));
    sessions.spawn_idle_sweep(Duration::from_secs(60));
    info!("Session idle timeout: {}s", config.session_idle_secs);

    let state = AppState {
        config: config.clone(),
        sessions,
        model,
        planner,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the preview shell has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port)
        .parse()
        .context("PORT does not form a valid socket address")?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
