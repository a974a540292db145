// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::card_service::CardService;
use crate::application::state_watcher::StateWatcher;
use crate::infrastructure::config::{load_cards_config, load_host_config};
use crate::infrastructure::hass_repository::HassRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_card, get_graph, get_graph_svg, health_check, list_cards, refresh_card, set_fan_mode,
    set_hvac_mode, set_temperature, stream_graph,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let host_config = load_host_config().context("Failed to load host configuration")?;
    let cards_config = load_cards_config().context("Failed to load card configuration")?;
    tracing::info!("Loaded {} cards", cards_config.cards.len());

    // Create repository (infrastructure layer)
    let repository = Arc::new(HassRepository::new(
        host_config.host.url,
        host_config.host.token,
        Duration::from_secs(host_config.host.timeout_secs),
    )?);

    // Create services (application layer)
    let card_service = CardService::new(repository.clone(), cards_config.cards);
    let watchers = StateWatcher::new(repository.clone(), card_service.clone()).spawn();

    // Create application state
    let state = Arc::new(AppState { card_service });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/cards", get(list_cards))
        .route("/cards/:id", get(get_card))
        .route("/cards/:id/graph", get(get_graph))
        .route("/cards/:id/graph.svg", get(get_graph_svg))
        .route("/cards/:id/events", get(stream_graph))
        .route("/cards/:id/refresh", post(refresh_card))
        .route("/cards/:id/temperature", post(set_temperature))
        .route("/cards/:id/hvac_mode", post(set_hvac_mode))
        .route("/cards/:id/fan_mode", post(set_fan_mode))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = host_config
        .server
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address {}", host_config.server.listen))?;
    tracing::info!("Starting climate-card service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    for watcher in watchers {
        watcher.abort();
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
