//! Redline Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod infrastructure;
mod reasoning;
mod simulation;
mod stores;

use app::App;
use infrastructure::{
    ollama::OllamaClient,
    resilient_llm::{ResilientLlmClient, RetryConfig},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "redline_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Redline Engine");

    // Load configuration
    let server_host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let server_port: u16 = std::env::var("SERVER_PORT")
        .or_else(|_| std::env::var("PORT"))
        .unwrap_or_else(|_| "8000".into())
        .parse()
        .unwrap_or(8000);

    // Create the reasoning provider client
    let ollama_client = Arc::new(OllamaClient::from_env());
    let retry_config = RetryConfig::default();
    tracing::info!(
        max_retries = retry_config.max_retries,
        base_delay_ms = retry_config.base_delay_ms,
        "Reasoning provider configured with retry"
    );
    let llm = Arc::new(ResilientLlmClient::new(ollama_client, retry_config));

    // Create application state
    let app = Arc::new(App::new(llm));

    // The game client runs in a browser during development; allow any origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = api::http::routes()
        .route("/ws/{session_id}", get(api::websocket::ws_handler))
        .with_state(app)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = format!("{server_host}:{server_port}").parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
