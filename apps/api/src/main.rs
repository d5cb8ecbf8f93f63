mod config;
mod criteria;
mod errors;
mod leonar;
mod llm_client;
mod push;
mod routes;
mod scoring;
mod sourcing;
mod state;
mod usage;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::leonar::LeonarClient;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::{AppState, Session};
use crate::usage::UsageTracker;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (only PORT and friends; API keys are optional)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.rust_log)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Sourcer API v{}", env!("CARGO_PKG_VERSION"));

    // Daily LinkedIn view counter, persisted under the home directory by default
    let usage = UsageTracker::new(&config.usage_dir);
    info!(
        "LinkedIn usage tracker ready ({} viewed today)",
        usage.count_today().await
    );

    // Session starts empty; keys normally arrive through the UI. Env vars
    // seed one for headless runs.
    let state = AppState::new(usage);
    match (
        config.leonar_api_key.clone(),
        config.anthropic_api_key.clone(),
    ) {
        (Some(leonar_key), Some(anthropic_key)) => {
            let session = Session {
                leonar: LeonarClient::new(leonar_key)?,
                llm: LlmClient::new(anthropic_key)?,
            };
            state.set_session(session).await;
            info!("Session pre-configured from environment variables");
        }
        (None, None) => {
            info!("No API keys in environment; waiting for keys from the UI");
        }
        _ => {
            info!("Only one API key in environment; both are required, waiting for the UI");
        }
    }

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");
    info!("Open http://localhost:{} in a browser to start", config.port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
