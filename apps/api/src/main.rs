mod ats;
mod config;
mod errors;
mod failover;
mod llm_client;
mod optimizer;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::failover::{FailoverController, HealthProbe};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
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

    info!("Starting resume engine API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client (optional: without a key the service runs rule-based only)
    let llm = match config.anthropic_api_key.clone() {
        Some(key) => {
            let client = LlmClient::new(key)?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(client)
        }
        None => None,
    };

    // Initialize the failover controller; the LLM client doubles as its health probe
    let probe = llm
        .clone()
        .map(|client| Arc::new(client) as Arc<dyn HealthProbe>);
    let failover = Arc::new(FailoverController::new(config.failover.clone(), probe)?);
    let status_log = failover.on_status_change(|status| {
        info!(
            mode = %status.mode,
            ai_available = status.ai_available,
            failures = status.ai_failure_count,
            "AI status changed: {}",
            status.message
        );
    });

    if llm.is_some() {
        failover.start_health_monitoring();
    } else {
        warn!("ANTHROPIC_API_KEY not set; serving every request with the rule engine");
        failover.force_rule_based_mode();
    }

    // Build app state
    let state = AppState {
        config: config.clone(),
        llm,
        failover: Arc::clone(&failover),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    failover.stop_health_monitoring();
    status_log.unsubscribe();
    info!("Shut down cleanly");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
