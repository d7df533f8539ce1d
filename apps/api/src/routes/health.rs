use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and current AI mode.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let status = state.failover.status();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME"),
        "ai_configured": state.config.anthropic_api_key.is_some(),
        "mode": status.mode,
    }))
}
