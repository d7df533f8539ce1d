//! Operator endpoints for the failover controller: status, manual overrides, tuning.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::failover::{FailoverConfig, FailoverConfigPatch, ServiceStatus};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AiStatusResponse {
    pub status: ServiceStatus,
    pub config: FailoverConfig,
    pub monitoring: bool,
}

#[derive(Debug, Serialize)]
pub struct RestoreResponse {
    pub restored: bool,
    pub status: ServiceStatus,
}

/// GET /api/v1/ai/status
pub async fn handle_status(State(state): State<AppState>) -> Json<AiStatusResponse> {
    Json(AiStatusResponse {
        status: state.failover.status(),
        config: state.failover.config(),
        monitoring: state.failover.is_monitoring(),
    })
}

/// POST /api/v1/ai/force-rule-based
pub async fn handle_force_rule_based(State(state): State<AppState>) -> Json<ServiceStatus> {
    state.failover.force_rule_based_mode();
    Json(state.failover.status())
}

/// POST /api/v1/ai/restore
///
/// Runs a health check now; hybrid mode resumes only if it passes.
pub async fn handle_restore(State(state): State<AppState>) -> Json<RestoreResponse> {
    let restored = state.failover.try_restore_ai_mode().await;
    Json(RestoreResponse {
        restored,
        status: state.failover.status(),
    })
}

/// PATCH /api/v1/ai/config
///
/// Merges the given fields over the current config. Invalid values are
/// rejected and the previous config stays in force.
pub async fn handle_configure(
    State(state): State<AppState>,
    Json(patch): Json<FailoverConfigPatch>,
) -> Result<Json<FailoverConfig>, AppError> {
    let config = state.failover.configure(&patch)?;
    Ok(Json(config))
}
