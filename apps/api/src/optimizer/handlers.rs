//! Axum route handlers for the Optimizer API.

use std::convert::Infallible;

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::failover::ServiceResult;
use crate::llm_client::LlmError;
use crate::optimizer::ai::rewrite_with_ai;
use crate::optimizer::rules::{optimize_bullets, BulletOptimization};
use crate::state::AppState;

const MAX_BULLETS: usize = 50;

#[derive(Debug, Deserialize)]
pub struct OptimizeBulletsRequest {
    pub bullets: Vec<String>,
    pub target_role: String,
}

/// POST /api/v1/optimize/bullets
///
/// Rewrites experience bullets for a target role: AI first, rule rewrite as fallback.
pub async fn handle_optimize_bullets(
    State(state): State<AppState>,
    Json(request): Json<OptimizeBulletsRequest>,
) -> Result<Json<ServiceResult<BulletOptimization>>, AppError> {
    if request.target_role.trim().is_empty() {
        return Err(AppError::Validation("target_role cannot be empty".to_string()));
    }
    if request.bullets.iter().all(|b| b.trim().is_empty()) {
        return Err(AppError::Validation("bullets cannot be empty".to_string()));
    }
    if request.bullets.len() > MAX_BULLETS {
        return Err(AppError::Validation(format!(
            "at most {MAX_BULLETS} bullets per request"
        )));
    }

    let llm = state.llm.as_ref();
    let bullets = request.bullets.as_slice();
    let target_role = request.target_role.as_str();

    let result = state
        .failover
        .execute(
            move || async move {
                match llm {
                    Some(llm) => rewrite_with_ai(llm, bullets, target_role).await,
                    None => Err(LlmError::NotConfigured),
                }
            },
            || Ok::<_, Infallible>(optimize_bullets(bullets, target_role)),
            "bullet_optimization",
        )
        .await;

    Ok(Json(result))
}
