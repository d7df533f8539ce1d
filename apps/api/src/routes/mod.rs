pub mod ai;
pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::ats::handlers as ats_handlers;
use crate::optimizer::handlers as optimizer_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Failover controller
        .route("/api/v1/ai/status", get(ai::handle_status))
        .route(
            "/api/v1/ai/force-rule-based",
            post(ai::handle_force_rule_based),
        )
        .route("/api/v1/ai/restore", post(ai::handle_restore))
        .route("/api/v1/ai/config", patch(ai::handle_configure))
        // Role knowledge base
        .route("/api/v1/roles", get(ats_handlers::handle_search_roles))
        .route("/api/v1/roles/:term", get(ats_handlers::handle_find_role))
        // Dual-mode operations
        .route("/api/v1/ats/analyze", post(ats_handlers::handle_analyze))
        .route(
            "/api/v1/optimize/bullets",
            post(optimizer_handlers::handle_optimize_bullets),
        )
        .with_state(state)
}
