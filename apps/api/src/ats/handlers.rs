//! Axum route handlers for the ATS API.

use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::ats::ai::analyze_with_ai;
use crate::ats::engine::analyze;
use crate::ats::knowledge::{knowledge_base, RoleKnowledge, RoleMatch};
use crate::ats::models::{AtsAnalysisResult, ResumeInput};
use crate::errors::AppError;
use crate::failover::ServiceResult;
use crate::llm_client::LlmError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub resume: ResumeInput,
    pub target_role: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RoleSearchParams {
    pub q: Option<String>,
    pub industry: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RoleSummary {
    pub id: &'static str,
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub industry: &'static str,
}

impl From<&'static RoleKnowledge> for RoleSummary {
    fn from(role: &'static RoleKnowledge) -> Self {
        Self {
            id: role.id,
            name: role.name,
            aliases: role.aliases,
            industry: role.industry,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RoleSearchResponse {
    pub roles: Vec<RoleSummary>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/ats/analyze
///
/// AI analysis first when the AI path is up, rule engine otherwise. The body
/// always carries `mode` and `used_fallback` so the client can label the result.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<ServiceResult<AtsAnalysisResult>>, AppError> {
    if request.target_role.trim().is_empty() {
        return Err(AppError::Validation("target_role cannot be empty".to_string()));
    }
    if request.resume.is_empty() {
        return Err(AppError::Validation("resume has no content to analyze".to_string()));
    }

    let llm = state.llm.as_ref();
    let resume = &request.resume;
    let target_role = request.target_role.as_str();

    let result = state
        .failover
        .execute(
            move || async move {
                match llm {
                    Some(llm) => analyze_with_ai(llm, resume, target_role).await,
                    None => Err(LlmError::NotConfigured),
                }
            },
            || Ok::<_, Infallible>(analyze(resume, target_role)),
            "ats_analysis",
        )
        .await;

    Ok(Json(result))
}

/// GET /api/v1/roles?q=&industry=
///
/// No query lists every role. Both filters may be combined.
pub async fn handle_search_roles(
    Query(params): Query<RoleSearchParams>,
) -> Json<RoleSearchResponse> {
    let kb = knowledge_base();
    let mut roles: Vec<&'static RoleKnowledge> = match params.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => kb.search_roles(q),
        _ => kb.list_roles().iter().collect(),
    };
    if let Some(industry) = params.industry.as_deref().filter(|i| !i.trim().is_empty()) {
        let in_industry = kb.roles_in_industry(industry);
        roles.retain(|role| in_industry.iter().any(|other| other.id == role.id));
    }

    Json(RoleSearchResponse {
        roles: roles.into_iter().map(RoleSummary::from).collect(),
    })
}

/// GET /api/v1/roles/:term
///
/// Resolves a free-text role through the lookup chain and reports which
/// strategy matched.
pub async fn handle_find_role(Path(term): Path<String>) -> Result<Json<RoleMatch>, AppError> {
    knowledge_base()
        .find_role_with_strategy(&term)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No role matches '{}'", term.trim())))
}
