//! AI-path ATS analysis: prompt the LLM, then normalize its answer into the
//! same `AtsAnalysisResult` contract the rule engine produces.
//!
//! Role resolution stays deterministic: `role_found`, `role_id` and `role_name`
//! come from the knowledge base, never from the model.

use serde::Deserialize;

use crate::ats::knowledge::{find_role, RoleKnowledge};
use crate::ats::matching::dedupe;
use crate::ats::models::{
    AtsAnalysisResult, AtsScores, KeywordAnalysis, ResumeInput, SkillAnalysis, ToolAnalysis,
};
use crate::ats::prompts::{
    ATS_ANALYSIS_PERSONA, ATS_ANALYSIS_PROMPT_TEMPLATE, KNOWN_ROLE_CONTEXT_TEMPLATE,
    UNKNOWN_ROLE_CONTEXT,
};
use crate::llm_client::prompts::{fill, json_system, NO_FABRICATION_INSTRUCTION};
use crate::llm_client::{LlmClient, LlmError};

/// Model output. Scores arrive as numbers of any shape and are clamped here.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AiAnalysis {
    skills: AiSkills,
    tools: AiTools,
    keywords: AiKeywords,
    scores: AiScores,
    recommendations: Vec<String>,
    warnings: Vec<String>,
    tips: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AiSkills {
    matched_required: Vec<String>,
    missing_required: Vec<String>,
    matched_optional: Vec<String>,
    missing_optional: Vec<String>,
    extra: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AiTools {
    matched: Vec<String>,
    missing: Vec<String>,
    extra: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AiKeywords {
    matched: Vec<String>,
    missing: Vec<String>,
    density: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AiScores {
    skill_match: f64,
    tool_match: f64,
    keyword_match: f64,
    overall_match: f64,
}

fn clamp_score(value: f64) -> u8 {
    if value.is_finite() {
        value.round().clamp(0.0, 100.0) as u8
    } else {
        0
    }
}

fn role_context(role: Option<&RoleKnowledge>) -> String {
    match role {
        Some(role) => {
            let required = role.required_skills.join(", ");
            let optional = role.optional_skills.join(", ");
            let tools = role.tools.join(", ");
            let keywords = role.keywords.join(", ");
            fill(
                KNOWN_ROLE_CONTEXT_TEMPLATE,
                &[
                    ("role_name", role.name),
                    ("required_skills", required.as_str()),
                    ("optional_skills", optional.as_str()),
                    ("tools", tools.as_str()),
                    ("keywords", keywords.as_str()),
                ],
            )
        }
        None => UNKNOWN_ROLE_CONTEXT.to_string(),
    }
}

pub fn build_prompt(input: &ResumeInput, target_role: &str) -> Result<String, LlmError> {
    let resume_json = serde_json::to_string_pretty(input)?;
    let context = role_context(find_role(target_role));
    Ok(fill(
        ATS_ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("target_role", target_role.trim()),
            ("role_context", context.as_str()),
            ("no_fabrication", NO_FABRICATION_INSTRUCTION),
            ("resume_json", resume_json.as_str()),
        ],
    ))
}

/// Runs one AI analysis attempt.
pub async fn analyze_with_ai(
    llm: &LlmClient,
    input: &ResumeInput,
    target_role: &str,
) -> Result<AtsAnalysisResult, LlmError> {
    let prompt = build_prompt(input, target_role)?;
    let raw: AiAnalysis = llm
        .call_json(&prompt, &json_system(ATS_ANALYSIS_PERSONA))
        .await?;
    Ok(into_result(raw, target_role))
}

fn into_result(raw: AiAnalysis, target_role: &str) -> AtsAnalysisResult {
    let role = find_role(target_role);
    AtsAnalysisResult {
        role_found: role.is_some(),
        role_id: role.map(|r| r.id.to_string()),
        role_name: role
            .map(|r| r.name.to_string())
            .unwrap_or_else(|| target_role.trim().to_string()),
        skills: SkillAnalysis {
            matched_required: dedupe(raw.skills.matched_required),
            missing_required: dedupe(raw.skills.missing_required),
            matched_optional: dedupe(raw.skills.matched_optional),
            missing_optional: dedupe(raw.skills.missing_optional),
            extra: dedupe(raw.skills.extra),
        },
        tools: ToolAnalysis {
            matched: dedupe(raw.tools.matched),
            missing: dedupe(raw.tools.missing),
            extra: dedupe(raw.tools.extra),
        },
        keywords: KeywordAnalysis {
            matched: dedupe(raw.keywords.matched),
            missing: dedupe(raw.keywords.missing),
            density: if raw.keywords.density.is_finite() {
                (raw.keywords.density.max(0.0) * 100.0).round() / 100.0
            } else {
                0.0
            },
        },
        scores: AtsScores {
            skill_match: clamp_score(raw.scores.skill_match),
            tool_match: clamp_score(raw.scores.tool_match),
            keyword_match: clamp_score(raw.scores.keyword_match),
            overall_match: clamp_score(raw.scores.overall_match),
        },
        recommendations: dedupe(raw.recommendations),
        warnings: dedupe(raw.warnings),
        tips: dedupe(raw.tips),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_scores_are_clamped() {
        let raw: AiAnalysis = serde_json::from_str(
            r#"{"scores": {"skill_match": 140, "tool_match": -3, "keyword_match": 71.6, "overall_match": 88}}"#,
        )
        .unwrap();
        let result = into_result(raw, "software_engineer");
        assert_eq!(result.scores.skill_match, 100);
        assert_eq!(result.scores.tool_match, 0);
        assert_eq!(result.scores.keyword_match, 72);
        assert_eq!(result.scores.overall_match, 88);
    }

    #[test]
    fn test_role_identity_comes_from_knowledge_base() {
        let raw = AiAnalysis::default();
        let known = into_result(raw, "SWE");
        assert!(known.role_found);
        assert_eq!(known.role_id.as_deref(), Some("software_engineer"));
        assert_eq!(known.role_name, "Software Engineer");

        let unknown = into_result(AiAnalysis::default(), "  Lighthouse Keeper ");
        assert!(!unknown.role_found);
        assert_eq!(unknown.role_name, "Lighthouse Keeper");
    }

    #[test]
    fn test_partial_model_output_still_deserializes() {
        let raw: AiAnalysis =
            serde_json::from_str(r#"{"recommendations": ["a", "A", "b"]}"#).unwrap();
        let result = into_result(raw, "data_analyst");
        assert_eq!(result.recommendations, vec!["a", "b"]);
        assert!(result.skills.matched_required.is_empty());
    }

    #[test]
    fn test_prompt_carries_role_profile_and_resume() {
        let input = ResumeInput {
            skills: vec!["Rust".to_string()],
            ..ResumeInput::default()
        };
        let prompt = build_prompt(&input, "backend_developer").unwrap();
        assert!(prompt.contains("Reference profile for Backend Developer"));
        assert!(prompt.contains("Node.js, Python, SQL"));
        assert!(prompt.contains("\"Rust\""));
        assert!(!prompt.contains("{resume_json}"));
    }

    #[test]
    fn test_prompt_for_unknown_role_asks_for_general_expectations() {
        let prompt = build_prompt(&ResumeInput::default(), "Lighthouse Keeper").unwrap();
        assert!(prompt.contains("No reference profile exists"));
    }
}
