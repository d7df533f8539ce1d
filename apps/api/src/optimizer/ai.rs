//! AI-path bullet rewriting. Output is validated before it is accepted: an
//! answer with the wrong bullet count or a blank rewrite counts as a failed
//! attempt, so the controller retries or falls back to the rule rewrite.

use serde::Deserialize;

use crate::ats::engine::GENERIC_ACTION_VERBS;
use crate::ats::knowledge::find_role;
use crate::llm_client::prompts::{fill, json_system, NO_FABRICATION_INSTRUCTION};
use crate::llm_client::{LlmClient, LlmError};
use crate::optimizer::prompts::{BULLET_REWRITE_PERSONA, BULLET_REWRITE_PROMPT_TEMPLATE};
use crate::optimizer::rules::{BulletOptimization, OptimizedBullet};

#[derive(Debug, Deserialize)]
struct AiRewrite {
    bullets: Vec<AiBullet>,
}

#[derive(Debug, Deserialize)]
struct AiBullet {
    optimized: String,
    #[serde(default)]
    suggestions: Vec<String>,
}

pub fn build_prompt(bullets: &[String], target_role: &str) -> Result<String, LlmError> {
    let role = find_role(target_role);
    let verbs = role
        .map(|r| r.action_verbs.join(", "))
        .unwrap_or_else(|| GENERIC_ACTION_VERBS.join(", "));
    let metrics = role
        .map(|r| r.metrics.join(", "))
        .unwrap_or_else(|| "any concrete numbers the candidate provides".to_string());
    let bullets_json = serde_json::to_string_pretty(bullets)?;

    Ok(fill(
        BULLET_REWRITE_PROMPT_TEMPLATE,
        &[
            ("target_role", target_role.trim()),
            ("action_verbs", verbs.as_str()),
            ("metrics", metrics.as_str()),
            ("no_fabrication", NO_FABRICATION_INSTRUCTION),
            ("bullets_json", bullets_json.as_str()),
        ],
    ))
}

/// Runs one AI rewrite attempt.
pub async fn rewrite_with_ai(
    llm: &LlmClient,
    bullets: &[String],
    target_role: &str,
) -> Result<BulletOptimization, LlmError> {
    let prompt = build_prompt(bullets, target_role)?;
    let raw: AiRewrite = llm
        .call_json(&prompt, &json_system(BULLET_REWRITE_PERSONA))
        .await?;
    into_optimization(raw, bullets, target_role)
}

fn into_optimization(
    raw: AiRewrite,
    bullets: &[String],
    target_role: &str,
) -> Result<BulletOptimization, LlmError> {
    if raw.bullets.len() != bullets.len() {
        return Err(LlmError::InvalidOutput(format!(
            "expected {} bullets, got {}",
            bullets.len(),
            raw.bullets.len()
        )));
    }

    let rewritten = bullets
        .iter()
        .zip(raw.bullets)
        .enumerate()
        .map(|(index, (original, ai))| {
            let optimized = ai.optimized.trim().to_string();
            if optimized.is_empty() && !original.trim().is_empty() {
                return Err(LlmError::InvalidOutput(format!("bullet {index} came back empty")));
            }
            Ok(OptimizedBullet {
                changed: optimized != *original,
                original: original.clone(),
                optimized,
                suggestions: ai.suggestions,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let role = find_role(target_role);
    Ok(BulletOptimization {
        role_found: role.is_some(),
        role_name: role
            .map(|r| r.name.to_string())
            .unwrap_or_else(|| target_role.trim().to_string()),
        bullets: rewritten,
    })
}
