// All LLM prompt constants for the Optimizer module.
// Reuses cross-cutting fragments from llm_client::prompts.

pub const BULLET_REWRITE_PERSONA: &str = "You are an expert resume writer who rewrites \
    experience bullets so they pass ATS filters and read well to recruiters.";

/// Bullet rewrite prompt template. Replace `{target_role}`, `{action_verbs}`,
/// `{metrics}`, `{no_fabrication}` and `{bullets_json}` before sending.
pub const BULLET_REWRITE_PROMPT_TEMPLATE: &str = r#"Rewrite each resume bullet below for the target role "{target_role}".

Return a JSON object with this EXACT schema (no extra fields):
{
  "bullets": [
    {
      "optimized": "Engineered a payments API serving 2M requests per day",
      "suggestions": ["Add the latency improvement if you measured it"]
    }
  ]
}

Rules:
- Return exactly one entry per input bullet, in the same order.
- Start each bullet with a strong past-tense action verb. Preferred verbs: {action_verbs}
- Keep each bullet to one sentence with no trailing period.
- Metrics worth highlighting for this role: {metrics}
- {no_fabrication}

BULLETS (JSON array):
{bullets_json}"#;
