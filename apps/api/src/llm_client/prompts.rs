// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction shared by every prompt that touches the candidate's own words.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    CRITICAL: Work only from the resume content provided. \
    Do NOT invent employers, skills, tools, or numbers. \
    When a metric would help but none is given, say so in a suggestion instead of making one up.";

/// Joins a service-specific persona with the JSON-only rules.
pub fn json_system(persona: &str) -> String {
    format!("{persona} {JSON_ONLY_SYSTEM}")
}

/// Fills `{placeholder}` slots in a template, in order.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |acc, (key, value)| {
            acc.replace(&format!("{{{key}}}"), value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_system_appends_json_rules() {
        let system = json_system("You are an ATS analyst.");
        assert!(system.starts_with("You are an ATS analyst."));
        assert!(system.ends_with(JSON_ONLY_SYSTEM));
    }

    #[test]
    fn test_fill_replaces_every_placeholder() {
        let out = fill(
            "Role: {role}. Again {role}. Resume: {resume}",
            &[("role", "SWE"), ("resume", "{}")],
        );
        assert_eq!(out, "Role: SWE. Again SWE. Resume: {}");
    }
}
