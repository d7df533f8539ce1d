// All LLM prompt constants for the ATS module.
// Reuses cross-cutting fragments from llm_client::prompts.

pub const ATS_ANALYSIS_PERSONA: &str = "You are an expert applicant tracking system (ATS) analyst \
    and technical recruiter. You compare a resume against a target role and report \
    what an ATS filter would match, what it would miss, and how to close the gap.";

/// ATS analysis prompt template. Replace `{target_role}`, `{role_context}`,
/// `{no_fabrication}` and `{resume_json}` before sending.
pub const ATS_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the resume below for the target role "{target_role}".

{role_context}

Return a JSON object with this EXACT schema (no extra fields):
{
  "skills": {
    "matched_required": ["Python"],
    "missing_required": ["System Design"],
    "matched_optional": ["Docker"],
    "missing_optional": ["Kubernetes"],
    "extra": ["Photography"]
  },
  "tools": {
    "matched": ["GitHub"],
    "missing": ["Jira"],
    "extra": []
  },
  "keywords": {
    "matched": ["code review"],
    "missing": ["scalable"],
    "density": 2.5
  },
  "scores": {
    "skill_match": 62,
    "tool_match": 50,
    "keyword_match": 40,
    "overall_match": 52
  },
  "recommendations": ["Add a bullet describing a system you designed end to end"],
  "warnings": ["No quantified results in the experience section"],
  "tips": ["Link your GitHub profile in the header"]
}

Rules:
- Scores are integers from 0 to 100.
- overall_match weighs skills 40%, tools 25%, keywords 35%.
- density is matched keyword occurrences per 100 words of resume text.
- Recommendations are concrete edits, most impactful first, at most 8.
- {no_fabrication}

RESUME (JSON):
{resume_json}"#;

/// Role context when the knowledge base recognizes the role.
pub const KNOWN_ROLE_CONTEXT_TEMPLATE: &str = "Reference profile for {role_name}:
- Required skills: {required_skills}
- Optional skills: {optional_skills}
- Tools: {tools}
- Keywords recruiters look for: {keywords}";

pub const UNKNOWN_ROLE_CONTEXT: &str = "No reference profile exists for this role. \
    Infer the typical requirements from the role title and industry norms, \
    and include a warning that the analysis is based on general expectations.";
