use serde::{Deserialize, Serialize};

/// Resume content submitted for analysis. Only free text and optional explicit
/// skill/tool lists; persistence of drafts lives elsewhere.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeInput {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    /// Explicit skills. When empty, skills are extracted from the free text.
    #[serde(default)]
    pub skills: Vec<String>,
    /// Explicit tools. When empty, tools are extracted from the free text.
    #[serde(default)]
    pub tools: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
}

impl ResumeInput {
    /// True when there is nothing at all to analyze.
    pub fn is_empty(&self) -> bool {
        self.summary.as_deref().map_or(true, |s| s.trim().is_empty())
            && self.experience.iter().all(|e| e.bullets.iter().all(|b| b.trim().is_empty()))
            && self.projects.iter().all(|p| p.description.trim().is_empty())
            && self.skills.is_empty()
            && self.tools.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillAnalysis {
    pub matched_required: Vec<String>,
    pub missing_required: Vec<String>,
    pub matched_optional: Vec<String>,
    pub missing_optional: Vec<String>,
    pub extra: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolAnalysis {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub extra: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordAnalysis {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    /// Matched keyword occurrences per 100 corpus tokens, two decimals.
    pub density: f64,
}

/// Integer scores in 0..=100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtsScores {
    pub skill_match: u8,
    pub tool_match: u8,
    pub keyword_match: u8,
    pub overall_match: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsAnalysisResult {
    pub role_found: bool,
    pub role_id: Option<String>,
    pub role_name: String,
    pub skills: SkillAnalysis,
    pub tools: ToolAnalysis,
    pub keywords: KeywordAnalysis,
    pub scores: AtsScores,
    pub recommendations: Vec<String>,
    pub warnings: Vec<String>,
    pub tips: Vec<String>,
}
