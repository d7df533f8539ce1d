//! Rule engine: deterministic ATS analysis of resume content against a target role.
//!
//! Pure: no I/O, no clock, no randomness. This is what lets the failover
//! controller run it synchronously as the fallback for the AI path.
//!
//! Scoring:
//! - skill_match   = 70·matched_req/req + 30·matched_opt/max(opt,1)   (50 if no required skills)
//! - tool_match    = 100·matched/tools                                (50 if no tools)
//! - keyword_match = 100·matched/keywords                             (50 if no keywords)
//! - overall_match = 0.4·skill + 0.25·tool + 0.35·keyword
//!
//! An unrecognized role gets a generic analysis: the keyword set becomes ten
//! achievement verbs and `overall_match` is fixed at 50.

use crate::ats::knowledge::{knowledge_base, RoleKnowledge, RoleKnowledgeBase};
use crate::ats::matching::{
    contains_phrase, corpus_contains, count_phrase, covered_by_any, dedupe, extract_skills,
    extract_tools, extras, partition, tokenize,
};
use crate::ats::models::{
    AtsAnalysisResult, AtsScores, KeywordAnalysis, ResumeInput, SkillAnalysis, ToolAnalysis,
};

pub const GENERIC_ACTION_VERBS: [&str; 10] = [
    "led",
    "developed",
    "managed",
    "created",
    "improved",
    "implemented",
    "designed",
    "achieved",
    "increased",
    "delivered",
];

const GENERIC_TIPS: &[&str] = &[
    "Tailor your summary to the specific role you are applying for",
    "Start each bullet with an action verb and end with a measurable result",
    "Use standard section headings so ATS parsers can read your resume",
];

const NEUTRAL_SCORE: u8 = 50;
const WORDS_PER_PAGE: usize = 450;
const THIN_RESUME_WORDS: usize = 150;
const TOP_N: usize = 3;

/// Analyzes `input` against `target_role` using the built-in knowledge base.
pub fn analyze(input: &ResumeInput, target_role: &str) -> AtsAnalysisResult {
    analyze_with(knowledge_base(), input, target_role)
}

pub fn analyze_with(
    knowledge: &RoleKnowledgeBase,
    input: &ResumeInput,
    target_role: &str,
) -> AtsAnalysisResult {
    let profile = ResumeProfile::from_input(input);
    match knowledge.find_role(target_role) {
        Some(role) => analyze_role(&profile, role),
        None => analyze_generic(&profile, target_role),
    }
}

/// Normalized view of the resume: corpus tokens plus the user's skill/tool terms.
struct ResumeProfile {
    tokens: Vec<String>,
    skills: Vec<String>,
    tools: Vec<String>,
}

impl ResumeProfile {
    fn from_input(input: &ResumeInput) -> Self {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(summary) = input.summary.as_deref() {
            parts.push(summary);
        }
        for entry in &input.experience {
            parts.extend(entry.bullets.iter().map(String::as_str));
        }
        for project in &input.projects {
            parts.push(&project.description);
            parts.extend(project.technologies.iter().map(String::as_str));
        }
        parts.extend(input.skills.iter().map(String::as_str));
        parts.extend(input.tools.iter().map(String::as_str));

        let corpus = parts.join(" ").to_lowercase();

        let skills = if input.skills.is_empty() {
            extract_skills(&corpus)
        } else {
            dedupe(input.skills.iter().cloned())
        };
        let tools = if input.tools.is_empty() {
            extract_tools(&corpus)
        } else {
            dedupe(input.tools.iter().cloned())
        };

        Self {
            tokens: tokenize(&corpus),
            skills,
            tools,
        }
    }

    fn all_terms(&self) -> Vec<String> {
        self.skills.iter().chain(self.tools.iter()).cloned().collect()
    }
}

fn percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

fn ratio_score(matched: usize, total: usize) -> u8 {
    if total == 0 {
        NEUTRAL_SCORE
    } else {
        percent(100.0 * matched as f64 / total as f64)
    }
}

fn skill_score(skills: &SkillAnalysis) -> u8 {
    let required = skills.matched_required.len() + skills.missing_required.len();
    if required == 0 {
        return NEUTRAL_SCORE;
    }
    let optional = skills.matched_optional.len() + skills.missing_optional.len();
    percent(
        70.0 * skills.matched_required.len() as f64 / required as f64
            + 30.0 * skills.matched_optional.len() as f64 / optional.max(1) as f64,
    )
}

fn overall_score(skill: u8, tool: u8, keyword: u8) -> u8 {
    percent(0.4 * skill as f64 + 0.25 * tool as f64 + 0.35 * keyword as f64)
}

fn keyword_density(tokens: &[String], matched: &[String]) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }
    let hits: usize = matched.iter().map(|kw| count_phrase(tokens, kw)).sum();
    let density = 100.0 * hits as f64 / tokens.len() as f64;
    (density * 100.0).round() / 100.0
}

fn analyze_role(profile: &ResumeProfile, role: &RoleKnowledge) -> AtsAnalysisResult {
    let (matched_required, missing_required) = partition(role.required_skills, &profile.skills);
    let (matched_optional, missing_optional) = partition(role.optional_skills, &profile.skills);
    let skill_terms: Vec<&str> = role
        .required_skills
        .iter()
        .chain(role.optional_skills.iter())
        .copied()
        .collect();
    let skills = SkillAnalysis {
        matched_required,
        missing_required,
        matched_optional,
        missing_optional,
        extra: extras(&profile.skills, &skill_terms),
    };

    let (matched_tools, missing_tools) = partition(role.tools, &profile.tools);
    let tools = ToolAnalysis {
        matched: matched_tools,
        missing: missing_tools,
        extra: extras(&profile.tools, role.tools),
    };

    let user_terms = profile.all_terms();
    let (matched_keywords, missing_keywords): (Vec<&str>, Vec<&str>) =
        role.keywords.iter().copied().partition(|kw| {
            corpus_contains(&profile.tokens, kw) || covered_by_any(kw, &user_terms)
        });
    let matched_keywords: Vec<String> = matched_keywords.into_iter().map(str::to_string).collect();
    let keywords = KeywordAnalysis {
        density: keyword_density(&profile.tokens, &matched_keywords),
        matched: matched_keywords,
        missing: missing_keywords.into_iter().map(str::to_string).collect(),
    };

    let skill_match = skill_score(&skills);
    let tool_match = ratio_score(tools.matched.len(), role.tools.len());
    let keyword_match = ratio_score(keywords.matched.len(), role.keywords.len());
    let scores = AtsScores {
        skill_match,
        tool_match,
        keyword_match,
        overall_match: overall_score(skill_match, tool_match, keyword_match),
    };

    let recommendations = role_recommendations(role, &skills, &tools, &keywords, profile);
    let warnings = role_warnings(role, &skills, &tools, &scores);

    let mut tips: Vec<String> = role.tips.iter().map(|t| t.to_string()).collect();
    tips.extend(role.formatting.style_notes.iter().map(|n| n.to_string()));
    tips.extend(role.common_mistakes.iter().map(|m| format!("Avoid: {m}")));

    AtsAnalysisResult {
        role_found: true,
        role_id: Some(role.id.to_string()),
        role_name: role.name.to_string(),
        skills,
        tools,
        keywords,
        scores,
        recommendations,
        warnings,
        tips: dedupe(tips),
    }
}

fn analyze_generic(profile: &ResumeProfile, target_role: &str) -> AtsAnalysisResult {
    let (matched, missing): (Vec<&str>, Vec<&str>) = GENERIC_ACTION_VERBS
        .iter()
        .copied()
        .partition(|verb| contains_phrase(&profile.tokens, verb));
    let matched: Vec<String> = matched.into_iter().map(str::to_string).collect();
    let missing: Vec<String> = missing.into_iter().map(str::to_string).collect();

    let keyword_match = ratio_score(matched.len(), GENERIC_ACTION_VERBS.len());
    let scores = AtsScores {
        skill_match: NEUTRAL_SCORE,
        tool_match: NEUTRAL_SCORE,
        keyword_match,
        overall_match: NEUTRAL_SCORE,
    };

    let mut recommendations = Vec::new();
    if !missing.is_empty() {
        recommendations.push(format!(
            "Use strong action verbs such as: {}",
            top(&missing).join(", ")
        ));
    }
    recommendations.push(
        "Quantify results with numbers: percentages, revenue, time saved, or team size".to_string(),
    );
    recommendations.push(length_recommendation(profile.tokens.len(), 1));

    let role_name = target_role.trim().to_string();
    let warnings = vec![format!(
        "Role '{role_name}' was not recognized; showing a generic analysis. Pick a listed role for targeted results."
    )];

    AtsAnalysisResult {
        role_found: false,
        role_id: None,
        role_name,
        skills: SkillAnalysis {
            extra: profile.skills.clone(),
            ..SkillAnalysis::default()
        },
        tools: ToolAnalysis {
            extra: profile.tools.clone(),
            ..ToolAnalysis::default()
        },
        keywords: KeywordAnalysis {
            density: keyword_density(&profile.tokens, &matched),
            matched,
            missing,
        },
        scores,
        recommendations: dedupe(recommendations),
        warnings,
        tips: GENERIC_TIPS.iter().map(|t| t.to_string()).collect(),
    }
}

fn top(items: &[String]) -> Vec<&str> {
    items.iter().take(TOP_N).map(String::as_str).collect()
}

fn role_recommendations(
    role: &RoleKnowledge,
    skills: &SkillAnalysis,
    tools: &ToolAnalysis,
    keywords: &KeywordAnalysis,
    profile: &ResumeProfile,
) -> Vec<String> {
    let mut lines = Vec::new();

    if !skills.missing_required.is_empty() {
        lines.push(format!(
            "Add these required skills if you have them: {}",
            top(&skills.missing_required).join(", ")
        ));
    }
    if !tools.missing.is_empty() {
        lines.push(format!(
            "Mention hands-on experience with tools such as: {}",
            top(&tools.missing).join(", ")
        ));
    }
    if !keywords.missing.is_empty() {
        lines.push(format!(
            "Work these keywords into your experience bullets: {}",
            top(&keywords.missing).join(", ")
        ));
    }
    if skills.matched_required.len() > 5 {
        lines.push(format!(
            "Strong coverage of required skills ({} matched); keep them prominent in your skills section",
            skills.matched_required.len()
        ));
    }
    if !role.action_verbs.is_empty() {
        let verbs: Vec<&str> = role.action_verbs.iter().take(5).copied().collect();
        lines.push(format!(
            "Start bullets with action verbs like: {}",
            verbs.join(", ")
        ));
    }
    if !role.metrics.is_empty() {
        let metrics: Vec<&str> = role.metrics.iter().take(TOP_N).copied().collect();
        lines.push(format!(
            "Quantify your impact with metrics such as: {}",
            metrics.join(", ")
        ));
    }

    let mut lines = dedupe(lines);
    lines.push(length_recommendation(
        profile.tokens.len(),
        role.formatting.max_pages,
    ));
    lines
}

fn length_recommendation(word_count: usize, max_pages: u8) -> String {
    let max_pages = usize::from(max_pages.max(1));
    let pages = |n: usize| if n == 1 { "page" } else { "pages" };
    let estimated = word_count.div_ceil(WORDS_PER_PAGE).max(1);

    if word_count < THIN_RESUME_WORDS {
        format!(
            "Your resume looks thin ({word_count} words); expand it toward {max_pages} {} with detail on scope and results",
            pages(max_pages)
        )
    } else if estimated > max_pages {
        format!(
            "Condense your resume to {max_pages} {}; the current content runs about {estimated} {}",
            pages(max_pages),
            pages(estimated)
        )
    } else {
        format!(
            "Keep your resume within {max_pages} {}; the current length fits",
            pages(max_pages)
        )
    }
}

fn role_warnings(
    role: &RoleKnowledge,
    skills: &SkillAnalysis,
    tools: &ToolAnalysis,
    scores: &AtsScores,
) -> Vec<String> {
    let mut warnings = Vec::new();
    if skills.missing_required.len() > skills.matched_required.len() {
        warnings.push(format!(
            "Major skill gap: {} of {} required skills for {} are missing",
            skills.missing_required.len(),
            role.required_skills.len(),
            role.name
        ));
    }
    if scores.overall_match < 40 {
        warnings.push(format!(
            "Low match: overall score {}/100 suggests this resume is not yet tailored for {}",
            scores.overall_match, role.name
        ));
    }
    if tools.matched.is_empty() && !role.tools.is_empty() {
        warnings.push(format!(
            "No matching tools found; {} postings usually expect tools like {}",
            role.name,
            role.tools.iter().take(TOP_N).copied().collect::<Vec<_>>().join(", ")
        ));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ats::models::{ExperienceEntry, ProjectEntry};

    fn skills_only(skills: &[&str]) -> ResumeInput {
        ResumeInput {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..ResumeInput::default()
        }
    }

    fn rich_resume() -> ResumeInput {
        ResumeInput {
            summary: Some(
                "Software engineer focused on scalable production systems and api design."
                    .to_string(),
            ),
            experience: vec![ExperienceEntry {
                title: "Software Engineer".to_string(),
                company: "Acme".to_string(),
                bullets: vec![
                    "Developed Python microservices on AWS with Docker, cutting latency by 40%"
                        .to_string(),
                    "Led code review for a team of 6 and improved deployment frequency".to_string(),
                    "Wrote unit tests and debugging guides; used Git and Jenkins daily".to_string(),
                ],
            }],
            projects: vec![ProjectEntry {
                name: "Queue".to_string(),
                description: "Built a performance-focused job queue in Java with SQL storage"
                    .to_string(),
                technologies: vec!["Java".to_string(), "PostgreSQL".to_string()],
            }],
            ..ResumeInput::default()
        }
    }

    #[test]
    fn test_three_of_eight_required_skills_scores_26() {
        let result = analyze(&skills_only(&["Python", "Git", "Testing"]), "software_engineer");

        assert!(result.role_found);
        assert_eq!(result.skills.matched_required.len(), 3);
        assert_eq!(result.skills.missing_required.len(), 5);
        assert!(result.skills.matched_optional.is_empty());
        assert_eq!(result.skills.missing_optional.len(), 9);
        assert_eq!(result.scores.skill_match, 26);
    }

    #[test]
    fn test_skill_gap_and_low_match_warnings() {
        let result = analyze(&skills_only(&["Python", "Git", "Testing"]), "software_engineer");
        assert!(result.warnings.iter().any(|w| w.starts_with("Major skill gap")));
        assert!(result.warnings.iter().any(|w| w.starts_with("Low match")));
    }

    #[test]
    fn test_no_tools_warning_when_role_expects_tools() {
        let result = analyze(&skills_only(&["Statistics"]), "data_scientist");
        assert!(result.tools.matched.is_empty());
        assert!(result.warnings.iter().any(|w| w.starts_with("No matching tools")));
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let input = rich_resume();
        let first = analyze(&input, "Software Engineer");
        let second = analyze(&input, "Software Engineer");
        assert_eq!(first, second);
    }

    #[test]
    fn test_scores_always_within_bounds() {
        let inputs = [
            ResumeInput::default(),
            rich_resume(),
            skills_only(&["Python", "Java", "Data Structures", "Algorithms", "Git", "Testing", "System Design", "SQL", "Docker", "Kubernetes"]),
        ];
        for input in &inputs {
            for role in ["software_engineer", "ux_designer", "marketing_manager", "nope-role-123"] {
                let s = analyze(input, role).scores;
                for score in [s.skill_match, s.tool_match, s.keyword_match, s.overall_match] {
                    assert!(score <= 100, "{role}: {score}");
                }
            }
        }
    }

    #[test]
    fn test_unknown_role_falls_back_to_generic_analysis() {
        let result = analyze(&rich_resume(), "totally-unknown-role-xyz");

        assert!(!result.role_found);
        assert!(result.role_id.is_none());
        assert_eq!(result.scores.overall_match, 50);
        assert!(!result.warnings.is_empty());
        assert!(result.warnings[0].contains("not recognized"));
        // "developed", "led", "improved" appear in the bullets.
        assert_eq!(result.keywords.matched, vec!["led", "developed", "improved"]);
        assert_eq!(result.scores.keyword_match, 30);
        assert!(result.skills.missing_required.is_empty());
        assert!(!result.skills.extra.is_empty());
    }

    #[test]
    fn test_full_coverage_scores_high() {
        let input = ResumeInput {
            summary: Some(
                "scalable code review architecture performance debugging deployment production unit tests api cross-functional"
                    .to_string(),
            ),
            skills: vec![
                "Python", "Java", "Data Structures", "Algorithms", "Git", "Testing",
                "System Design", "SQL", "Docker", "Kubernetes", "AWS", "CI/CD",
                "Microservices", "REST APIs", "Agile", "Linux", "TypeScript",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            tools: vec!["GitHub", "Jira", "VS Code", "Docker", "Jenkins", "Postman"]
                .into_iter()
                .map(String::from)
                .collect(),
            ..ResumeInput::default()
        };
        let result = analyze(&input, "software_engineer");
        assert_eq!(result.scores.skill_match, 100);
        assert_eq!(result.scores.tool_match, 100);
        assert_eq!(result.scores.keyword_match, 100);
        assert_eq!(result.scores.overall_match, 100);
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.starts_with("Strong coverage")));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_keywords_match_inflected_and_hyphenated_forms() {
        let input = ResumeInput {
            summary: Some(
                "Owned deployments of production-grade services, tuned performance-critical paths, and built scalability into the architecture"
                    .to_string(),
            ),
            ..ResumeInput::default()
        };
        let result = analyze(&input, "software_engineer");
        assert_eq!(
            result.keywords.matched,
            vec!["architecture", "performance", "deployment", "production"]
        );
        assert!(!result.keywords.missing.contains(&"deployment".to_string()));
        assert_eq!(result.scores.keyword_match, 40);
    }

    #[test]
    fn test_skills_are_extracted_from_text_when_not_supplied() {
        let result = analyze(&rich_resume(), "software_engineer");
        assert!(result.skills.matched_required.contains(&"Python".to_string()));
        assert!(result.skills.matched_required.contains(&"Java".to_string()));
        assert!(result.tools.matched.contains(&"Docker".to_string()));
        assert!(result.tools.matched.contains(&"Jenkins".to_string()));
        assert!(result.keywords.matched.contains(&"code review".to_string()));
        assert!(result.keywords.density > 0.0);
    }

    #[test]
    fn test_recommendations_end_with_length_advice() {
        let result = analyze(&skills_only(&["Python"]), "backend_developer");
        let last = result.recommendations.last().unwrap();
        assert!(last.contains("thin"), "{last}");
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.starts_with("Start bullets with action verbs like: Architected, Built, Scaled, Optimized, Designed")));
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.contains("requests per second, p99 latency, error rate")));
    }

    #[test]
    fn test_missing_skill_hint_lists_top_three() {
        let result = analyze(&skills_only(&["Python"]), "software_engineer");
        assert_eq!(
            result.recommendations[0],
            "Add these required skills if you have them: Java, Data Structures, Algorithms"
        );
    }

    #[test]
    fn test_length_recommendation_condense_and_fit() {
        assert!(length_recommendation(1_200, 1).starts_with("Condense your resume to 1 page"));
        assert!(length_recommendation(400, 1).starts_with("Keep your resume within 1 page"));
        assert!(length_recommendation(800, 2).contains("2 pages"));
    }

    #[test]
    fn test_extra_skills_are_reported() {
        let result = analyze(&skills_only(&["Python", "Welding"]), "software_engineer");
        assert_eq!(result.skills.extra, vec!["Welding"]);
    }
}
