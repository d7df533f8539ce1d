//! Matching primitives for the rule engine: normalization, fuzzy containment,
//! and regex-based skill/tool extraction from free text.
//!
//! Everything here is pure and order-preserving so identical input always
//! yields identical output.

use std::sync::LazyLock;

use regex::Regex;

/// Shortest term allowed to match by substring containment. Shorter terms
/// ("c", "go", "r") only match by equality or shared token.
const MIN_CONTAINMENT_LEN: usize = 3;

/// Lowercases, trims, and collapses internal whitespace.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Splits normalized text into tokens, stripping surrounding punctuation but
/// keeping inner symbols so `c++`, `node.js` and `ci/cd` survive.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .map(|t| {
            t.trim_matches(|c: char| {
                matches!(
                    c,
                    ',' | ';' | ':' | '(' | ')' | '[' | ']' | '!' | '?' | '"' | '\'' | '.'
                )
            })
        })
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// True if `user_term` covers `role_term`: equal, one contains the other, or
/// they share a whitespace-split token. Case- and whitespace-insensitive.
pub fn fuzzy_match(user_term: &str, role_term: &str) -> bool {
    let user = normalize(user_term);
    let role = normalize(role_term);
    if user.is_empty() || role.is_empty() {
        return false;
    }
    if user == role {
        return true;
    }

    let shorter = user.len().min(role.len());
    if shorter >= MIN_CONTAINMENT_LEN && (user.contains(&role) || role.contains(&user)) {
        return true;
    }

    user.split(' ').any(|ut| role.split(' ').any(|rt| ut == rt))
}

pub fn covered_by_any(term: &str, pool: &[String]) -> bool {
    pool.iter().any(|candidate| fuzzy_match(candidate, term))
}

/// Splits `role_terms` into (matched, missing) against the user's terms,
/// preserving the role's ordering.
pub fn partition(role_terms: &[&str], user_terms: &[String]) -> (Vec<String>, Vec<String>) {
    let mut matched = Vec::new();
    let mut missing = Vec::new();
    for &term in role_terms {
        if covered_by_any(term, user_terms) {
            matched.push(term.to_string());
        } else {
            missing.push(term.to_string());
        }
    }
    (matched, missing)
}

/// User terms that no role term covers.
pub fn extras(user_terms: &[String], role_terms: &[&str]) -> Vec<String> {
    user_terms
        .iter()
        .filter(|user| !role_terms.iter().any(|role| fuzzy_match(user, role)))
        .cloned()
        .collect()
}

/// Drops blanks and case-insensitive duplicates, keeping first occurrence.
pub fn dedupe(terms: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for term in terms {
        let trimmed = term.trim();
        if trimmed.is_empty() {
            continue;
        }
        let key = normalize(trimmed);
        if !seen.contains(&key) {
            seen.push(key);
            out.push(trimmed.to_string());
        }
    }
    out
}

/// True if the token sequence of `phrase` occurs contiguously in `corpus_tokens`.
pub fn contains_phrase(corpus_tokens: &[String], phrase: &str) -> bool {
    count_phrase(corpus_tokens, phrase) > 0
}

pub fn count_phrase(corpus_tokens: &[String], phrase: &str) -> usize {
    let phrase_tokens = tokenize(phrase);
    if phrase_tokens.is_empty() || phrase_tokens.len() > corpus_tokens.len() {
        return 0;
    }
    corpus_tokens
        .windows(phrase_tokens.len())
        .filter(|window| *window == phrase_tokens.as_slice())
        .count()
}

/// True if `token` contains `term` starting at a word boundary: the start of
/// the token or just after a non-alphanumeric character. Terms shorter than
/// the containment minimum must equal the token.
fn token_contains(token: &str, term: &str) -> bool {
    if token == term {
        return true;
    }
    if term.len() < MIN_CONTAINMENT_LEN {
        return false;
    }
    token.match_indices(term).any(|(at, _)| {
        token[..at]
            .chars()
            .next_back()
            .map_or(true, |prev| !prev.is_alphanumeric())
    })
}

/// Fuzzy phrase containment over free text: each token of `phrase` must be
/// contained in the matching token of a contiguous window. "deployments"
/// covers `deployment`, "production-grade" covers `production`, and
/// "code reviews" covers `code review`.
pub fn corpus_contains(corpus_tokens: &[String], phrase: &str) -> bool {
    let phrase_tokens = tokenize(phrase);
    if phrase_tokens.is_empty() || phrase_tokens.len() > corpus_tokens.len() {
        return false;
    }
    corpus_tokens.windows(phrase_tokens.len()).any(|window| {
        window
            .iter()
            .zip(&phrase_tokens)
            .all(|(token, term)| token_contains(token, term))
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Regex extraction
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermCategory {
    Language,
    Framework,
    Database,
    Cloud,
    DevOps,
    SoftSkill,
}

impl TermCategory {
    fn is_skill(self) -> bool {
        matches!(
            self,
            TermCategory::Language | TermCategory::Framework | TermCategory::SoftSkill
        )
    }
}

pub struct TermPattern {
    pub term: &'static str,
    pub category: TermCategory,
    pub regex: Regex,
}

const PATTERN_SOURCES: &[(&str, TermCategory, &str)] = &[
    // Languages
    ("Python", TermCategory::Language, r"\bpython\b"),
    ("Java", TermCategory::Language, r"\bjava\b"),
    ("JavaScript", TermCategory::Language, r"\bjavascript\b|\bjs\b"),
    ("TypeScript", TermCategory::Language, r"\btypescript\b"),
    ("Go", TermCategory::Language, r"\bgolang\b|\bgo\s+(?:language|services?|microservices)\b"),
    ("Rust", TermCategory::Language, r"\brust\b"),
    ("C++", TermCategory::Language, r"\bc\+\+"),
    ("C#", TermCategory::Language, r"\bc#"),
    ("Ruby", TermCategory::Language, r"\bruby\b"),
    ("PHP", TermCategory::Language, r"\bphp\b"),
    ("Kotlin", TermCategory::Language, r"\bkotlin\b"),
    ("Swift", TermCategory::Language, r"\bswift\b"),
    ("SQL", TermCategory::Language, r"\bsql\b"),
    ("R", TermCategory::Language, r"\br\s+(?:programming|language|studio)\b|\brstudio\b"),
    ("HTML", TermCategory::Language, r"\bhtml5?\b"),
    ("CSS", TermCategory::Language, r"\bcss3?\b"),
    // Frameworks
    ("React", TermCategory::Framework, r"\breact(?:\.js|js)?\b"),
    ("Angular", TermCategory::Framework, r"\bangular(?:js)?\b"),
    ("Vue", TermCategory::Framework, r"\bvue(?:\.js|js)?\b"),
    ("Next.js", TermCategory::Framework, r"\bnext\.js\b|\bnextjs\b"),
    ("Node.js", TermCategory::Framework, r"\bnode(?:\.js|js)?\b"),
    ("Express", TermCategory::Framework, r"\bexpress(?:\.js|js)?\b"),
    ("Django", TermCategory::Framework, r"\bdjango\b"),
    ("Flask", TermCategory::Framework, r"\bflask\b"),
    ("Spring Boot", TermCategory::Framework, r"\bspring(?:\s+boot)?\b"),
    ("TensorFlow", TermCategory::Framework, r"\btensorflow\b"),
    ("PyTorch", TermCategory::Framework, r"\bpytorch\b"),
    ("Pandas", TermCategory::Framework, r"\bpandas\b"),
    ("Scikit-learn", TermCategory::Framework, r"\bscikit-learn\b|\bsklearn\b"),
    // Databases
    ("PostgreSQL", TermCategory::Database, r"\bpostgres(?:ql)?\b"),
    ("MySQL", TermCategory::Database, r"\bmysql\b"),
    ("MongoDB", TermCategory::Database, r"\bmongo(?:db)?\b"),
    ("Redis", TermCategory::Database, r"\bredis\b"),
    ("Elasticsearch", TermCategory::Database, r"\belasticsearch\b"),
    ("DynamoDB", TermCategory::Database, r"\bdynamodb\b"),
    // Cloud platforms
    ("AWS", TermCategory::Cloud, r"\baws\b|\bamazon web services\b"),
    ("Azure", TermCategory::Cloud, r"\bazure\b"),
    ("GCP", TermCategory::Cloud, r"\bgcp\b|\bgoogle cloud\b"),
    // DevOps tools
    ("Docker", TermCategory::DevOps, r"\bdocker\b"),
    ("Kubernetes", TermCategory::DevOps, r"\bkubernetes\b|\bk8s\b"),
    ("Terraform", TermCategory::DevOps, r"\bterraform\b"),
    ("Jenkins", TermCategory::DevOps, r"\bjenkins\b"),
    ("GitHub Actions", TermCategory::DevOps, r"\bgithub actions\b"),
    ("Git", TermCategory::DevOps, r"\bgit\b"),
    ("Ansible", TermCategory::DevOps, r"\bansible\b"),
    ("Prometheus", TermCategory::DevOps, r"\bprometheus\b"),
    ("Grafana", TermCategory::DevOps, r"\bgrafana\b"),
    ("CI/CD", TermCategory::DevOps, r"\bci/cd\b|\bcontinuous integration\b"),
    ("Jira", TermCategory::DevOps, r"\bjira\b"),
    ("Figma", TermCategory::DevOps, r"\bfigma\b"),
    ("Tableau", TermCategory::DevOps, r"\btableau\b"),
    ("Excel", TermCategory::DevOps, r"\bexcel\b"),
    // Soft skills
    ("Leadership", TermCategory::SoftSkill, r"\blead(?:ership|ing)?\s+(?:a\s+)?team|\bleadership\b"),
    ("Communication", TermCategory::SoftSkill, r"\bcommunicat(?:ion|ed|ing)\b"),
    ("Collaboration", TermCategory::SoftSkill, r"\bcollaborat(?:ion|ed|ing)\b|\bcross-functional\b"),
    ("Problem Solving", TermCategory::SoftSkill, r"\bproblem[-\s]solving\b"),
    ("Mentoring", TermCategory::SoftSkill, r"\bmentor(?:ing|ed)?\b"),
    ("Project Management", TermCategory::SoftSkill, r"\bproject management\b"),
    ("Stakeholder Management", TermCategory::SoftSkill, r"\bstakeholders?\b"),
];

static TERM_PATTERNS: LazyLock<Vec<TermPattern>> = LazyLock::new(|| {
    PATTERN_SOURCES
        .iter()
        .filter_map(|&(term, category, source)| {
            Regex::new(&format!("(?i){source}"))
                .ok()
                .map(|regex| TermPattern {
                    term,
                    category,
                    regex,
                })
        })
        .collect()
});

fn extract(corpus: &str, want_skill: bool) -> Vec<String> {
    TERM_PATTERNS
        .iter()
        .filter(|p| p.category.is_skill() == want_skill)
        .filter(|p| p.regex.is_match(corpus))
        .map(|p| p.term.to_string())
        .collect()
}

/// Languages, frameworks and soft skills mentioned in `corpus`, in pattern order.
pub fn extract_skills(corpus: &str) -> Vec<String> {
    extract(corpus, true)
}

/// Databases, cloud platforms and tooling mentioned in `corpus`, in pattern order.
pub fn extract_tools(corpus: &str) -> Vec<String> {
    extract(corpus, false)
}
