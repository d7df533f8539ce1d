//! Rule-based bullet rewriting. Pure: the same bullets and role always give
//! the same output, so it can stand in for the AI rewrite synchronously.
//!
//! Per bullet:
//! 1. A leading weak opener ("worked on", "responsible for", ...) is replaced
//!    with the next role action verb, round-robin across the batch. A one-word
//!    opener directly followed by a number ("Supported 30 guests") is kept,
//!    since the number is its object; the bullet gets a suggestion instead.
//! 2. The first letter is capitalized and trailing punctuation dropped.
//! 3. Bullets without a number, percentage or currency amount get a
//!    suggestion naming the role's first metric to highlight.

use serde::{Deserialize, Serialize};

use crate::ats::engine::GENERIC_ACTION_VERBS;
use crate::ats::knowledge::{find_role, RoleKnowledge};

/// Longest first, so "was responsible for" wins over "responsible for".
const WEAK_OPENERS: &[&str] = &[
    "was responsible for",
    "was involved in",
    "responsible for",
    "participated in",
    "contributed to",
    "assisted with",
    "assisted in",
    "in charge of",
    "involved in",
    "took part in",
    "helped with",
    "tasked with",
    "worked with",
    "worked on",
    "supported",
    "assisted",
    "handled",
    "helped",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedBullet {
    pub original: String,
    pub optimized: String,
    pub changed: bool,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletOptimization {
    pub role_found: bool,
    pub role_name: String,
    pub bullets: Vec<OptimizedBullet>,
}

/// Verb pool for a role; generic achievement verbs when the role is unknown.
fn verb_pool(role: Option<&RoleKnowledge>) -> Vec<String> {
    match role {
        Some(role) if !role.action_verbs.is_empty() => {
            role.action_verbs.iter().map(|v| v.to_string()).collect()
        }
        _ => GENERIC_ACTION_VERBS
            .iter()
            .map(|v| capitalize_first(v))
            .collect(),
    }
}

pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Strips list markers in front and sentence punctuation at the end.
fn clean(text: &str) -> &str {
    text.trim_start_matches(|c: char| matches!(c, '-' | '*' | '•' | '·') || c.is_whitespace())
        .trim_end_matches(|c: char| matches!(c, '.' | ';' | ',' | '!') || c.is_whitespace())
}

/// Returns the opener and the remainder when `text` starts with a weak opener
/// followed by a word boundary.
fn split_weak_opener(text: &str) -> Option<(&'static str, &str)> {
    WEAK_OPENERS.iter().find_map(|&opener| {
        let head = text.get(..opener.len())?;
        if !head.eq_ignore_ascii_case(opener) {
            return None;
        }
        let rest = &text[opener.len()..];
        if rest.chars().next().is_some_and(char::is_alphanumeric) {
            return None;
        }
        let rest = rest.trim_start();
        (!rest.is_empty()).then_some((opener, rest))
    })
}

/// A single-verb opener whose object is a count ("handled 200 tickets")
/// cannot take an unrelated replacement verb.
fn governs_number(opener: &str, rest: &str) -> bool {
    !opener.contains(' ') && rest.starts_with(|c: char| c.is_ascii_digit())
}

/// True if the bullet states any measurable outcome.
pub fn is_quantified(text: &str) -> bool {
    text.chars()
        .any(|c| c.is_ascii_digit() || matches!(c, '%' | '$' | '€' | '£'))
}

fn quantify_suggestion(role: Option<&RoleKnowledge>) -> String {
    match role.and_then(|r| r.metrics.first()) {
        Some(metric) => format!("Quantify the outcome, for example with {metric}"),
        None => "Quantify the outcome with a number or percentage".to_string(),
    }
}

pub fn optimize_bullets(bullets: &[String], target_role: &str) -> BulletOptimization {
    let role = find_role(target_role);
    let verbs = verb_pool(role);
    let mut next_verb = 0usize;

    let optimized = bullets
        .iter()
        .map(|original| {
            let cleaned = clean(original);
            if cleaned.is_empty() {
                return OptimizedBullet {
                    original: original.clone(),
                    optimized: String::new(),
                    changed: !original.is_empty(),
                    suggestions: vec!["Empty bullet; remove it or describe an accomplishment".to_string()],
                };
            }

            let mut suggestions = Vec::new();
            let rewritten = match split_weak_opener(cleaned) {
                Some((opener, rest)) if governs_number(opener, rest) => {
                    suggestions.push(format!(
                        "Lead with a stronger verb than \"{opener}\" if it fits"
                    ));
                    capitalize_first(cleaned)
                }
                Some((opener, rest)) => {
                    let verb = &verbs[next_verb % verbs.len()];
                    next_verb += 1;
                    suggestions.push(format!("Replaced weak opener \"{opener}\" with \"{verb}\""));
                    format!("{verb} {rest}")
                }
                None => capitalize_first(cleaned),
            };

            if !is_quantified(&rewritten) {
                suggestions.push(quantify_suggestion(role));
            }

            OptimizedBullet {
                changed: rewritten != *original,
                original: original.clone(),
                optimized: rewritten,
                suggestions,
            }
        })
        .collect();

    BulletOptimization {
        role_found: role.is_some(),
        role_name: role
            .map(|r| r.name.to_string())
            .unwrap_or_else(|| target_role.trim().to_string()),
        bullets: optimized,
    }
}
