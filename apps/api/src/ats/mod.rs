//! ATS (applicant tracking system) matching: the role knowledge base, the
//! deterministic rule engine, and the AI-path adapter that shares its contract.

pub mod ai;
pub mod engine;
pub mod handlers;
pub mod knowledge;
pub mod matching;
pub mod models;
pub mod prompts;
