// Resume bullet optimizer: the rewriting half of the dual-mode engine.
// AI rewrite through llm_client, with the pure rule rewrite as its fallback.

pub mod ai;
pub mod handlers;
pub mod prompts;
pub mod rules;
