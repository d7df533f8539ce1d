use std::sync::Arc;

use crate::config::Config;
use crate::failover::FailoverController;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` when no API key is configured; the AI path then fails fast.
    pub llm: Option<LlmClient>,
    /// One controller per process; every AI-backed handler goes through it.
    pub failover: Arc<FailoverController>,
}
