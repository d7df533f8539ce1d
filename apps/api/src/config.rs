use std::str::FromStr;

use anyhow::{Context, Result};

use crate::failover::FailoverConfig;

/// Application configuration loaded from environment variables.
/// Every variable is optional; a missing `ANTHROPIC_API_KEY` starts the
/// service in rule-based mode.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub failover: FailoverConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = FailoverConfig::default();
        let failover = FailoverConfig {
            max_retries: parse_or(&lookup, "AI_MAX_RETRIES", defaults.max_retries)?,
            retry_delay_ms: parse_or(&lookup, "AI_RETRY_DELAY_MS", defaults.retry_delay_ms)?,
            health_check_interval_ms: parse_or(
                &lookup,
                "AI_HEALTH_CHECK_INTERVAL_MS",
                defaults.health_check_interval_ms,
            )?,
            health_check_timeout_ms: parse_or(
                &lookup,
                "AI_HEALTH_CHECK_TIMEOUT_MS",
                defaults.health_check_timeout_ms,
            )?,
            fallback_threshold: parse_or(
                &lookup,
                "AI_FALLBACK_THRESHOLD",
                defaults.fallback_threshold,
            )?,
            ai_timeout_ms: parse_or(&lookup, "AI_TIMEOUT_MS", defaults.ai_timeout_ms)?,
        };
        failover
            .validate()
            .context("Failover settings in the environment are invalid")?;

        Ok(Config {
            anthropic_api_key: lookup("ANTHROPIC_API_KEY")
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            failover,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
