//! Data model for the failover controller: mode, status snapshot, config, per-call result.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which path serves (or served) an operation.
///
/// `Ai` only ever appears on a successful `ServiceResult`. At rest the controller
/// is either `Hybrid` (AI tried first, rules as backup) or `RuleBased`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceMode {
    Ai,
    RuleBased,
    Hybrid,
}

impl std::fmt::Display for ServiceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ServiceMode::Ai => "ai",
            ServiceMode::RuleBased => "rule-based",
            ServiceMode::Hybrid => "hybrid",
        };
        f.write_str(label)
    }
}

/// Immutable snapshot of the controller's health bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub mode: ServiceMode,
    pub ai_available: bool,
    pub last_ai_check: Option<DateTime<Utc>>,
    /// Consecutive AI failures; reset to 0 on any AI success.
    pub ai_failure_count: u32,
    pub message: String,
}

impl Default for ServiceStatus {
    fn default() -> Self {
        Self {
            mode: ServiceMode::Hybrid,
            ai_available: true,
            last_ai_check: None,
            ai_failure_count: 0,
            message: "AI service ready; rule-based fallback on standby".to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FailoverError {
    #[error("invalid failover config: {0}")]
    InvalidConfig(String),
}

/// Retry, timeout and demotion policy. Replaced wholesale by `configure`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailoverConfig {
    /// Retry attempts after the first AI attempt fails.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub health_check_interval_ms: u64,
    /// Per-probe timeout; kept at or below `ai_timeout_ms` since probes should be cheap.
    pub health_check_timeout_ms: u64,
    /// Consecutive failures at which the controller demotes to rule-based.
    pub fallback_threshold: u32,
    pub ai_timeout_ms: u64,
}

impl Default for FailoverConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay_ms: 1_000,
            health_check_interval_ms: 60_000,
            health_check_timeout_ms: 5_000,
            fallback_threshold: 3,
            ai_timeout_ms: 30_000,
        }
    }
}

impl FailoverConfig {
    pub fn validate(&self) -> Result<(), FailoverError> {
        if self.fallback_threshold < 1 {
            return Err(FailoverError::InvalidConfig(
                "fallback_threshold must be at least 1".to_string(),
            ));
        }
        if self.health_check_interval_ms == 0 {
            return Err(FailoverError::InvalidConfig(
                "health_check_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.ai_timeout_ms == 0 {
            return Err(FailoverError::InvalidConfig(
                "ai_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.health_check_timeout_ms == 0 || self.health_check_timeout_ms > self.ai_timeout_ms {
            return Err(FailoverError::InvalidConfig(format!(
                "health_check_timeout_ms must be in 1..={} (ai_timeout_ms)",
                self.ai_timeout_ms
            )));
        }
        Ok(())
    }

    /// Returns a copy with every field present in `patch` overwritten.
    pub fn merged(&self, patch: &FailoverConfigPatch) -> Self {
        Self {
            max_retries: patch.max_retries.unwrap_or(self.max_retries),
            retry_delay_ms: patch.retry_delay_ms.unwrap_or(self.retry_delay_ms),
            health_check_interval_ms: patch
                .health_check_interval_ms
                .unwrap_or(self.health_check_interval_ms),
            health_check_timeout_ms: patch
                .health_check_timeout_ms
                .unwrap_or(self.health_check_timeout_ms),
            fallback_threshold: patch.fallback_threshold.unwrap_or(self.fallback_threshold),
            ai_timeout_ms: patch.ai_timeout_ms.unwrap_or(self.ai_timeout_ms),
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn ai_timeout(&self) -> Duration {
        Duration::from_millis(self.ai_timeout_ms)
    }

    pub fn health_check_interval(&self) -> Duration {
        Duration::from_millis(self.health_check_interval_ms)
    }

    pub fn health_check_timeout(&self) -> Duration {
        Duration::from_millis(self.health_check_timeout_ms)
    }
}

/// Partial config accepted by `configure`. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FailoverConfigPatch {
    pub max_retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub health_check_interval_ms: Option<u64>,
    pub health_check_timeout_ms: Option<u64>,
    pub fallback_threshold: Option<u32>,
    pub ai_timeout_ms: Option<u64>,
}

/// Outcome of one `execute` call. Never an error: total failure is `success: false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResult<T> {
    pub success: bool,
    pub data: Option<T>,
    /// Path that produced `data`: `Ai` or `RuleBased`.
    pub mode: ServiceMode,
    pub message: String,
    pub used_fallback: bool,
}

impl<T> ServiceResult<T> {
    pub fn from_ai(data: T, message: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            mode: ServiceMode::Ai,
            message,
            used_fallback: false,
        }
    }

    pub fn from_fallback(data: T, message: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            mode: ServiceMode::RuleBased,
            message,
            used_fallback: true,
        }
    }

    pub fn failed(message: String) -> Self {
        Self {
            success: false,
            data: None,
            mode: ServiceMode::RuleBased,
            message,
            used_fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_mode_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&ServiceMode::RuleBased).unwrap(),
            "\"rule-based\""
        );
        assert_eq!(serde_json::to_string(&ServiceMode::Ai).unwrap(), "\"ai\"");
        let mode: ServiceMode = serde_json::from_str("\"hybrid\"").unwrap();
        assert_eq!(mode, ServiceMode::Hybrid);
    }

    #[test]
    fn test_default_status_is_hybrid_and_available() {
        let status = ServiceStatus::default();
        assert_eq!(status.mode, ServiceMode::Hybrid);
        assert!(status.ai_available);
        assert_eq!(status.ai_failure_count, 0);
        assert!(status.last_ai_check.is_none());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(FailoverConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_threshold_is_rejected() {
        let config = FailoverConfig {
            fallback_threshold: 0,
            ..FailoverConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_health_timeout_above_ai_timeout_is_rejected() {
        let config = FailoverConfig {
            ai_timeout_ms: 1_000,
            health_check_timeout_ms: 2_000,
            ..FailoverConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_only_overwrites_present_fields() {
        let base = FailoverConfig::default();
        let patch = FailoverConfigPatch {
            max_retries: Some(5),
            ai_timeout_ms: Some(10_000),
            ..FailoverConfigPatch::default()
        };
        let merged = base.merged(&patch);
        assert_eq!(merged.max_retries, 5);
        assert_eq!(merged.ai_timeout_ms, 10_000);
        assert_eq!(merged.retry_delay_ms, base.retry_delay_ms);
        assert_eq!(merged.fallback_threshold, base.fallback_threshold);
    }

    #[test]
    fn test_patch_deserializes_from_partial_json() {
        let patch: FailoverConfigPatch =
            serde_json::from_str(r#"{"fallback_threshold": 5}"#).unwrap();
        assert_eq!(patch.fallback_threshold, Some(5));
        assert!(patch.max_retries.is_none());
    }
}
