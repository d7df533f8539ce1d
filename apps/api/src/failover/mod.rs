//! Failover Controller: decides whether an operation is served by the AI backend
//! or by the deterministic rule engine, and tracks AI health between calls.
//!
//! Rest states are `hybrid` (AI first, rules as backup) and `rule-based` (AI skipped).
//! AI errors and timeouts are retried, then counted; once `fallback_threshold`
//! consecutive failures accumulate the controller demotes to `rule-based` until a
//! health check (background or manual) succeeds.
//!
//! Callers only ever see a `ServiceResult`. Nothing inside `execute` is allowed to
//! escape as an error or a panic.

pub mod listeners;
pub mod types;

use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub use listeners::Subscription;
pub use types::{
    FailoverConfig, FailoverConfigPatch, FailoverError, ServiceMode, ServiceResult, ServiceStatus,
};

use listeners::{panic_message, StatusListeners};

/// Lightweight AI reachability probe used by health checks.
///
/// `Ok(false)` and `Err(_)` both count as a failed check.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn ping(&self) -> anyhow::Result<bool>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct FailoverController {
    status: Mutex<ServiceStatus>,
    config: RwLock<FailoverConfig>,
    listeners: StatusListeners,
    /// Held across store and notify so listeners see transitions in commit order.
    notify_order: Mutex<()>,
    probe: Option<Arc<dyn HealthProbe>>,
    monitor: Mutex<Option<JoinHandle<()>>>,
}

impl FailoverController {
    pub fn new(
        config: FailoverConfig,
        probe: Option<Arc<dyn HealthProbe>>,
    ) -> Result<Self, FailoverError> {
        config.validate()?;
        Ok(Self {
            status: Mutex::new(ServiceStatus::default()),
            config: RwLock::new(config),
            listeners: StatusListeners::default(),
            notify_order: Mutex::new(()),
            probe,
            monitor: Mutex::new(None),
        })
    }

    /// Immutable snapshot of the current status.
    pub fn status(&self) -> ServiceStatus {
        lock(&self.status).clone()
    }

    pub fn config(&self) -> FailoverConfig {
        self.config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Merges `patch` over the current config and replaces it wholesale.
    /// An invalid result is rejected and the previous config stays in force.
    pub fn configure(&self, patch: &FailoverConfigPatch) -> Result<FailoverConfig, FailoverError> {
        let mut config = self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let next = config.merged(patch);
        next.validate()?;
        *config = next.clone();
        info!(?next, "Failover config updated");
        Ok(next)
    }

    /// Listeners are called in transition order, one transition at a time.
    /// A listener must not drive the controller into another transition.
    pub fn on_status_change<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ServiceStatus) + Send + Sync + 'static,
    {
        let subscription = self.listeners.subscribe(listener);
        debug!(listeners = self.listeners.len(), "Status listener registered");
        subscription
    }

    /// Runs `ai_operation` with timeout and retries, falling back to `fallback`.
    ///
    /// `ai_operation` is invoked up to `max_retries + 1` times, each attempt raced
    /// against `ai_timeout_ms`. When AI is marked unavailable it is not invoked at all.
    /// `fallback` is synchronous and runs at most once.
    ///
    /// A timed-out attempt is cancelled, not left running: its future is dropped
    /// and any in-flight HTTP request is aborted with it.
    pub async fn execute<T, A, Fut, E, F, FE>(
        &self,
        mut ai_operation: A,
        fallback: F,
        operation_name: &str,
    ) -> ServiceResult<T>
    where
        A: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        F: FnOnce() -> Result<T, FE>,
        FE: Display,
    {
        let config = self.config();

        if !self.status().ai_available {
            debug!(
                operation = operation_name,
                "AI unavailable, skipping straight to rule-based fallback"
            );
            return self.run_fallback(fallback, operation_name, "AI service unavailable");
        }

        let attempts = config.max_retries + 1;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            // Timing out drops the in-flight future, which cancels it at its next await point.
            match tokio::time::timeout(config.ai_timeout(), ai_operation()).await {
                Ok(Ok(data)) => {
                    self.record_success(format!("AI {operation_name} succeeded; hybrid mode active"));
                    return ServiceResult::from_ai(
                        data,
                        format!("{operation_name} completed by AI (attempt {attempt}/{attempts})"),
                    );
                }
                Ok(Err(e)) => last_error = e.to_string(),
                Err(_) => {
                    last_error = format!("AI operation timed out after {}ms", config.ai_timeout_ms)
                }
            }

            warn!(
                operation = operation_name,
                attempt,
                attempts,
                "AI attempt failed: {last_error}"
            );

            if attempt < attempts {
                tokio::time::sleep(config.retry_delay()).await;
            }
        }

        self.record_failure(&last_error);
        self.run_fallback(fallback, operation_name, &last_error)
    }

    fn run_fallback<T, F, FE>(&self, fallback: F, operation_name: &str, reason: &str) -> ServiceResult<T>
    where
        F: FnOnce() -> Result<T, FE>,
        FE: Display,
    {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(fallback)) {
            Ok(Ok(data)) => ServiceResult::from_fallback(
                data,
                format!("{operation_name} completed with rule-based engine ({reason})"),
            ),
            Ok(Err(e)) => {
                error!(operation = operation_name, "Rule-based fallback failed: {e}");
                ServiceResult::failed(format!("Rule-based {operation_name} failed: {e}"))
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(operation = operation_name, "Rule-based fallback panicked: {message}");
                ServiceResult::failed(format!("Rule-based {operation_name} failed: {message}"))
            }
        }
    }

    /// Probes the AI backend with the (short) health-check timeout.
    pub async fn check_ai_health(&self) -> bool {
        let config = self.config();

        let outcome = match &self.probe {
            None => Err("no AI health probe configured".to_string()),
            Some(probe) => {
                match tokio::time::timeout(config.health_check_timeout(), probe.ping()).await {
                    Ok(Ok(true)) => Ok(()),
                    Ok(Ok(false)) => Err("AI health probe reported unhealthy".to_string()),
                    Ok(Err(e)) => Err(format!("AI health probe failed: {e}")),
                    Err(_) => Err(format!(
                        "AI health probe timed out after {}ms",
                        config.health_check_timeout_ms
                    )),
                }
            }
        };

        match outcome {
            Ok(()) => {
                let was_down = !self.status().ai_available;
                self.record_success("AI health check passed; hybrid mode active".to_string());
                if was_down {
                    info!("AI service restored, leaving rule-based mode");
                }
                true
            }
            Err(reason) => {
                debug!("AI health check failed: {reason}");
                self.record_failure(&reason);
                false
            }
        }
    }

    /// Spawns the background health loop: one check immediately, then one per
    /// `health_check_interval_ms`. Restarts the loop if it is already running.
    pub fn start_health_monitoring(self: &Arc<Self>) {
        let mut monitor = lock(&self.monitor);
        if let Some(previous) = monitor.take() {
            previous.abort();
        }

        let controller = Arc::downgrade(self);
        *monitor = Some(tokio::spawn(async move {
            loop {
                let Some(controller) = controller.upgrade() else {
                    break;
                };
                controller.check_ai_health().await;
                // Re-read each cycle so `configure` applies without a restart.
                let interval = controller.config().health_check_interval();
                drop(controller);
                tokio::time::sleep(interval).await;
            }
        }));

        info!(
            interval_ms = self.config().health_check_interval_ms,
            "AI health monitoring started"
        );
    }

    /// Safe to call repeatedly, or without a prior start.
    pub fn stop_health_monitoring(&self) {
        if let Some(handle) = lock(&self.monitor).take() {
            handle.abort();
            info!("AI health monitoring stopped");
        }
    }

    pub fn is_monitoring(&self) -> bool {
        lock(&self.monitor)
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    pub fn force_rule_based_mode(&self) {
        self.transition(|current| ServiceStatus {
            mode: ServiceMode::RuleBased,
            ai_available: false,
            last_ai_check: current.last_ai_check,
            ai_failure_count: current.ai_failure_count,
            message: "Rule-based mode forced manually".to_string(),
        });
        info!("Rule-based mode forced");
    }

    /// Manual restore: a health check with a user-facing result.
    pub async fn try_restore_ai_mode(&self) -> bool {
        let restored = self.check_ai_health().await;
        if restored {
            info!("AI mode restored on request");
        } else {
            warn!("AI mode restore requested but health check failed");
        }
        restored
    }

    fn record_success(&self, message: String) {
        self.transition(|_| ServiceStatus {
            mode: ServiceMode::Hybrid,
            ai_available: true,
            last_ai_check: Some(Utc::now()),
            ai_failure_count: 0,
            message,
        });
    }

    fn record_failure(&self, reason: &str) {
        let threshold = self.config().fallback_threshold;
        let (before, after) = self.transition(|current| {
            let failures = current.ai_failure_count.saturating_add(1);
            if failures >= threshold {
                ServiceStatus {
                    mode: ServiceMode::RuleBased,
                    ai_available: false,
                    last_ai_check: Some(Utc::now()),
                    ai_failure_count: failures,
                    message: format!(
                        "AI unavailable after {failures} consecutive failures ({reason}); using rule-based mode"
                    ),
                }
            } else {
                ServiceStatus {
                    mode: if current.ai_available {
                        ServiceMode::Hybrid
                    } else {
                        ServiceMode::RuleBased
                    },
                    ai_available: current.ai_available,
                    last_ai_check: Some(Utc::now()),
                    ai_failure_count: failures,
                    message: format!("AI failure {failures}/{threshold}: {reason}"),
                }
            }
        });

        if is_demotion(&before, &after) {
            warn!(
                failures = after.ai_failure_count,
                "AI demoted to rule-based mode: {reason}"
            );
        }
    }

    /// Computes and stores the next status under a single lock acquisition, then
    /// notifies listeners (outside the status lock) if anything changed.
    /// Returns the statuses before and after.
    fn transition<F>(&self, next: F) -> (ServiceStatus, ServiceStatus)
    where
        F: FnOnce(&ServiceStatus) -> ServiceStatus,
    {
        let _order = lock(&self.notify_order);
        let (previous, snapshot) = {
            let mut status = lock(&self.status);
            let updated = next(&status);
            let previous = std::mem::replace(&mut *status, updated.clone());
            (previous, updated)
        };

        if snapshot != previous {
            self.listeners.notify(&snapshot);
        }
        (previous, snapshot)
    }
}

/// The AI path went from available to unavailable.
fn is_demotion(before: &ServiceStatus, after: &ServiceStatus) -> bool {
    before.ai_available && !after.ai_available
}

impl Drop for FailoverController {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.monitor).take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    struct ScriptedProbe {
        healthy: AtomicBool,
        pings: AtomicUsize,
    }

    impl ScriptedProbe {
        fn new(healthy: bool) -> Arc<Self> {
            Arc::new(Self {
                healthy: AtomicBool::new(healthy),
                pings: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl HealthProbe for ScriptedProbe {
        async fn ping(&self) -> anyhow::Result<bool> {
            self.pings.fetch_add(1, Ordering::SeqCst);
            Ok(self.healthy.load(Ordering::SeqCst))
        }
    }

    struct HangingProbe;

    #[async_trait]
    impl HealthProbe for HangingProbe {
        async fn ping(&self) -> anyhow::Result<bool> {
            std::future::pending::<()>().await;
            Ok(true)
        }
    }

    fn fast_config(max_retries: u32, fallback_threshold: u32) -> FailoverConfig {
        FailoverConfig {
            max_retries,
            retry_delay_ms: 0,
            health_check_interval_ms: 1_000,
            health_check_timeout_ms: 50,
            fallback_threshold,
            ai_timeout_ms: 100,
        }
    }

    fn controller(config: FailoverConfig) -> FailoverController {
        FailoverController::new(config, None).unwrap()
    }

    async fn failing_execute(
        controller: &FailoverController,
        ai_calls: &AtomicUsize,
        fallback_calls: &AtomicUsize,
    ) -> ServiceResult<u32> {
        controller
            .execute(
                || {
                    ai_calls.fetch_add(1, Ordering::SeqCst);
                    async { Err::<u32, String>("connection refused".to_string()) }
                },
                || {
                    fallback_calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<u32, Infallible>(7)
                },
                "test_op",
            )
            .await
    }

    #[tokio::test]
    async fn test_ai_success_returns_ai_mode() {
        let controller = controller(fast_config(2, 3));
        let result = controller
            .execute(
                || async { Ok::<u32, String>(42) },
                || Ok::<u32, Infallible>(0),
                "test_op",
            )
            .await;

        assert!(result.success);
        assert_eq!(result.data, Some(42));
        assert_eq!(result.mode, ServiceMode::Ai);
        assert!(!result.used_fallback);
        assert_eq!(controller.status().mode, ServiceMode::Hybrid);
    }

    #[tokio::test]
    async fn test_always_failing_ai_is_retried_then_falls_back_once() {
        let controller = controller(fast_config(2, 3));
        let ai_calls = AtomicUsize::new(0);
        let fallback_calls = AtomicUsize::new(0);

        let result = failing_execute(&controller, &ai_calls, &fallback_calls).await;

        assert_eq!(ai_calls.load(Ordering::SeqCst), 3);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
        assert!(result.success);
        assert!(result.used_fallback);
        assert_eq!(result.mode, ServiceMode::RuleBased);
        assert_eq!(result.data, Some(7));
    }

    #[tokio::test]
    async fn test_success_after_retry_resets_failure_count() {
        let controller = controller(fast_config(2, 3));
        let ai_calls = AtomicUsize::new(0);
        let fallback_calls = AtomicUsize::new(0);
        failing_execute(&controller, &ai_calls, &fallback_calls).await;
        assert_eq!(controller.status().ai_failure_count, 1);

        let attempts = AtomicUsize::new(0);
        let result = controller
            .execute(
                || {
                    let n = attempts.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if n == 0 {
                            Err("flaky".to_string())
                        } else {
                            Ok(5u32)
                        }
                    }
                },
                || Ok::<u32, Infallible>(0),
                "test_op",
            )
            .await;

        assert_eq!(result.mode, ServiceMode::Ai);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(controller.status().ai_failure_count, 0);
    }

    #[tokio::test]
    async fn test_failure_count_increases_until_threshold_then_demotes_once() {
        let controller = controller(fast_config(0, 3));
        let demotions = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&demotions);
        let _sub = controller.on_status_change(move |s| {
            if !s.ai_available {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });

        let ai_calls = AtomicUsize::new(0);
        let fallback_calls = AtomicUsize::new(0);
        let mut counts = Vec::new();
        for _ in 0..3 {
            failing_execute(&controller, &ai_calls, &fallback_calls).await;
            counts.push(controller.status().ai_failure_count);
        }

        assert_eq!(counts, vec![1, 2, 3]);
        assert!(!controller.status().ai_available);
        assert_eq!(demotions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_three_failed_calls_demote_and_fourth_skips_ai() {
        let controller = controller(fast_config(2, 3));
        let ai_calls = AtomicUsize::new(0);
        let fallback_calls = AtomicUsize::new(0);

        for _ in 0..3 {
            failing_execute(&controller, &ai_calls, &fallback_calls).await;
        }
        let status = controller.status();
        assert!(!status.ai_available);
        assert_eq!(status.mode, ServiceMode::RuleBased);

        let before = ai_calls.load(Ordering::SeqCst);
        let result = failing_execute(&controller, &ai_calls, &fallback_calls).await;
        assert_eq!(ai_calls.load(Ordering::SeqCst), before);
        assert!(result.used_fallback);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_forced_rule_based_never_invokes_ai() {
        let controller = controller(fast_config(2, 3));
        controller.force_rule_based_mode();

        let ai_calls = AtomicUsize::new(0);
        let fallback_calls = AtomicUsize::new(0);
        let result = failing_execute(&controller, &ai_calls, &fallback_calls).await;

        assert_eq!(ai_calls.load(Ordering::SeqCst), 0);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.mode, ServiceMode::RuleBased);
    }

    #[tokio::test]
    async fn test_force_rule_based_is_idempotent() {
        let controller = controller(fast_config(2, 3));
        let notifications = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notifications);
        let _sub = controller.on_status_change(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        controller.force_rule_based_mode();
        controller.force_rule_based_mode();

        assert_eq!(controller.status().mode, ServiceMode::RuleBased);
        assert_eq!(notifications.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_ai_operation_times_out() {
        let controller = controller(FailoverConfig {
            ai_timeout_ms: 30_000,
            health_check_timeout_ms: 5_000,
            ..fast_config(0, 3)
        });

        let started = tokio::time::Instant::now();
        let result = controller
            .execute(
                || std::future::pending::<Result<u32, String>>(),
                || Ok::<u32, Infallible>(1),
                "test_op",
            )
            .await;

        assert!(result.used_fallback);
        assert_eq!(result.data, Some(1));
        assert!(started.elapsed() >= Duration::from_millis(30_000));
        assert!(started.elapsed() < Duration::from_millis(31_000));
        assert!(controller.status().message.contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_delay_applies_between_attempts_only() {
        let controller = controller(FailoverConfig {
            retry_delay_ms: 500,
            ..fast_config(2, 3)
        });
        let ai_calls = AtomicUsize::new(0);
        let fallback_calls = AtomicUsize::new(0);

        let started = tokio::time::Instant::now();
        failing_execute(&controller, &ai_calls, &fallback_calls).await;

        // Three attempts, two delays.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1_000));
        assert!(elapsed < Duration::from_millis(1_010));
    }

    #[tokio::test]
    async fn test_fallback_error_reports_unsuccessful_result() {
        let controller = controller(fast_config(0, 3));
        let result = controller
            .execute(
                || async { Err::<u32, String>("down".to_string()) },
                || Err::<u32, String>("no data".to_string()),
                "test_op",
            )
            .await;

        assert!(!result.success);
        assert!(result.data.is_none());
        assert!(result.used_fallback);
        assert_eq!(result.mode, ServiceMode::RuleBased);
        assert!(result.message.contains("no data"));
    }

    #[tokio::test]
    async fn test_fallback_panic_is_contained() {
        let controller = controller(fast_config(0, 3));
        controller.force_rule_based_mode();
        let result: ServiceResult<u32> = controller
            .execute(
                || async { Ok::<u32, String>(1) },
                || -> Result<u32, Infallible> { panic!("rule engine bug") },
                "test_op",
            )
            .await;

        assert!(!result.success);
        assert!(result.message.contains("rule engine bug"));
    }

    #[tokio::test]
    async fn test_health_check_success_restores_hybrid() {
        let probe = ScriptedProbe::new(true);
        let controller = FailoverController::new(fast_config(0, 1), Some(probe.clone())).unwrap();
        controller.force_rule_based_mode();

        assert!(controller.try_restore_ai_mode().await);
        let status = controller.status();
        assert_eq!(status.mode, ServiceMode::Hybrid);
        assert!(status.ai_available);
        assert_eq!(status.ai_failure_count, 0);
        assert!(status.last_ai_check.is_some());
    }

    #[tokio::test]
    async fn test_health_check_failure_in_rule_based_stays_rule_based() {
        let probe = ScriptedProbe::new(false);
        let controller = FailoverController::new(fast_config(0, 2), Some(probe.clone())).unwrap();

        assert!(!controller.check_ai_health().await);
        assert_eq!(controller.status().mode, ServiceMode::Hybrid);
        assert!(!controller.check_ai_health().await);
        assert_eq!(controller.status().mode, ServiceMode::RuleBased);
        assert!(!controller.check_ai_health().await);

        let status = controller.status();
        assert_eq!(status.mode, ServiceMode::RuleBased);
        assert_eq!(status.ai_failure_count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_health_probe_uses_short_timeout() {
        let controller =
            FailoverController::new(fast_config(0, 3), Some(Arc::new(HangingProbe))).unwrap();

        let started = tokio::time::Instant::now();
        assert!(!controller.check_ai_health().await);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(50));
        assert!(elapsed < Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_missing_probe_fails_health_check() {
        let controller = controller(fast_config(0, 3));
        assert!(!controller.try_restore_ai_mode().await);
        assert_eq!(controller.status().ai_failure_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_health_monitoring_checks_immediately_then_each_interval() {
        let probe = ScriptedProbe::new(true);
        let controller =
            Arc::new(FailoverController::new(fast_config(0, 3), Some(probe.clone())).unwrap());

        controller.start_health_monitoring();
        assert!(controller.is_monitoring());
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(probe.pings.load(Ordering::SeqCst), 3);

        controller.stop_health_monitoring();
        tokio::time::sleep(Duration::from_millis(5_000)).await;
        assert_eq!(probe.pings.load(Ordering::SeqCst), 3);
        assert!(!controller.is_monitoring());
    }

    #[tokio::test]
    async fn test_stop_without_start_is_safe() {
        let controller = controller(fast_config(0, 3));
        controller.stop_health_monitoring();
        controller.stop_health_monitoring();
        assert!(!controller.is_monitoring());
    }

    #[tokio::test]
    async fn test_configure_rejects_invalid_patch_and_keeps_old_config() {
        let controller = controller(fast_config(2, 3));
        let err = controller.configure(&FailoverConfigPatch {
            fallback_threshold: Some(0),
            ..FailoverConfigPatch::default()
        });
        assert!(err.is_err());
        assert_eq!(controller.config().fallback_threshold, 3);

        let updated = controller
            .configure(&FailoverConfigPatch {
                max_retries: Some(0),
                ..FailoverConfigPatch::default()
            })
            .unwrap();
        assert_eq!(updated.max_retries, 0);
        assert_eq!(controller.config().max_retries, 0);
    }

    #[tokio::test]
    async fn test_panicking_listener_does_not_break_execute() {
        let controller = controller(fast_config(0, 1));
        let _sub = controller.on_status_change(|_| panic!("bad listener"));

        let ai_calls = AtomicUsize::new(0);
        let fallback_calls = AtomicUsize::new(0);
        let result = failing_execute(&controller, &ai_calls, &fallback_calls).await;

        assert!(result.success);
        assert!(!controller.status().ai_available);
    }

    #[test]
    fn test_listeners_see_transitions_in_commit_order() {
        let controller = controller(fast_config(0, 2));
        let last_seen: Arc<Mutex<Option<ServiceStatus>>> = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&last_seen);
        let _sub = controller.on_status_change(move |s| {
            *lock(&sink) = Some(s.clone());
        });

        std::thread::scope(|scope| {
            for worker in 0..8 {
                let controller = &controller;
                scope.spawn(move || {
                    for i in 0..200 {
                        if (worker + i) % 3 == 0 {
                            controller.record_success("health check passed".to_string());
                        } else {
                            controller.record_failure("connection refused");
                        }
                    }
                });
            }
        });

        let last = lock(&last_seen).clone();
        assert_eq!(last, Some(controller.status()));
    }

    #[test]
    fn test_demotion_is_detected_after_threshold_is_lowered_mid_streak() {
        let controller = controller(fast_config(0, 3));
        controller.record_failure("timeout");
        controller.record_failure("timeout");
        let before = controller.status();
        assert!(before.ai_available);

        controller
            .configure(&FailoverConfigPatch {
                fallback_threshold: Some(2),
                ..FailoverConfigPatch::default()
            })
            .unwrap();
        controller.record_failure("timeout");
        let after = controller.status();

        assert_eq!(after.ai_failure_count, 3);
        assert!(is_demotion(&before, &after));
        controller.record_failure("timeout");
        assert!(!is_demotion(&after, &controller.status()));
    }
}
