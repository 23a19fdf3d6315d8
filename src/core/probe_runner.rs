use crate::config::StatusPolicy;
use crate::core::deadline;
use crate::core::probe::Probe;
use crate::domain::health::{CheckResult, Component};
use crate::domain::probe::{ProbeOutput, Verdict};
use crate::error::ProbeError;
use opentelemetry::{
    KeyValue, global,
    metrics::{Gauge, Histogram},
};
use serde_json::Map;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

const UNHEALTHY_FALLBACK: &str = "Probe reported unhealthy status";
const UNREPORTED_STATUS: &str = "Probe did not report a status";

#[derive(Clone, Debug)]
pub struct Metrics {
    pub duration_seconds: Histogram<f64>,
    pub status: Gauge<i64>,
}

impl Metrics {
    #[must_use]
    pub(crate) fn new() -> Self {
        let meter = global::meter("resume-health");
        Self {
            duration_seconds: meter
                .f64_histogram("health_check_duration_seconds")
                .with_description("Duration of dependency health probes")
                .build(),
            status: meter
                .i64_gauge("health_check_status")
                .with_description("Status of dependency health probes (1 for healthy, 0 for unhealthy)")
                .build(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs one probe under a deadline and folds every outcome into a [`CheckResult`].
#[derive(Clone, Debug)]
pub struct ProbeRunner {
    budget: Duration,
    policy: StatusPolicy,
    metrics: Metrics,
}

impl ProbeRunner {
    #[must_use]
    pub fn new(budget: Duration, policy: StatusPolicy) -> Self {
        Self { budget, policy, metrics: Metrics::new() }
    }

    #[must_use]
    pub const fn budget(&self) -> Duration {
        self.budget
    }

    /// Runs `probe` on its own task and waits at most `budget` for it.
    ///
    /// The probe task is cancelled when the deadline fires and also if this
    /// future is dropped early, so it never outlives the request that started it.
    /// Errors, panics and timeouts all come back as unhealthy results.
    pub async fn run(&self, component: Component, probe: Arc<dyn Probe>) -> CheckResult {
        let token = CancellationToken::new();
        let task_token = token.clone();
        let _cancel_on_exit = token.clone().drop_guard();

        let start = Instant::now();
        let handle = tokio::spawn(
            async move {
                tokio::select! {
                    res = probe.check() => Some(res),
                    () = task_token.cancelled() => None,
                }
            }
            .instrument(tracing::info_span!("health_probe", component = %component)),
        );

        let outcome = match deadline::guard(self.budget, handle).await {
            Ok(Ok(Some(res))) => res,
            // The token is only cancelled after the deadline or on drop, neither
            // of which can be observed here.
            Ok(Ok(None)) => Err(ProbeError::Unknown),
            Ok(Err(join_err)) if join_err.is_panic() => Err(ProbeError::from_panic(join_err.into_panic().as_ref())),
            Ok(Err(_)) => Err(ProbeError::Unknown),
            Err(exceeded) => {
                token.cancel();
                Err(ProbeError::Timeout { budget_ms: u64::try_from(exceeded.budget.as_millis()).unwrap_or(u64::MAX) })
            }
        };
        let elapsed = start.elapsed();

        let result = self.normalize(elapsed, outcome);

        let attrs = [KeyValue::new("component", component.as_str())];
        self.metrics.duration_seconds.record(elapsed.as_secs_f64(), &attrs);
        self.metrics.status.record(i64::from(result.status().is_healthy()), &attrs);

        tracing::debug!(
            component = %component,
            status = %result.status(),
            latency_ms = result.latency_ms(),
            "Probe settled"
        );

        result
    }

    fn normalize(&self, elapsed: Duration, outcome: Result<ProbeOutput, ProbeError>) -> CheckResult {
        match outcome {
            Ok(ProbeOutput { verdict: Verdict::Healthy, details }) => CheckResult::healthy(elapsed, details),
            Ok(ProbeOutput { verdict: Verdict::Unhealthy(message), details }) => {
                CheckResult::unhealthy(elapsed, message.unwrap_or_else(|| UNHEALTHY_FALLBACK.to_string()), details)
            }
            Ok(ProbeOutput { verdict: Verdict::Unreported, details }) => match self.policy {
                StatusPolicy::Lenient => CheckResult::healthy(elapsed, details),
                StatusPolicy::Strict => CheckResult::unhealthy(elapsed, UNREPORTED_STATUS, details),
            },
            Err(e) => CheckResult::unhealthy(elapsed, e.to_string(), Map::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::health::HealthStatus;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FnProbe<F>(F);

    #[async_trait]
    impl<F> Probe for FnProbe<F>
    where
        F: Fn() -> crate::error::Result<ProbeOutput> + Send + Sync + 'static,
    {
        async fn check(&self) -> crate::error::Result<ProbeOutput> {
            (self.0)()
        }
    }

    fn from_fn<F>(f: F) -> Arc<dyn Probe>
    where
        F: Fn() -> crate::error::Result<ProbeOutput> + Send + Sync + 'static,
    {
        Arc::new(FnProbe(f))
    }

    struct SleepyProbe(Duration);

    #[async_trait]
    impl Probe for SleepyProbe {
        async fn check(&self) -> crate::error::Result<ProbeOutput> {
            tokio::time::sleep(self.0).await;
            Ok(ProbeOutput::healthy())
        }
    }

    struct SetOnDrop(Arc<AtomicBool>);

    impl Drop for SetOnDrop {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    struct HangingProbe(Arc<AtomicBool>);

    #[async_trait]
    impl Probe for HangingProbe {
        async fn check(&self) -> crate::error::Result<ProbeOutput> {
            let _flag = SetOnDrop(Arc::clone(&self.0));
            std::future::pending::<()>().await;
            Ok(ProbeOutput::healthy())
        }
    }

    fn runner(budget_ms: u64) -> ProbeRunner {
        ProbeRunner::new(Duration::from_millis(budget_ms), StatusPolicy::Lenient)
    }

    #[tokio::test]
    async fn test_healthy_value_merges_details() {
        let probe = from_fn(|| Ok(ProbeOutput::from_json(json!({ "type": "s3", "bucket": "resumes" }))));
        let result = runner(1500).run(Component::Storage, probe).await;

        assert_eq!(result.status(), HealthStatus::Healthy);
        assert!(result.error().is_none());
        assert_eq!(result.extra().get("type"), Some(&json!("s3")));
        assert_eq!(result.extra().get("bucket"), Some(&json!("resumes")));
    }

    #[tokio::test]
    async fn test_unhealthy_marker_keeps_message() {
        let probe = from_fn(|| Ok(ProbeOutput::from_json(json!({ "status": "unhealthy", "error": "no bucket" }))));
        let result = runner(1500).run(Component::Storage, probe).await;

        assert_eq!(result.status(), HealthStatus::Unhealthy);
        assert_eq!(result.error(), Some("no bucket"));
    }

    #[tokio::test]
    async fn test_unhealthy_marker_without_message() {
        let probe = from_fn(|| Ok(ProbeOutput::from_json(json!({ "status": "unhealthy" }))));
        let result = runner(1500).run(Component::Printer, probe).await;

        assert_eq!(result.error(), Some(UNHEALTHY_FALLBACK));
    }

    #[tokio::test]
    async fn test_strict_policy_rejects_unreported_status() {
        let probe = from_fn(|| Ok(ProbeOutput::from_json(json!({ "Browser": "Chrome" }))));
        let runner = ProbeRunner::new(Duration::from_millis(1500), StatusPolicy::Strict);
        let result = runner.run(Component::Printer, probe).await;

        assert_eq!(result.status(), HealthStatus::Unhealthy);
        assert_eq!(result.error(), Some(UNREPORTED_STATUS));
        assert_eq!(result.extra().get("Browser"), Some(&json!("Chrome")));
    }

    #[tokio::test]
    async fn test_error_becomes_unhealthy() {
        let probe = from_fn(|| Err(ProbeError::Dependency("connection refused".to_string())));
        let result = runner(1500).run(Component::Database, probe).await;

        assert_eq!(result.status(), HealthStatus::Unhealthy);
        assert_eq!(result.error(), Some("connection refused"));
    }

    #[tokio::test]
    async fn test_panic_with_message_is_contained() {
        let probe = from_fn(|| panic!("renderer offline"));
        let result = runner(1500).run(Component::Printer, probe).await;

        assert_eq!(result.status(), HealthStatus::Unhealthy);
        assert_eq!(result.error(), Some("renderer offline"));
    }

    #[tokio::test]
    async fn test_panic_with_opaque_payload() {
        let probe = from_fn(|| std::panic::panic_any(17_i32));
        let result = runner(1500).run(Component::Printer, probe).await;

        assert_eq!(result.error(), Some("Unknown error"));
    }

    #[tokio::test]
    async fn test_timeout_names_budget() {
        let flag = Arc::new(AtomicBool::new(false));
        let start = Instant::now();
        let result = runner(100).run(Component::Storage, Arc::new(HangingProbe(Arc::clone(&flag)))).await;

        assert_eq!(result.status(), HealthStatus::Unhealthy);
        assert_eq!(result.error(), Some("Timed out after 100ms"));
        assert!(result.latency_ms() >= 100);
        assert!(start.elapsed() < Duration::from_millis(1000));

        // The probe task observes the cancellation and drops its future.
        for _ in 0..50 {
            if flag.load(Ordering::SeqCst) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(flag.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_latency_tracks_probe_duration() {
        let result = runner(1500).run(Component::Database, Arc::new(SleepyProbe(Duration::from_millis(200)))).await;

        assert_eq!(result.status(), HealthStatus::Healthy);
        assert!(result.latency_ms() >= 200, "latency was {}", result.latency_ms());
        assert!(result.latency_ms() < 400, "latency was {}", result.latency_ms());
    }
}
