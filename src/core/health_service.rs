use crate::config::HealthConfig;
use crate::core::probe::Probe;
use crate::core::probe_runner::ProbeRunner;
use crate::domain::health::{AggregateReport, Component};
use futures::future::join_all;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use time::OffsetDateTime;

/// Fans out to every registered probe and folds the results into one report.
#[derive(Clone)]
pub struct HealthService {
    service_name: String,
    version: String,
    started_at: Instant,
    runner: ProbeRunner,
    probes: Vec<(Component, Arc<dyn Probe>)>,
}

impl fmt::Debug for HealthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HealthService")
            .field("service_name", &self.service_name)
            .field("version", &self.version)
            .field("runner", &self.runner)
            .field("probes", &self.probes.iter().map(|(c, _)| *c).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl HealthService {
    /// `started_at` is the process start; report uptime is measured from it.
    #[must_use]
    pub fn new(config: &HealthConfig, started_at: Instant) -> Self {
        Self {
            service_name: config.service_name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at,
            runner: ProbeRunner::new(Duration::from_millis(config.probe_timeout_ms), config.status_policy),
            probes: Vec::new(),
        }
    }

    /// Registers `probe` for `component`, replacing any earlier registration
    /// for the same component. Order of first registration is kept.
    #[must_use]
    pub fn with_probe(mut self, component: Component, probe: Arc<dyn Probe>) -> Self {
        if let Some(slot) = self.probes.iter_mut().find(|(c, _)| *c == component) {
            slot.1 = probe;
        } else {
            self.probes.push((component, probe));
        }
        self
    }

    #[must_use]
    pub fn components(&self) -> Vec<Component> {
        self.probes.iter().map(|(c, _)| *c).collect()
    }

    /// Runs all probes concurrently and waits for every one of them to settle.
    ///
    /// There is no outer deadline: the wait is bounded by the slowest probe,
    /// which the runner caps at its budget.
    pub async fn aggregate(&self) -> AggregateReport {
        let runner = &self.runner;
        let checks = join_all(self.probes.iter().map(|(component, probe)| {
            let probe = Arc::clone(probe);
            async move { (*component, runner.run(*component, probe).await) }
        }))
        .await;

        AggregateReport::assemble(
            self.service_name.as_str(),
            self.version.as_str(),
            OffsetDateTime::now_utc(),
            self.started_at.elapsed(),
            checks,
        )
    }
}
