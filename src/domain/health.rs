use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;
use time::OffsetDateTime;

/// Keys owned by [`CheckResult`] itself. Diagnostics never overwrite them.
const RESERVED_KEYS: [&str; 3] = ["status", "latencyMs", "error"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
        }
    }

    #[must_use]
    pub const fn is_healthy(self) -> bool {
        matches!(self, Self::Healthy)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The dependencies the service knows how to probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Database,
    Printer,
    Storage,
}

impl Component {
    pub const ALL: [Self; 3] = [Self::Database, Self::Printer, Self::Storage];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Printer => "printer",
            Self::Storage => "storage",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of a single probe.
///
/// `error` is present exactly when `status` is [`HealthStatus::Unhealthy`]; the
/// constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    #[serde(flatten)]
    extra: Map<String, Value>,
    status: HealthStatus,
    latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl CheckResult {
    #[must_use]
    pub fn healthy(latency: Duration, extra: Map<String, Value>) -> Self {
        Self { extra: strip_reserved(extra), status: HealthStatus::Healthy, latency_ms: round_millis(latency), error: None }
    }

    #[must_use]
    pub fn unhealthy(latency: Duration, error: impl Into<String>, extra: Map<String, Value>) -> Self {
        Self {
            extra: strip_reserved(extra),
            status: HealthStatus::Unhealthy,
            latency_ms: round_millis(latency),
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub const fn status(&self) -> HealthStatus {
        self.status
    }

    #[must_use]
    pub const fn latency_ms(&self) -> u64 {
        self.latency_ms
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub const fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

fn strip_reserved(mut extra: Map<String, Value>) -> Map<String, Value> {
    for key in RESERVED_KEYS {
        extra.remove(key);
    }
    extra
}

fn round_millis(latency: Duration) -> u64 {
    let rounded = latency.saturating_add(Duration::from_micros(500)).as_millis();
    u64::try_from(rounded).unwrap_or(u64::MAX)
}

/// The whole-system verdict for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateReport {
    service: String,
    version: String,
    status: HealthStatus,
    timestamp: OffsetDateTime,
    uptime: Duration,
    checks: Vec<(Component, CheckResult)>,
}

impl AggregateReport {
    /// Builds the report. The overall status is unhealthy if any check is.
    #[must_use]
    pub fn assemble(
        service: impl Into<String>,
        version: impl Into<String>,
        timestamp: OffsetDateTime,
        uptime: Duration,
        checks: Vec<(Component, CheckResult)>,
    ) -> Self {
        let status = if checks.iter().all(|(_, check)| check.status().is_healthy()) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };

        Self { service: service.into(), version: version.into(), status, timestamp, uptime, checks }
    }

    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub const fn status(&self) -> HealthStatus {
        self.status
    }

    #[must_use]
    pub const fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }

    #[must_use]
    pub const fn uptime(&self) -> Duration {
        self.uptime
    }

    #[must_use]
    pub fn checks(&self) -> &[(Component, CheckResult)] {
        &self.checks
    }

    #[must_use]
    pub fn check(&self, component: Component) -> Option<&CheckResult> {
        self.checks.iter().find(|(c, _)| *c == component).map(|(_, check)| check)
    }
}
