use crate::api::HealthState;
use crate::api::schemas::health::HealthResponse;
use crate::domain::health::{AggregateReport, CheckResult, Component};
use axum::{
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

pub const HEALTH_ROUTE: &str = "/api/health";

/// Liveness probe: returns 200 OK as long as the server is running.
pub async fn livez() -> impl IntoResponse {
    StatusCode::OK
}

/// Dependency health: probes every dependency and reports the aggregate.
pub async fn health(State(state): State<HealthState>) -> Response {
    let report = state.health_service.aggregate().await;
    respond(&report)
}

/// Renders a report as the health endpoint's HTTP response.
///
/// Unhealthy reports get a 503 and one warning log with the status, latency
/// and error of every check as structured fields.
///
/// # Panics
/// Panics if the report cannot be serialized, which would be a bug in the wire schema.
#[must_use]
pub fn respond(report: &AggregateReport) -> Response {
    let body = serde_json::to_string(&HealthResponse::from(report)).expect("health report must serialize to JSON");

    let status = if report.status().is_healthy() {
        StatusCode::OK
    } else {
        log_failure(report);
        StatusCode::SERVICE_UNAVAILABLE
    };

    let content_length = HeaderValue::from(body.len());
    (
        status,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/json; charset=UTF-8")),
            (header::CONTENT_LENGTH, content_length),
        ],
        body,
    )
        .into_response()
}

fn log_failure(report: &AggregateReport) {
    let status = |component: Component| report.check(component).map(|check| check.status().as_str());
    let latency = |component: Component| report.check(component).map(CheckResult::latency_ms);
    let error = |component: Component| report.check(component).and_then(CheckResult::error);

    tracing::warn!(
        route = HEALTH_ROUTE,
        database.status = status(Component::Database),
        database.latency_ms = latency(Component::Database),
        database.error = error(Component::Database),
        printer.status = status(Component::Printer),
        printer.latency_ms = latency(Component::Printer),
        printer.error = error(Component::Printer),
        storage.status = status(Component::Storage),
        storage.latency_ms = latency(Component::Storage),
        storage.error = error(Component::Storage),
        "Healthcheck failed"
    );
}
