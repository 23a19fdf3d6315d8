use crate::domain::health::AggregateReport;
use serde::ser::{Error, Serialize, SerializeMap, Serializer};
use time::format_description::well_known::Rfc3339;

/// Wire form of an [`AggregateReport`].
///
/// The top level carries `service`, `version`, `status`, `timestamp` and
/// `uptime`, followed by one object per probed component keyed by its name.
#[derive(Debug, Clone, Copy)]
pub struct HealthResponse<'a>(pub &'a AggregateReport);

impl<'a> From<&'a AggregateReport> for HealthResponse<'a> {
    fn from(report: &'a AggregateReport) -> Self {
        Self(report)
    }
}

impl Serialize for HealthResponse<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let report = self.0;
        let timestamp = report
            .timestamp()
            .replace_millisecond(report.timestamp().millisecond())
            .map_err(S::Error::custom)?
            .format(&Rfc3339)
            .map_err(S::Error::custom)?;

        let mut map = serializer.serialize_map(Some(5 + report.checks().len()))?;
        map.serialize_entry("service", report.service())?;
        map.serialize_entry("version", report.version())?;
        map.serialize_entry("status", &report.status())?;
        map.serialize_entry("timestamp", &timestamp)?;
        map.serialize_entry("uptime", &format!("{:.2}s", report.uptime().as_secs_f64()))?;
        for (component, check) in report.checks() {
            map.serialize_entry(component.as_str(), check)?;
        }
        map.end()
    }
}
