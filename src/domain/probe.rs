use serde_json::{Map, Value};

/// What a probe said about its own health, if anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Healthy,
    Unhealthy(Option<String>),
    /// The probe returned diagnostics without a recognizable status marker.
    Unreported,
}

/// The value a probe settles with: a verdict plus free-form diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutput {
    pub verdict: Verdict,
    pub details: Map<String, Value>,
}

impl ProbeOutput {
    #[must_use]
    pub fn healthy() -> Self {
        Self { verdict: Verdict::Healthy, details: Map::new() }
    }

    #[must_use]
    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self { verdict: Verdict::Unhealthy(Some(message.into())), details: Map::new() }
    }

    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Interprets a collaborator's JSON health payload.
    ///
    /// A `"status"` of `"unhealthy"` marks the probe as failed and its `"error"`
    /// string, if any, becomes the message. `"healthy"` marks it as passing. Any
    /// other value, or no `"status"` at all, leaves the verdict unreported.
    /// Non-object payloads are kept whole under `"detail"`.
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        let mut details = match value {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("detail".to_string(), other);
                map
            }
        };

        let verdict = match details.get("status").and_then(Value::as_str) {
            Some("unhealthy") => {
                let message = details.get("error").and_then(Value::as_str).map(str::to_string);
                Verdict::Unhealthy(message)
            }
            Some("healthy") => Verdict::Healthy,
            _ => Verdict::Unreported,
        };

        details.remove("status");
        details.remove("error");

        Self { verdict, details }
    }
}
