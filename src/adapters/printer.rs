use crate::config::PrinterConfig;
use crate::core::probe::Probe;
use crate::domain::probe::{ProbeOutput, Verdict};
use crate::error::{ProbeError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// HTTP client for the document rendering service.
#[derive(Clone, Debug)]
pub struct PrinterClient {
    client: reqwest::Client,
    health_url: String,
}

impl PrinterClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &PrinterConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().connect_timeout(Duration::from_millis(config.connect_timeout_ms)).build()?;
        let health_url =
            format!("{}/{}", config.endpoint.trim_end_matches('/'), config.health_path.trim_start_matches('/'));
        Ok(Self { client, health_url })
    }

    #[must_use]
    pub fn health_url(&self) -> &str {
        &self.health_url
    }

    /// Asks the printer for its version/diagnostic document.
    ///
    /// # Errors
    /// Returns an error on transport failure, a non-2xx status, or a body that is not JSON.
    pub async fn healthcheck(&self) -> Result<Value> {
        let response = self.client.get(&self.health_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Dependency(format!("Printer responded with status {status}")));
        }
        Ok(response.json::<Value>().await?)
    }
}

#[derive(Clone, Debug)]
pub struct PrinterProbe {
    client: PrinterClient,
}

impl PrinterProbe {
    #[must_use]
    pub const fn new(client: PrinterClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Probe for PrinterProbe {
    /// A successful answer counts as healthy unless the body itself says otherwise.
    async fn check(&self) -> Result<ProbeOutput> {
        let mut output = ProbeOutput::from_json(self.client.healthcheck().await?);
        if output.verdict == Verdict::Unreported {
            output.verdict = Verdict::Healthy;
        }
        Ok(output)
    }
}
