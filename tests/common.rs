#![allow(dead_code)]
use async_trait::async_trait;
use resume_health::api::{self, HealthState};
use resume_health::config::{HealthConfig, StatusPolicy};
use resume_health::core::health_service::HealthService;
use resume_health::core::probe::Probe;
use resume_health::domain::health::Component;
use resume_health::domain::probe::ProbeOutput;
use resume_health::error::{ProbeError, Result};
use std::sync::{Arc, Once};
use std::time::{Duration, Instant};

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("resume_health=debug".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

pub fn get_test_config() -> HealthConfig {
    HealthConfig {
        probe_timeout_ms: 1500,
        service_name: "reactive-resume".to_string(),
        status_policy: StatusPolicy::Lenient,
    }
}

/// A probe whose behavior is fixed at construction.
pub enum FakeProbe {
    Healthy { delay: Duration },
    Output(ProbeOutput),
    Fails(String),
    Panics(&'static str),
    Hangs,
}

#[async_trait]
impl Probe for FakeProbe {
    async fn check(&self) -> Result<ProbeOutput> {
        match self {
            Self::Healthy { delay } => {
                tokio::time::sleep(*delay).await;
                Ok(ProbeOutput::healthy())
            }
            Self::Output(output) => Ok(output.clone()),
            Self::Fails(message) => Err(ProbeError::Dependency(message.clone())),
            Self::Panics(message) => panic!("{message}"),
            Self::Hangs => {
                std::future::pending::<()>().await;
                Ok(ProbeOutput::healthy())
            }
        }
    }
}

pub fn healthy() -> Arc<dyn Probe> {
    Arc::new(FakeProbe::Healthy { delay: Duration::ZERO })
}

pub fn healthy_after(delay: Duration) -> Arc<dyn Probe> {
    Arc::new(FakeProbe::Healthy { delay })
}

pub fn output(output: ProbeOutput) -> Arc<dyn Probe> {
    Arc::new(FakeProbe::Output(output))
}

pub fn failing(message: &str) -> Arc<dyn Probe> {
    Arc::new(FakeProbe::Fails(message.to_string()))
}

pub fn panicking(message: &'static str) -> Arc<dyn Probe> {
    Arc::new(FakeProbe::Panics(message))
}

pub fn hanging() -> Arc<dyn Probe> {
    Arc::new(FakeProbe::Hangs)
}

pub struct TestApp {
    pub server_url: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn(database: Arc<dyn Probe>, printer: Arc<dyn Probe>, storage: Arc<dyn Probe>) -> Self {
        Self::spawn_with_config(get_test_config(), database, printer, storage).await
    }

    pub async fn spawn_with_config(
        config: HealthConfig,
        database: Arc<dyn Probe>,
        printer: Arc<dyn Probe>,
        storage: Arc<dyn Probe>,
    ) -> Self {
        setup_tracing();

        let health_service = HealthService::new(&config, Instant::now())
            .with_probe(Component::Database, database)
            .with_probe(Component::Printer, printer)
            .with_probe(Component::Storage, storage);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = api::router(HealthState { health_service });

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { server_url: format!("http://{addr}"), client: reqwest::Client::new() }
    }

    pub async fn get_health(&self) -> reqwest::Response {
        self.client.get(format!("{}/api/health", self.server_url)).send().await.unwrap()
    }
}
