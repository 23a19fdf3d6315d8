use clap::{Args, Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub database: DatabaseConfig,

    #[command(flatten)]
    pub printer: PrinterConfig,

    #[command(flatten)]
    pub storage: StorageConfig,

    #[command(flatten)]
    pub health: HealthConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "RESUME_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "RESUME_PORT", default_value_t = 3000)]
    pub port: u16,

    /// How long to wait for in-flight requests during shutdown
    #[arg(long, env = "RESUME_SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[arg(long = "database-url", env = "RESUME_DATABASE_URL")]
    pub url: String,

    /// Maximum number of pooled connections
    #[arg(long, env = "RESUME_DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection
    #[arg(long, env = "RESUME_DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 3)]
    pub acquire_timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct PrinterConfig {
    /// Base URL of the document rendering service
    #[arg(id = "printer_endpoint", long = "printer-endpoint", env = "RESUME_PRINTER_ENDPOINT")]
    pub endpoint: String,

    /// Path on the printer endpoint that answers health requests
    #[arg(long = "printer-health-path", env = "RESUME_PRINTER_HEALTH_PATH", default_value = "/json/version")]
    pub health_path: String,

    /// Connect timeout for the printer HTTP client
    #[arg(long = "printer-connect-timeout-ms", env = "RESUME_PRINTER_CONNECT_TIMEOUT_MS", default_value_t = 1000)]
    pub connect_timeout_ms: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum StorageBackend {
    #[default]
    S3,
    Local,
}

#[derive(Clone, Debug, Args)]
pub struct StorageConfig {
    /// Which object storage backend is in use
    #[arg(long = "storage-backend", env = "RESUME_STORAGE_BACKEND", value_enum, default_value_t = StorageBackend::S3)]
    pub backend: StorageBackend,

    /// S3 bucket name
    #[arg(long = "s3-bucket", env = "RESUME_S3_BUCKET", default_value = "reactive-resume")]
    pub bucket: String,

    /// S3 region
    #[arg(long = "s3-region", env = "RESUME_S3_REGION", default_value = "us-east-1")]
    pub region: String,

    /// Custom S3 endpoint (useful for MinIO)
    #[arg(id = "s3_endpoint", long = "s3-endpoint", env = "RESUME_S3_ENDPOINT")]
    pub endpoint: Option<String>,

    /// S3 access key
    #[arg(long = "s3-access-key", env = "RESUME_S3_ACCESS_KEY")]
    pub access_key: Option<String>,

    /// S3 secret key
    #[arg(long = "s3-secret-key", env = "RESUME_S3_SECRET_KEY")]
    pub secret_key: Option<String>,

    /// Force path style (required for many MinIO setups: http://host/bucket/key)
    #[arg(long = "s3-force-path-style", env = "RESUME_S3_FORCE_PATH_STYLE", default_value_t = false)]
    pub force_path_style: bool,

    /// Root directory for the local storage backend
    #[arg(long = "storage-local-path", env = "RESUME_STORAGE_LOCAL_PATH", default_value = "data/uploads")]
    pub local_path: PathBuf,
}

/// How to classify a probe value that carries no status marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum StatusPolicy {
    /// Treat it as healthy
    #[default]
    Lenient,
    /// Treat it as unhealthy
    Strict,
}

#[derive(Clone, Debug, Args)]
pub struct HealthConfig {
    /// Per-probe time budget in milliseconds, must be positive
    #[arg(
        long,
        env = "RESUME_PROBE_TIMEOUT_MS",
        default_value_t = 1500,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub probe_timeout_ms: u64,

    /// Service name reported by the health endpoint
    #[arg(long, env = "RESUME_SERVICE_NAME", default_value = "reactive-resume")]
    pub service_name: String,

    /// Classification of probe results that report no status
    #[arg(long, env = "RESUME_STATUS_POLICY", value_enum, default_value_t = StatusPolicy::Lenient)]
    pub status_policy: StatusPolicy,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// OTLP collector endpoint; telemetry export is disabled when unset
    #[arg(long, env = "RESUME_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    /// Log output format
    #[arg(long, env = "RESUME_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}
