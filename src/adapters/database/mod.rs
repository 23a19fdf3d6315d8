use crate::config::DatabaseConfig;
use crate::core::probe::Probe;
use crate::domain::probe::ProbeOutput;
use crate::error::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;

pub type DbPool = Pool<Postgres>;

/// Builds the connection pool without connecting.
///
/// Connections are opened on first use, so an unreachable database shows up
/// as an unhealthy probe rather than a failed boot.
///
/// # Errors
/// Returns `sqlx::Error` if the connection URL cannot be parsed.
pub fn init_pool(config: &DatabaseConfig) -> std::result::Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_lazy(&config.url)
}

/// Liveness check that round-trips a trivial query.
#[derive(Clone, Debug)]
pub struct DatabaseProbe {
    pool: DbPool,
}

impl DatabaseProbe {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Probe for DatabaseProbe {
    async fn check(&self) -> Result<ProbeOutput> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(ProbeOutput::healthy())
    }
}
