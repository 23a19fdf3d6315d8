#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod telemetry;

use crate::adapters::database::DatabaseProbe;
use crate::adapters::printer::{PrinterClient, PrinterProbe};
use crate::adapters::storage::{LocalStorage, ObjectStorage, S3Storage, StorageProbe};
use crate::config::{Config, StorageBackend};
use crate::core::health_service::HealthService;
use crate::domain::health::Component;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Builds the collaborators named in `config` and registers a probe for each.
///
/// # Errors
/// Returns an error if the database URL is invalid or the printer client cannot be built.
pub async fn build_health_service(config: &Config, started_at: Instant) -> anyhow::Result<HealthService> {
    let pool = adapters::database::init_pool(&config.database)?;
    let printer = PrinterClient::new(&config.printer)?;

    let storage: Arc<dyn ObjectStorage> = match config.storage.backend {
        StorageBackend::S3 => {
            let client = adapters::storage::s3::initialize_client(&config.storage).await;
            Arc::new(S3Storage::new(client, config.storage.bucket.clone()))
        }
        StorageBackend::Local => Arc::new(LocalStorage::new(config.storage.local_path.clone())),
    };

    Ok(HealthService::new(&config.health, started_at)
        .with_probe(Component::Database, Arc::new(DatabaseProbe::new(pool)))
        .with_probe(Component::Printer, Arc::new(PrinterProbe::new(printer)))
        .with_probe(Component::Storage, Arc::new(StorageProbe::new(storage))))
}

/// Flips `shutdown_tx` to `true` on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
            () = terminate => tracing::info!("Received SIGTERM, shutting down"),
        }

        let _ = shutdown_tx.send(true);
    });
}

/// Routes panics through `tracing` so they reach the configured log sink.
pub fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info.location().map(ToString::to_string).unwrap_or_default();
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_default();
        tracing::error!(panic = %payload, location = %location, "Panic occurred");
    }));
}
