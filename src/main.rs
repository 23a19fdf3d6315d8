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

use resume_health::api::HealthState;
use resume_health::config::Config;
use resume_health::telemetry;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let started_at = Instant::now();
    let config = Config::load();
    let telemetry_guard = telemetry::init_telemetry(&config.telemetry)?;

    resume_health::setup_panic_hook();

    let boot_span = tracing::info_span!("boot_server");
    let (listener, router, shutdown_rx) = async {
        // Phase 1: Collaborators (lazy; nothing is contacted yet)
        let health_service = resume_health::build_health_service(&config, started_at).await?;
        tracing::info!(components = ?health_service.components(), "health probes registered");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        resume_health::spawn_signal_handler(shutdown_tx);

        // Phase 2: Router and listener
        let router = resume_health::api::router(HealthState { health_service });

        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(address = %addr, "listening");

        Ok::<(tokio::net::TcpListener, axum::Router, watch::Receiver<bool>), anyhow::Error>((
            listener,
            router,
            shutdown_rx,
        ))
    }
    .instrument(boot_span)
    .await?;

    // Phase 3: Serve until a shutdown signal arrives
    let mut server_rx = shutdown_rx.clone();
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        let _ = server_rx.wait_for(|&s| s).await;
    });

    // Phase 4: Bound the drain so a stuck connection cannot hold the process
    let mut drain_rx = shutdown_rx;
    let drain_timeout = Duration::from_secs(config.server.shutdown_timeout_secs);
    let drain_deadline = async move {
        let _ = drain_rx.wait_for(|&s| s).await;
        tokio::time::sleep(drain_timeout).await;
    };

    tokio::select! {
        res = server => {
            if let Err(e) = res {
                tracing::error!(error = %e, "Server error");
            }
        }
        () = drain_deadline => {
            tracing::warn!("Timeout waiting for connections to drain.");
        }
    }

    telemetry_guard.shutdown();
    Ok(())
}
