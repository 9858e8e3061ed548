//! # waveplusd: Airthings Wave Plus exporter daemon
//!
//! Composition root that wires the adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (CLI args, env vars, config file)
//! - Initialize `tracing`
//! - Open the BLE adapter and build the device session and collector
//! - Start the background poller and the axum router
//! - Bind to a TCP port and serve
//! - Shut down gracefully on SIGINT/SIGTERM or on a terminal collection
//!   failure, closing the BLE link before exiting
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod cli;
mod config;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser as _;
use tokio::sync::{mpsc, oneshot};
use tracing_subscriber::EnvFilter;

use waveplus_adapter_ble::BtleplugTransport;
use waveplus_adapter_http_axum::router;
use waveplus_adapter_http_axum::state::AppState;
use waveplus_app::collector::MetricsCollector;
use waveplus_app::failure::FailureHandler;
use waveplus_app::poller::Poller;
use waveplus_app::session::DeviceSession;
use waveplus_domain::error::ExporterError;

use crate::cli::Args;
use crate::config::Config;

/// Why the server stopped.
enum Shutdown {
    Signal,
    Terminal(ExporterError),
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("waveplusd: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let config = Config::load(&args).context("failed to load configuration")?;
    init_tracing(&config.logging.filter)?;

    let serial_number = config.serial_number()?;
    let transport = BtleplugTransport::new(&config.ble.transport)
        .await
        .context("failed to open Bluetooth adapter")?;
    let session = DeviceSession::new(transport, serial_number, config.discovery());
    let collector = Arc::new(MetricsCollector::new(session, config.cycle_timeout()));

    let (failures, terminal_rx) = FailureHandler::new(config.failure_policy());
    let poller = config
        .poll_period()
        .map(|period| Poller::start(Arc::clone(&collector), period, failures.clone()));

    let app = router::build(AppState::from_arc(Arc::clone(&collector), failures));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(serial_number, "listening on http://{bind_addr}/metrics");

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let supervisor = tokio::spawn(async move {
        let reason = wait_for_shutdown(terminal_rx).await;
        let _ = stop_tx.send(());
        reason
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = stop_rx.await;
        })
        .await
        .context("HTTP server failed")?;

    if let Some(poller) = poller {
        poller.abort();
    }
    collector.shutdown().await;

    match supervisor.await.context("shutdown supervisor failed")? {
        Shutdown::Signal => {
            tracing::info!("exporter stopped");
            Ok(ExitCode::SUCCESS)
        }
        Shutdown::Terminal(err) => {
            tracing::error!(error = %err, "exporter stopped after a failed acquisition cycle");
            for line in err.guidance() {
                tracing::error!("{line}");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn init_tracing(filter: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(filter).context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

/// Wait for SIGINT, SIGTERM or the first terminal collection failure.
async fn wait_for_shutdown(mut terminal_rx: mpsc::Receiver<ExporterError>) -> Shutdown {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, shutting down");
            Shutdown::Signal
        }
        () = terminate => {
            tracing::info!("received SIGTERM, shutting down");
            Shutdown::Signal
        }
        Some(err) = terminal_rx.recv() => Shutdown::Terminal(err),
    }
}
