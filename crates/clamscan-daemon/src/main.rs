// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! clamscan-operator
//!
//! Cluster-wide ClamAV scan orchestrator. Runs the NodeScan, ClusterScan, and
//! ScanSchedule reconcilers against the orchestration platform, behind a
//! leader-election gate, and serves Prometheus metrics and health probes.

use std::process::ExitCode;
use std::time::Duration;

use clamscan_controller::{run_advisory_checks, run_fatal_checks, AlwaysLeader};
use clamscan_core::SystemClock;
use clamscan_daemon::config::Config;
use clamscan_daemon::server::{serve_health, serve_metrics, Readiness};
use clamscan_daemon::runner;
use clamscan_platform::{EnvCredentialResolver, HttpPlatformClient};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::load();
    setup_logging();

    info!(
        metrics_bind_address = %config.metrics_bind_address,
        health_bind_address = %config.health_bind_address,
        leader_elect = config.leader_elect,
        "starting clamscan-operator"
    );

    let client = HttpPlatformClient::new(config.platform_url.clone(), config.namespace.clone());

    if config.skip_startup_checks {
        warn!("skip-startup-checks set, bypassing fatal pre-flight checks");
    } else if let Err(err) = run_fatal_checks(&client, &config.scanner_service_account).await {
        error!(%err, "startup checks failed");
        return ExitCode::FAILURE;
    }
    run_advisory_checks(&client).await;

    let readiness = Readiness::new();
    readiness.set_ready();

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let metrics_shutdown = watch_to_future(shutdown_rx.clone());
    let health_shutdown = watch_to_future(shutdown_rx.clone());

    let metrics_bind = config.metrics_bind_address.clone();
    let metrics_task = tokio::spawn(async move {
        if let Err(err) = serve_metrics(&metrics_bind, metrics_shutdown).await {
            error!(%err, "metrics server exited with an error");
        }
    });

    let health_bind = config.health_bind_address.clone();
    let health_readiness = readiness.clone();
    let health_task = tokio::spawn(async move {
        if let Err(err) = serve_health(&health_bind, health_readiness, health_shutdown).await {
            error!(%err, "health server exited with an error");
        }
    });

    // The real leader-lease backend is an out-of-scope platform collaborator
    // (spec §1, §5); `--leader-elect` is accepted for forward compatibility,
    // but today every replica always reconciles.
    if config.leader_elect {
        warn!("--leader-elect requested, but no external lease backend is wired up; running as always-leader");
    }
    let lease = AlwaysLeader;
    let resolver = EnvCredentialResolver::new();
    let clock = SystemClock;
    let interval = Duration::from_secs(config.reconcile_interval_secs);

    let runner_shutdown = shutdown_rx.clone();
    let runner_task = tokio::spawn(runner::run(client, clock, resolver, lease, interval, runner_shutdown));

    wait_for_shutdown_signal().await;
    info!("shutdown requested, draining in-flight work");
    let _ = shutdown_tx.send(true);

    let _ = tokio::join!(runner_task, metrics_task, health_task);
    info!("clamscan-operator stopped");
    ExitCode::SUCCESS
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();
}

/// Waits for SIGTERM or SIGINT, matching the teacher's daemon shutdown
/// handling.
async fn wait_for_shutdown_signal() {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(err) => {
            error!(%err, "failed to install SIGTERM handler");
            return;
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(err) => {
            error!(%err, "failed to install SIGINT handler");
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM"),
        _ = sigint.recv() => info!("received SIGINT"),
    }
}

/// Adapts a shutdown `watch::Receiver` into a future resolving once the flag
/// goes true, for `axum::serve(...).with_graceful_shutdown(...)`.
async fn watch_to_future(mut rx: tokio::sync::watch::Receiver<bool>) {
    loop {
        if *rx.borrow() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}
