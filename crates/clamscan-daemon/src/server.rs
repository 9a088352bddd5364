// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The metrics and health-probe HTTP surfaces (spec §6 "Command-line
//! surface"). Two independent `axum` routers, matching the two independently
//! configurable bind addresses.

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Shared readiness flag: flips to `true` once `StartupValidator`'s fatal
/// checks have passed (or were bypassed), and the reconcile loop is about to
/// start.
#[derive(Clone, Default)]
pub struct Readiness(Arc<AtomicBool>);

impl Readiness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ready(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Parses a spec-style bind address (`:8080`) or a full `host:port` into a
/// [`SocketAddr`], defaulting the host to every interface.
pub fn parse_bind_address(addr: &str) -> Result<SocketAddr, std::net::AddrParseError> {
    if let Some(port) = addr.strip_prefix(':') {
        format!("0.0.0.0:{port}").parse()
    } else {
        addr.parse()
    }
}

fn metrics_router() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

async fn metrics_handler() -> String {
    clamscan_controller::metrics::gather_metrics()
}

fn health_router(readiness: Readiness) -> Router {
    Router::new()
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
        .with_state(readiness)
}

async fn healthz_handler() -> StatusCode {
    StatusCode::OK
}

async fn readyz_handler(
    axum::extract::State(readiness): axum::extract::State<Readiness>,
) -> StatusCode {
    if readiness.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Serve the `/metrics` endpoint until `shutdown` resolves.
pub async fn serve_metrics(
    bind_address: &str,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let addr = parse_bind_address(bind_address)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "metrics endpoint listening");
    axum::serve(listener, metrics_router())
        .with_graceful_shutdown(shutdown)
        .await
}

/// Serve `/healthz` and `/readyz` until `shutdown` resolves.
pub async fn serve_health(
    bind_address: &str,
    readiness: Readiness,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let addr = parse_bind_address(bind_address)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "health-probe endpoint listening");
    axum::serve(listener, health_router(readiness))
        .with_graceful_shutdown(shutdown)
        .await
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
