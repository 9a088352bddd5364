// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parse_bind_address_expands_bare_port() {
    let addr = parse_bind_address(":8080").unwrap();
    assert_eq!(addr.to_string(), "0.0.0.0:8080");
}

#[test]
fn parse_bind_address_accepts_full_host_port() {
    let addr = parse_bind_address("127.0.0.1:9000").unwrap();
    assert_eq!(addr.to_string(), "127.0.0.1:9000");
}

#[test]
fn parse_bind_address_rejects_garbage() {
    assert!(parse_bind_address("not-an-address").is_err());
}

#[tokio::test]
async fn readyz_reports_unavailable_until_flagged_ready() {
    let readiness = Readiness::new();
    assert_eq!(
        readyz_handler(axum::extract::State(readiness.clone())).await,
        StatusCode::SERVICE_UNAVAILABLE
    );

    readiness.set_ready();
    assert_eq!(
        readyz_handler(axum::extract::State(readiness)).await,
        StatusCode::OK
    );
}

#[tokio::test]
async fn healthz_is_always_ok() {
    assert_eq!(healthz_handler().await, StatusCode::OK);
}

#[tokio::test]
async fn metrics_handler_returns_prometheus_text_exposition() {
    let body = metrics_handler().await;
    // The registry is process-global; we only assert the encoder produced
    // well-formed output, not any specific series (other tests mutate it).
    assert!(body.is_empty() || body.contains('\n') || body.starts_with('#'));
}
