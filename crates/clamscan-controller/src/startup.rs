// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! StartupValidator (spec §4.5): pre-flight checks run before any reconciler
//! starts. Fatal checks abort the process (unless bypassed); the
//! virus-scanner readiness check is advisory only (spec §9 Open Question c).

use clamscan_platform::PlatformClient;
use thiserror::Error;
use tracing::{info, warn};

/// The fixed list of platform-API permissions the operator needs (spec §4.5
/// "self-subject access review"), expressed as `(verb, resource)` pairs.
const REQUIRED_PERMISSIONS: &[(&str, &str)] = &[
    ("get", "nodes"),
    ("list", "nodes"),
    ("create", "nodescans"),
    ("update", "nodescans"),
    ("create", "clusterscans"),
    ("update", "clusterscans"),
    ("update", "scanschedules"),
    ("update", "scanpolicies"),
    ("create", "workloads"),
    ("delete", "workloads"),
    ("create", "events"),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartupError {
    #[error("service account '{0}' not found in operator namespace")]
    ServiceAccountMissing(String),
    #[error("missing permission: {verb} {resource}")]
    PermissionDenied { verb: String, resource: String },
    #[error("API server unreachable")]
    ApiServerUnreachable,
}

/// Run every fatal pre-flight check against `client`; returns the first
/// failure encountered. Callers decide whether to bypass these (spec §6
/// "skip-startup-checks toggle").
pub async fn run_fatal_checks<C: PlatformClient>(
    client: &C,
    scanner_service_account: &str,
) -> Result<(), StartupError> {
    if !client
        .service_account_exists(scanner_service_account)
        .await
        .unwrap_or(false)
    {
        return Err(StartupError::ServiceAccountMissing(scanner_service_account.to_string()));
    }

    for (verb, resource) in REQUIRED_PERMISSIONS {
        let allowed = client.self_subject_access_review(verb, resource).await.unwrap_or(false);
        if !allowed {
            return Err(StartupError::PermissionDenied { verb: verb.to_string(), resource: resource.to_string() });
        }
    }

    if !client.api_server_reachable().await.unwrap_or(false) {
        return Err(StartupError::ApiServerUnreachable);
    }

    info!("startup checks passed");
    Ok(())
}

/// Advisory (non-fatal) check: log a warning if the virus-scanner service
/// isn't ready, but never block startup on it (spec §4.5, §9 Open Question c).
pub async fn run_advisory_checks<C: PlatformClient>(client: &C) {
    match client.virus_scanner_service_ready().await {
        Ok(true) => info!("virus-scanner service ready"),
        Ok(false) => warn!("virus-scanner service not ready (advisory only, continuing)"),
        Err(err) => warn!(%err, "could not check virus-scanner service readiness (advisory only, continuing)"),
    }
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
