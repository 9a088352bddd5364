// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line surface (spec §6 "Command-line surface"), matching the
//! teacher's `clap` derive+env convention in the `cli` crate.

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "clamscan-operator",
    version,
    about = "Cluster-wide ClamAV scan orchestrator"
)]
pub struct Config {
    /// Bind address for the Prometheus `/metrics` endpoint.
    #[arg(long = "metrics-bind-address", env = "CLAMSCAN_METRICS_BIND_ADDRESS", default_value = ":8080")]
    pub metrics_bind_address: String,

    /// Bind address for the `/healthz` and `/readyz` health-probe endpoints.
    #[arg(long = "health-bind-address", env = "CLAMSCAN_HEALTH_BIND_ADDRESS", default_value = ":8081")]
    pub health_bind_address: String,

    /// Enable leader election so only one replica runs the reconcilers.
    #[arg(long = "leader-elect", env = "CLAMSCAN_LEADER_ELECT", default_value_t = false)]
    pub leader_elect: bool,

    /// Container image reference used for the scanner workload.
    #[arg(
        long = "scanner-image",
        env = "CLAMSCAN_SCANNER_IMAGE",
        default_value = "clamav/clamav:stable"
    )]
    pub scanner_image: String,

    /// Remote virus-scanner service host (remote scan mode).
    #[arg(long = "virus-scanner-host", env = "CLAMSCAN_VIRUS_SCANNER_HOST")]
    pub virus_scanner_host: Option<String>,

    /// Remote virus-scanner service port (remote scan mode).
    #[arg(long = "virus-scanner-port", env = "CLAMSCAN_VIRUS_SCANNER_PORT", default_value_t = 3310)]
    pub virus_scanner_port: u16,

    /// Skip the fatal pre-flight startup checks (spec §4.5). Intended for
    /// local development only.
    #[arg(long = "skip-startup-checks", env = "CLAMSCAN_SKIP_STARTUP_CHECKS", default_value_t = false)]
    pub skip_startup_checks: bool,

    /// Service account name the scanner workload runs as; also the identity
    /// `StartupValidator` checks for existence and permissions.
    #[arg(
        long = "scanner-service-account",
        env = "CLAMSCAN_SCANNER_SERVICE_ACCOUNT",
        default_value = "clamscan-scanner"
    )]
    pub scanner_service_account: String,

    /// Base URL of the orchestration platform's API gateway.
    #[arg(long = "platform-url", env = "CLAMSCAN_PLATFORM_URL", default_value = "http://localhost:9090")]
    pub platform_url: String,

    /// Namespace the operator manages.
    #[arg(long = "namespace", env = "CLAMSCAN_NAMESPACE", default_value = "default")]
    pub namespace: String,

    /// How often the reconcile loop sweeps every resource kind, in seconds.
    /// There is no watch stream in this system (spec §9 design note); a
    /// fixed-interval sweep stands in for per-resource requeue timers.
    #[arg(long = "reconcile-interval-secs", env = "CLAMSCAN_RECONCILE_INTERVAL_SECS", default_value_t = 10)]
    pub reconcile_interval_secs: u64,
}

impl Config {
    pub fn load() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
