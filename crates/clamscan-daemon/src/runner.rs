// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The top-level reconcile-loop runner (spec §5 "Scheduling model"): a
//! fixed-interval sweep across every NodeScan, ClusterScan, and ScanSchedule,
//! gated on leader-election (spec §5 "Leader election"). There is no watch
//! stream in this system (spec §9 design note, `PlatformClient` only exposes
//! get/list), so a sweep stands in for the per-resource requeue timers a
//! decision builder's `SetTimer` effect would otherwise drive.

use clamscan_controller::{cluster_scan_reconciler, node_scan_reconciler, scan_schedule_reconciler, LeaderLease, ReconcileError};
use clamscan_core::Clock;
use clamscan_platform::{CredentialResolver, PlatformClient};
use std::time::Duration;
use tracing::{debug, warn};

/// Run the reconcile loop until `shutdown` resolves. Every `interval` the
/// loop checks leadership, then -- if leading -- sweeps every resource kind.
pub async fn run<C, Clk, R, L>(
    client: C,
    clock: Clk,
    resolver: R,
    lease: L,
    interval: Duration,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) where
    C: PlatformClient,
    Clk: Clock,
    R: CredentialResolver,
    L: LeaderLease,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !lease.is_leader().await {
                    debug!("not leader, skipping reconcile sweep");
                    continue;
                }
                sweep(&client, &clock, &resolver).await;
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}

async fn sweep<C, Clk, R>(client: &C, clock: &Clk, resolver: &R)
where
    C: PlatformClient,
    Clk: Clock,
    R: CredentialResolver,
{
    sweep_node_scans(client, clock, resolver).await;
    sweep_cluster_scans(client, clock, resolver).await;
    sweep_scan_schedules(client, clock, resolver).await;
}

async fn sweep_node_scans<C, Clk, R>(client: &C, clock: &Clk, resolver: &R)
where
    C: PlatformClient,
    Clk: Clock,
    R: CredentialResolver,
{
    let node_scans = match client.list_node_scans().await {
        Ok(scans) => scans,
        Err(err) => {
            warn!(%err, "failed to list NodeScans, skipping this sweep");
            return;
        }
    };
    for ns in node_scans {
        if let Err(err) = node_scan_reconciler::reconcile(client, clock, resolver, &ns.name).await {
            log_reconcile_error("NodeScan", &ns.name, &err);
        }
    }
}

async fn sweep_cluster_scans<C, Clk, R>(client: &C, clock: &Clk, resolver: &R)
where
    C: PlatformClient,
    Clk: Clock,
    R: CredentialResolver,
{
    let cluster_scans = match client.list_cluster_scans().await {
        Ok(scans) => scans,
        Err(err) => {
            warn!(%err, "failed to list ClusterScans, skipping this sweep");
            return;
        }
    };
    for cs in cluster_scans {
        if let Err(err) = cluster_scan_reconciler::reconcile(client, clock, resolver, &cs.name).await {
            log_reconcile_error("ClusterScan", &cs.name, &err);
        }
    }
}

async fn sweep_scan_schedules<C, Clk, R>(client: &C, clock: &Clk, resolver: &R)
where
    C: PlatformClient,
    Clk: Clock,
    R: CredentialResolver,
{
    let schedules = match client.list_scan_schedules().await {
        Ok(schedules) => schedules,
        Err(err) => {
            warn!(%err, "failed to list ScanSchedules, skipping this sweep");
            return;
        }
    };
    for s in schedules {
        if let Err(err) = scan_schedule_reconciler::reconcile(client, clock, resolver, &s.name).await {
            log_reconcile_error("ScanSchedule", &s.name, &err);
        }
    }
}

fn log_reconcile_error(kind: &str, name: &str, err: &ReconcileError) {
    if err.is_transient() {
        debug!(kind, name, %err, "transient reconcile error, will retry next sweep");
    } else {
        warn!(kind, name, %err, "reconcile error");
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
