// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ScanScheduleReconciler (spec §4.3): cron-driven trigger that creates
//! ClusterScans, honouring the concurrency policy, and retains bounded scan
//! history.

use crate::error::ReconcileError;
use crate::executor::apply_effects;
use crate::metrics;
use crate::scheduler::{is_due, CronSchedule};
use clamscan_core::{ActiveChildRef, ClusterScanPhase, Clock, ConcurrencyPolicy, Effect, ScanSchedule};
use clamscan_platform::{CredentialResolver, PlatformClient};
use std::collections::BTreeMap;

/// Deterministic firing name for a schedule at a given epoch second (spec
/// §4.3 "A firing creates a ClusterScan whose... name = `<schedule>-<epoch>`").
pub fn firing_name(schedule_name: &str, now_epoch_secs: u64) -> String {
    format!("{schedule_name}-{now_epoch_secs}")
}

pub async fn reconcile<C, Clk, R>(client: &C, clock: &Clk, resolver: &R, name: &str) -> Result<(), ReconcileError>
where
    C: PlatformClient,
    Clk: Clock,
    R: CredentialResolver,
{
    let Some(mut schedule) = client.get_scan_schedule(name).await? else {
        return Ok(());
    };
    let now_secs = clock.now_epoch_secs();
    let now_ms = clock.now_epoch_ms();
    let mut effects = Vec::new();

    let cron = match CronSchedule::parse(&schedule.spec.schedule) {
        Ok(c) => c,
        Err(_) => return Ok(()), // admission should reject malformed cron; defensive no-op here
    };

    // Reconcile active-child state against the platform before deciding
    // whether to fire (spec §4.3 "Concurrency policy": Forbid/Replace read
    // `|active children|`).
    let active = refresh_active(client, &schedule).await?;
    schedule.status.active = active;

    schedule.status.next_schedule_time_epoch_secs = cron.next_after(now_secs);

    let due = is_due(&cron, schedule.status.last_schedule_time_epoch_secs, now_secs);

    if due && !schedule.spec.suspend {
        let has_active = !schedule.status.active.is_empty();
        let should_fire = match schedule.spec.concurrency_policy {
            ConcurrencyPolicy::Allow => true,
            ConcurrencyPolicy::Forbid => !has_active,
            ConcurrencyPolicy::Replace => {
                if has_active {
                    for child in &schedule.status.active {
                        effects.push(Effect::DeleteClusterScan { name: child.name.clone() });
                    }
                }
                true
            }
        };

        if should_fire {
            let child_name = firing_name(name, now_secs);
            let mut labels = BTreeMap::new();
            labels.insert("schedule".to_string(), name.to_string());
            effects.push(Effect::CreateClusterScan {
                name: child_name.clone(),
                spec: schedule.spec.cluster_scan.clone(),
                labels,
            });
            if schedule.spec.concurrency_policy == ConcurrencyPolicy::Replace {
                schedule.status.active.clear();
            }
            schedule.status.active.push(ActiveChildRef { name: child_name.clone(), created_at_epoch_ms: now_ms });
            schedule.status.last_schedule_time_epoch_secs = Some(now_secs);
            schedule.status.last_child_name = Some(child_name.clone());
            metrics::SCANSCHEDULE_EXECUTIONS_TOTAL.with_label_values(&["fired"]).inc();
        } else {
            metrics::SCANSCHEDULE_EXECUTIONS_TOTAL.with_label_values(&["skipped"]).inc();
        }
    }

    apply_history_retention(client, &mut schedule).await?;

    client.update_scan_schedule_status(name, schedule.status).await?;
    apply_effects(client, resolver, effects).await
}

/// Re-derive `status.active` from the platform's view of each previously
/// recorded active child, dropping any that have reached a terminal phase
/// (spec §4.3 "Active children... remain" only while non-terminal).
async fn refresh_active<C: PlatformClient>(
    client: &C,
    schedule: &ScanSchedule,
) -> Result<Vec<ActiveChildRef>, ReconcileError> {
    let mut still_active = Vec::new();
    for child in &schedule.status.active {
        if let Some(cs) = client.get_cluster_scan(&child.name).await? {
            if !cs.status.phase.is_terminal() {
                still_active.push(child.clone());
            }
        }
    }
    Ok(still_active)
}

/// Bucket terminal children by outcome and delete everything past the
/// configured retention limit, oldest first (spec §4.3 "History retention").
async fn apply_history_retention<C: PlatformClient>(
    client: &C,
    schedule: &mut ScanSchedule,
) -> Result<(), ReconcileError> {
    let children = client.list_cluster_scans().await?;
    let label_prefix = format!("{}-", schedule.name);
    let mut successful: Vec<_> = children
        .iter()
        .filter(|cs| cs.name.starts_with(&label_prefix) && cs.status.phase == ClusterScanPhase::Completed)
        .collect();
    let mut failed: Vec<_> = children
        .iter()
        .filter(|cs| {
            cs.name.starts_with(&label_prefix)
                && matches!(cs.status.phase, ClusterScanPhase::Failed | ClusterScanPhase::PartiallyCompleted)
        })
        .collect();

    // Creation order == name order here, since names are `<schedule>-<epoch>`.
    successful.sort_by(|a, b| a.name.cmp(&b.name));
    failed.sort_by(|a, b| a.name.cmp(&b.name));

    if let Some(last) = successful.last() {
        schedule.status.last_successful_time_epoch_secs = last.status.completion_time_epoch_ms.map(|ms| ms / 1000);
    }

    let successful_limit = schedule.spec.successful_history_limit() as usize;
    if successful.len() > successful_limit {
        for cs in &successful[..successful.len() - successful_limit] {
            client.delete_cluster_scan(&cs.name).await.ok();
        }
    }
    let failed_limit = schedule.spec.failed_history_limit() as usize;
    if failed.len() > failed_limit {
        for cs in &failed[..failed.len() - failed_limit] {
            client.delete_cluster_scan(&cs.name).await.ok();
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "scan_schedule_reconciler_tests.rs"]
mod tests;
