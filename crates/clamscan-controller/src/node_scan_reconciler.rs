// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! NodeScanReconciler (spec §4.1): owns the lifecycle of a single-node scan.
//!
//! Split in the teacher's shape: [`decide`] is a pure `Context -> (Status,
//! Vec<Effect>)` function, unit-tested directly; [`reconcile`] is the thin
//! async shell that gathers the context from the platform, calls [`decide`],
//! and hands the resulting effects to [`crate::executor::apply_effects`].

use crate::error::ReconcileError;
use crate::executor::apply_effects;
use crate::log_parser::{parse_scanner_log, ScanReport};
use crate::metrics;
use clamscan_cache::CacheManager;
use clamscan_core::{
    resolve_effective_config, set_condition, truncate_identifier, Clock, Condition,
    ConditionStatus, Effect, EventReason, InfectedFile, NodeScan, NodeScanPhase, NodeScanStatus,
    NotifyChannel, OperatorEvent, ResourceKind, ScanCacheSpec, ScanPolicy,
};
use clamscan_platform::{CredentialResolver, PlatformClient, WorkloadObservation, WorkloadPhase};

/// Requeue interval while a NodeScan's workload is still running (spec §4.1
/// "Running -> Running: Requeue in ~30 s").
pub const RUNNING_REQUEUE_SECS: u64 = 30;

/// Everything [`decide`] needs to compute the next status and effects for one
/// NodeScan, pre-fetched by [`reconcile`] so the decision itself stays pure.
#[derive(Debug, Clone)]
pub struct NodeScanContext {
    pub node_scan: NodeScan,
    /// `Some(_)` only once the target node has actually been looked up
    /// (Pending phase, first reconcile after creation).
    pub node_exists: Option<bool>,
    /// `Some(None)` means a policy was referenced but not found;
    /// `Some(Some(_))` means it resolved; `None` means no policy was referenced.
    pub policy: Option<Option<ScanPolicy>>,
    pub workload: Option<WorkloadObservation>,
    pub cache: ScanCacheSpec,
}

/// Outcome of [`decide`]: the status to persist plus the effects to execute.
#[derive(Debug, Clone)]
pub struct Decision {
    pub status: NodeScanStatus,
    pub effects: Vec<Effect>,
}

/// Pure decision function driving the NodeScan state machine (spec §4.1
/// table). `workload_name` is the deterministic, already-truncated identifier
/// this NodeScan's batch workload would carry (or does carry).
pub fn decide(ctx: &NodeScanContext, workload_name: &str, now_epoch_ms: u64) -> Decision {
    let ns = &ctx.node_scan;
    let mut status = ns.status.clone();
    let mut effects = Vec::new();

    if status.pending_deletion {
        if status.job_ref.is_some() {
            effects.push(Effect::DeleteWorkload { name: workload_name.to_string() });
        }
        status.pending_deletion = false;
        return Decision { status, effects };
    }

    match status.phase {
        NodeScanPhase::Pending => {
            if status.start_time_epoch_ms.is_none() {
                status.start_time_epoch_ms = Some(now_epoch_ms);
            }

            if ctx.node_exists == Some(false) {
                status.phase = NodeScanPhase::Failed;
                set_condition(
                    &mut status.conditions,
                    Condition::new(
                        "NodeNotFound",
                        ConditionStatus::True,
                        "NodeNotFound",
                        format!("target node '{}' not found", ns.spec.node_name),
                        now_epoch_ms,
                    ),
                );
                effects.push(Effect::EmitEvent {
                    event: OperatorEvent::warning(
                        ResourceKind::NodeScan,
                        ns.name.clone(),
                        EventReason::NodeNotFound,
                        format!("target node '{}' not found", ns.spec.node_name),
                    ),
                });
                return Decision { status, effects };
            }

            if ns.spec.policy_ref.is_some() && matches!(ctx.policy, Some(None)) {
                status.phase = NodeScanPhase::Failed;
                set_condition(
                    &mut status.conditions,
                    Condition::new(
                        "ScanPolicyNotFound",
                        ConditionStatus::True,
                        "ScanPolicyNotFound",
                        format!("policy '{}' not found", ns.spec.policy_ref.as_deref().unwrap_or("")),
                        now_epoch_ms,
                    ),
                );
                effects.push(Effect::EmitEvent {
                    event: OperatorEvent::warning(
                        ResourceKind::NodeScan,
                        ns.name.clone(),
                        EventReason::ScanPolicyNotFound,
                        format!("policy '{}' not found", ns.spec.policy_ref.as_deref().unwrap_or("")),
                    ),
                });
                return Decision { status, effects };
            }

            // Node resolved (and policy, if any): construct and create the
            // batch workload (spec §4.1 "Workload construction").
            let policy_spec = ctx.policy.as_ref().and_then(|p| p.as_ref()).map(|p| &p.spec);
            let effective = resolve_effective_config(&ns.spec, policy_spec);
            let cache_decision = CacheManager::decide(&ns.spec, &ctx.cache, now_epoch_ms / 1000);

            let mut env = vec![
                ("NODE_NAME".to_string(), ns.spec.node_name.clone()),
                ("HOST_ROOT".to_string(), "/host".to_string()),
                ("RESULTS_DIR".to_string(), "/results".to_string()),
                ("PATHS_TO_SCAN".to_string(), effective.paths.join(",")),
                ("MAX_CONCURRENT".to_string(), effective.max_concurrent.to_string()),
                ("FILE_TIMEOUT".to_string(), effective.file_timeout_ms.to_string()),
                ("CONNECT_TIMEOUT".to_string(), effective.connect_timeout_ms.to_string()),
                ("MAX_FILE_SIZE".to_string(), effective.max_file_size_bytes.to_string()),
            ];
            env.extend(cache_decision.env);

            effects.push(Effect::CreateWorkload {
                name: workload_name.to_string(),
                node_scan_name: ns.name.clone(),
                node_name: ns.spec.node_name.clone(),
                env,
                resources: effective.resources,
                retry_budget: 3,
            });
            if let Some((blob_name, data)) = cache_decision.cache_blob {
                effects.push(Effect::WriteCacheBlob { name: blob_name, data });
            }

            status.phase = NodeScanPhase::Running;
            status.job_ref = Some(workload_name.to_string());
            status.strategy_used = Some(cache_decision.effective_strategy);
            effects.push(Effect::EmitEvent {
                event: OperatorEvent::normal(
                    ResourceKind::NodeScan,
                    ns.name.clone(),
                    EventReason::JobCreated,
                    format!("created workload '{workload_name}' on node '{}'", ns.spec.node_name),
                ),
            });
        }

        NodeScanPhase::Running => {
            let Some(workload) = &ctx.workload else {
                // Workload observation missing on a Running NodeScan is a
                // transient platform-read gap; requeue rather than fail.
                effects.push(Effect::SetTimer {
                    id: format!("nodescan/{}", ns.name),
                    duration_secs: RUNNING_REQUEUE_SECS,
                });
                return Decision { status, effects };
            };

            match workload.phase {
                WorkloadPhase::Succeeded => {
                    let report = parse_scanner_log(&workload.log_lines, now_epoch_ms / 1000);
                    apply_completion(ns, &mut status, &ctx.cache, &report, now_epoch_ms, &mut effects);
                }
                WorkloadPhase::Failed => {
                    status.phase = NodeScanPhase::Failed;
                    status.completion_time_epoch_ms = Some(now_epoch_ms);
                    set_condition(
                        &mut status.conditions,
                        Condition::new(
                            "ScanFailed",
                            ConditionStatus::True,
                            "ScanFailed",
                            "scanner workload failed",
                            now_epoch_ms,
                        ),
                    );
                    effects.push(Effect::EmitEvent {
                        event: OperatorEvent::warning(
                            ResourceKind::NodeScan,
                            ns.name.clone(),
                            EventReason::ScanFailed,
                            "scanner workload failed",
                        ),
                    });
                }
                WorkloadPhase::Pending | WorkloadPhase::Running => {
                    effects.push(Effect::SetTimer {
                        id: format!("nodescan/{}", ns.name),
                        duration_secs: RUNNING_REQUEUE_SECS,
                    });
                }
            }
        }

        NodeScanPhase::Completed | NodeScanPhase::Failed => {
            // Terminal; no automatic retry at the orchestrator level (spec §7).
        }
    }

    Decision { status, effects }
}

fn apply_completion(
    ns: &NodeScan,
    status: &mut NodeScanStatus,
    cache: &ScanCacheSpec,
    report: &ScanReport,
    now_epoch_ms: u64,
    effects: &mut Vec<Effect>,
) {
    status.phase = NodeScanPhase::Completed;
    status.completion_time_epoch_ms = Some(now_epoch_ms);
    status.files_scanned = report.files_scanned;
    status.files_infected = report.files_infected;
    status.files_skipped = report.files_skipped;
    status.error_count = report.error_count;
    status.infected_files = report.infected_files.clone();
    if let Some(start) = status.start_time_epoch_ms {
        status.duration_secs = Some(now_epoch_ms.saturating_sub(start) / 1000);
    }

    // The strategy actually launched with was recorded on the Pending ->
    // Running transition (`status.strategy_used`); reuse it rather than
    // recomputing `shouldForceFullScan` against today's cache state, which
    // could disagree with the decision already baked into this run's
    // environment (spec §4.4 "Merge on completion" assumes the same
    // `force_full` value `decide` used for the run being merged).
    let force_full = status.strategy_used == Some(clamscan_core::ScanStrategy::Full);
    let outcome = clamscan_cache::ScanOutcome {
        files: report.cache_entries.clone(),
        files_scanned: report.files_scanned,
        files_skipped_incremental: report.files_skipped,
    };
    let (hit_rate, time_saved) = CacheManager::derive_statistics(&outcome);
    status.cache_hit_rate_percent = Some(hit_rate);
    status.estimated_time_saved_secs = Some(time_saved);

    let merged_cache = CacheManager::merge(cache, force_full, &outcome, now_epoch_ms / 1000);
    effects.push(Effect::WriteScanCache {
        name: clamscan_core::ScanCache::name_for_node(&ns.spec.node_name),
        status: clamscan_core::ScanCacheStatus {
            last_updated_epoch_ms: Some(now_epoch_ms),
            serialized_size_bytes: CacheManager::serialized_size_bytes(&merged_cache),
        },
        spec: merged_cache,
    });

    set_condition(
        &mut status.conditions,
        Condition::new(
            "ScanCompleted",
            ConditionStatus::True,
            "ScanCompleted",
            format!("scanned {} files, {} infected", report.files_scanned, report.files_infected),
            now_epoch_ms,
        ),
    );
    effects.push(Effect::EmitEvent {
        event: OperatorEvent::normal(
            ResourceKind::NodeScan,
            ns.name.clone(),
            EventReason::ScanCompleted,
            format!("scanned {} files, {} infected", report.files_scanned, report.files_infected),
        ),
    });

    // Notification effects need the resolved policy (not carried here); the
    // async `reconcile` shell splices them in on this same transition.
}

/// Build notification effects given an already-resolved policy (spec §4.1
/// "Notifications", §3 ScanPolicy "three channels").
pub fn build_notification_effects(
    policy_notifications: &clamscan_core::NotificationConfig,
    infected_summary: &str,
    files_infected: u64,
) -> Vec<Effect> {
    let mut effects = Vec::new();
    if let Some(chat) = &policy_notifications.chat {
        if files_infected > 0 || !chat.only_on_infection {
            effects.push(Effect::SendNotification {
                channel: NotifyChannel::Chat,
                subject: "ClamAV scan alert".to_string(),
                body: infected_summary.to_string(),
                credential: chat.webhook_credential.clone(),
                recipients: Vec::new(),
            });
        }
    }
    if let Some(mail) = &policy_notifications.mail {
        if files_infected > 0 || !mail.only_on_infection {
            effects.push(Effect::SendNotification {
                channel: NotifyChannel::Mail,
                subject: "ClamAV scan alert".to_string(),
                body: infected_summary.to_string(),
                credential: mail.smtp_credential.clone(),
                recipients: mail.recipients.clone(),
            });
        }
    }
    if let Some(webhook) = &policy_notifications.webhook {
        if files_infected > 0 || !webhook.only_on_infection {
            effects.push(Effect::SendNotification {
                channel: NotifyChannel::Webhook,
                subject: "ClamAV scan alert".to_string(),
                body: infected_summary.to_string(),
                credential: webhook.url_credential.clone(),
                recipients: Vec::new(),
            });
        }
    }
    effects
}

fn infected_summary(infected_files: &[InfectedFile]) -> String {
    let preview: Vec<String> = infected_files
        .iter()
        .take(5)
        .map(|f| format!("{} ({})", f.path, f.virus_names.join(", ")))
        .collect();
    if infected_files.is_empty() {
        "no infected files".to_string()
    } else {
        format!("{} infected file(s): {}", infected_files.len(), preview.join("; "))
    }
}

/// Deterministic, identifier-bound-truncated workload name for a NodeScan
/// (spec §4.1 "Workload construction").
pub fn workload_name(node_scan_name: &str) -> String {
    truncate_identifier(&format!("nodescan-{node_scan_name}"))
}

/// Gather context from the platform and drive one reconcile of `name`
/// (spec §4.1 "Contract"). No-op (`Ok(())`) if the NodeScan no longer exists.
pub async fn reconcile<C, Clk, R>(
    client: &C,
    clock: &Clk,
    resolver: &R,
    name: &str,
) -> Result<(), ReconcileError>
where
    C: PlatformClient,
    Clk: Clock,
    R: CredentialResolver,
{
    let Some(node_scan) = client.get_node_scan(name).await? else {
        return Ok(());
    };

    let workload = workload_name(name);
    let now_ms = clock.now_epoch_ms();

    let node_exists = if node_scan.status.phase == NodeScanPhase::Pending {
        Some(client.node_exists(&node_scan.spec.node_name).await?)
    } else {
        None
    };

    let policy = if node_scan.status.phase == NodeScanPhase::Pending {
        match &node_scan.spec.policy_ref {
            Some(policy_name) => Some(client.get_scan_policy(policy_name).await?),
            None => None,
        }
    } else {
        None
    };

    let workload_obs = if node_scan.status.phase == NodeScanPhase::Running {
        client.get_workload(&workload).await?
    } else {
        None
    };

    let cache = client
        .get_scan_cache_by_node(&node_scan.spec.node_name)
        .await?
        .map(|(spec, _status)| spec)
        .unwrap_or_else(|| clamscan_core::ScanCacheSpec::empty(&node_scan.spec.node_name));

    let phase_before = node_scan.status.phase;
    let was_completed_transition =
        phase_before == NodeScanPhase::Running && workload_obs.as_ref().map(|w| w.phase) == Some(WorkloadPhase::Succeeded);

    let ctx = NodeScanContext {
        node_scan: node_scan.clone(),
        node_exists,
        policy: policy.clone(),
        workload: workload_obs,
        cache,
    };

    let mut decision = decide(&ctx, &workload, now_ms);

    // Notification effects and the policy usage bump both need the resolved
    // policy, which `decide` doesn't carry past the Pending branch; splice
    // them in here on the transition to Completed, keeping `decide` itself
    // free of the extra parameter. Usage is bumped on every completion that
    // references a policy (spec §4.1 "bump policy usage"); notifications
    // only fire when files were actually found (spec §4.1 "Notifications").
    if was_completed_transition {
        if let Some(Some(resolved_policy)) = policy_for_notifications(&node_scan, client).await {
            let mut updated = resolved_policy;
            if decision.status.files_infected > 0 {
                let mut effects = build_notification_effects(
                    &updated.spec.notifications,
                    &infected_summary(&decision.status.infected_files),
                    decision.status.files_infected,
                );
                decision.effects.append(&mut effects);
            }
            updated.record_use(now_ms);
            metrics::SCANPOLICY_USAGE_TOTAL.with_label_values(&[&updated.name]).inc();
            decision
                .effects
                .push(Effect::UpdateScanPolicyStatus { name: updated.name.clone(), status: updated.status });
        }
    }

    record_metrics(&node_scan, phase_before, &decision.status, now_ms);

    client.update_node_scan_status(name, decision.status).await?;
    apply_effects(client, resolver, decision.effects).await
}

/// Update the process-wide Prometheus registers for this reconcile's
/// observed transition (spec §6 "Metrics exposed").
fn record_metrics(node_scan: &NodeScan, phase_before: NodeScanPhase, status: &clamscan_core::NodeScanStatus, _now_ms: u64) {
    if phase_before == NodeScanPhase::Pending && status.phase == NodeScanPhase::Running {
        metrics::NODESCANS_RUNNING.inc();
        if let Some(strategy) = status.strategy_used {
            metrics::INCREMENTAL_SCANS_TOTAL.with_label_values(&[&strategy.to_string()]).inc();
        }
    }

    let was_running = phase_before == NodeScanPhase::Running;
    if was_running && status.phase != NodeScanPhase::Running {
        metrics::NODESCANS_RUNNING.dec();
    }

    let was_terminal_before = matches!(phase_before, NodeScanPhase::Completed | NodeScanPhase::Failed);
    let status_label = match status.phase {
        NodeScanPhase::Completed => Some("completed"),
        NodeScanPhase::Failed => Some("failed"),
        NodeScanPhase::Pending | NodeScanPhase::Running => None,
    };
    let Some(status_label) = status_label.filter(|_| !was_terminal_before) else {
        return;
    };
    metrics::NODESCANS_TOTAL.with_label_values(&[status_label]).inc();

    if status.phase != NodeScanPhase::Completed {
        return;
    }

    metrics::FILES_SCANNED_TOTAL.inc_by(status.files_scanned as f64);
    metrics::FILES_INFECTED_TOTAL.inc_by(status.files_infected as f64);
    if let Some(duration) = status.duration_secs {
        metrics::SCAN_DURATION_SECONDS
            .with_label_values(&[&node_scan.spec.node_name])
            .observe(duration as f64);
    }
    // `files_skipped` covers everything the scanner skipped (oversize,
    // excluded, unchanged-via-cache); the incremental-specific counter only
    // applies when the run actually used incremental mode.
    if status.strategy_used != Some(clamscan_core::ScanStrategy::Full) {
        metrics::FILES_SKIPPED_INCREMENTAL_TOTAL.inc_by(status.files_skipped as f64);
    }
    if let Some(rate) = status.cache_hit_rate_percent {
        metrics::CACHE_HIT_RATE_PERCENT.with_label_values(&[&node_scan.spec.node_name]).set(rate);
    }
    if let Some(saved) = status.estimated_time_saved_secs {
        metrics::TIME_SAVED_INCREMENTAL_SECONDS.inc_by(saved);
    }
}

async fn policy_for_notifications<C: PlatformClient>(
    node_scan: &NodeScan,
    client: &C,
) -> Option<Option<ScanPolicy>> {
    match &node_scan.spec.policy_ref {
        Some(policy_name) => client.get_scan_policy(policy_name).await.ok(),
        None => None,
    }
}

#[cfg(test)]
#[path = "node_scan_reconciler_tests.rs"]
mod tests;
