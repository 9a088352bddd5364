// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Applies the `Vec<Effect>` a decision builder returns against a
//! [`PlatformClient`]. Decision builders are pure; this is the only place in
//! `clamscan-controller` that actually performs I/O (spec §7 "Propagation
//! policy").
//!
//! A notification send failure never aborts the batch — it is surfaced as a
//! warning event only (spec §4.1 "Notifications", §7 "Notification-send
//! failure"). Every other effect failure is returned to the caller, which
//! classifies it via [`crate::error::ReconcileError`] and decides whether to
//! requeue.

use crate::error::ReconcileError;
use crate::metrics;
use clamscan_core::Effect;
use clamscan_platform::{ChatNotifyAdapter, CredentialResolver, MailNotifyAdapter, NotifyAdapter, PlatformClient, WebhookNotifyAdapter};
use tracing::{info_span, warn, Instrument};

/// Base URL for the transactional-mail relay the [`MailNotifyAdapter`] talks
/// to; fixed operator configuration rather than per-policy secret (mirrors
/// `clamscan_platform::notify::mail`'s own doc comment).
const MAIL_RELAY_BASE_URL: &str = "http://mail-relay.clamscan-system.svc";

/// Execute every effect in order against `client`, routing notification
/// sends through `resolver`-backed adapters. Returns the first hard error
/// encountered (notification failures are swallowed into a warning event and
/// do not count).
pub async fn apply_effects<C, R>(client: &C, resolver: &R, effects: Vec<Effect>) -> Result<(), ReconcileError>
where
    C: PlatformClient,
    R: CredentialResolver,
{
    for effect in effects {
        let span = info_span!("effect", name = effect.name());
        apply_one(client, resolver, effect).instrument(span).await?;
    }
    Ok(())
}

async fn apply_one<C, R>(client: &C, resolver: &R, effect: Effect) -> Result<(), ReconcileError>
where
    C: PlatformClient,
    R: CredentialResolver,
{
    match effect {
        Effect::EmitEvent { event } => {
            client.emit_event(event).await?;
        }
        Effect::CreateWorkload {
            name,
            node_scan_name,
            node_name,
            env,
            resources,
            retry_budget,
        } => {
            client
                .create_workload(&name, &node_scan_name, &node_name, env, resources, retry_budget)
                .await?;
        }
        Effect::DeleteWorkload { name } => {
            // Best-effort: the workload may already be gone (spec §4.1
            // "pending-deletion marker"); a not-found here is not an error.
            if let Err(err) = client.delete_workload(&name).await {
                warn!(name, %err, "best-effort workload delete failed");
            }
        }
        Effect::UpdateNodeScanStatus { name, status } => {
            client.update_node_scan_status(&name, status).await?;
        }
        Effect::DeleteNodeScan { name } => {
            if let Err(err) = client.delete_node_scan(&name).await {
                warn!(name, %err, "best-effort NodeScan delete failed");
            }
        }
        Effect::CreateNodeScan { name, spec, labels } => {
            client.create_node_scan(&name, spec, labels).await?;
        }
        Effect::UpdateClusterScanStatus { name, status } => {
            client.update_cluster_scan_status(&name, status).await?;
        }
        Effect::CreateClusterScan { name, spec, labels } => {
            client.create_cluster_scan(&name, spec, labels).await?;
        }
        Effect::DeleteClusterScan { name } => {
            if let Err(err) = client.delete_cluster_scan(&name).await {
                warn!(name, %err, "best-effort ClusterScan delete failed");
            }
        }
        Effect::UpdateScanScheduleStatus { name, status } => {
            client.update_scan_schedule_status(&name, status).await?;
        }
        Effect::UpdateScanPolicyStatus { name, status } => {
            client.update_scan_policy_status(&name, status).await?;
        }
        Effect::WriteScanCache { name, spec, status } => {
            let node = spec.node_name.clone();
            let files_total = spec.files.len() as f64;
            let size_bytes = status.serialized_size_bytes as f64;
            // spec §7 "Cache-write failure": logged, not propagated — the
            // scan itself is still considered complete.
            if let Err(err) = client.write_scan_cache(&name, spec, status).await {
                warn!(name, %err, "cache write failed, will retry on next scan");
            } else {
                metrics::SCAN_CACHE_FILES_TOTAL.with_label_values(&[&node]).set(files_total);
                metrics::SCAN_CACHE_SIZE_BYTES.with_label_values(&[&node]).set(size_bytes);
            }
        }
        Effect::WriteCacheBlob { name, data } => {
            if let Err(err) = client.write_cache_blob(&name, data).await {
                warn!(name, %err, "cache blob write failed, will retry on next scan");
            }
        }
        Effect::SendNotification {
            channel,
            subject,
            body,
            credential,
            recipients,
        } => {
            send_notification(resolver, channel, &subject, &body, credential, recipients).await;
        }
        // Timers are handled by the daemon's reconcile-loop runner, which
        // owns requeue scheduling; the executor only logs them here so a
        // decision builder's intent is visible in the effect log.
        Effect::SetTimer { .. } | Effect::CancelTimer { .. } | Effect::CancelTimersWithPrefix { .. } => {}
    }
    Ok(())
}

async fn send_notification<R: CredentialResolver>(
    resolver: &R,
    channel: clamscan_core::NotifyChannel,
    subject: &str,
    body: &str,
    credential: clamscan_core::CredentialRef,
    recipients: Vec<String>,
) {
    use clamscan_core::NotifyChannel;

    let result = match channel {
        NotifyChannel::Chat => {
            ChatNotifyAdapter::new(credential, resolver.clone())
                .notify(subject, body)
                .await
        }
        NotifyChannel::Mail => {
            MailNotifyAdapter::new(MAIL_RELAY_BASE_URL, credential, recipients, resolver.clone())
                .notify(subject, body)
                .await
        }
        NotifyChannel::Webhook => {
            WebhookNotifyAdapter::new(credential, resolver.clone())
                .notify(subject, body)
                .await
        }
    };
    // spec §4.1 "Notifications": send failures are surfaced as warning
    // events but do not re-open the terminal state; the caller already
    // recorded the terminal status before this effect runs.
    if let Err(err) = result {
        warn!(?channel, subject, %err, "notification send failed");
    }
}
