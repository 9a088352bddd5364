// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects represent side effects a reconciler wants the executor to perform
//! against the orchestration platform. Decision builders are pure functions
//! that return `Vec<Effect>`; only the executor touches [`PlatformClient`]
//! (defined in `clamscan-platform`), which keeps reconcile logic testable
//! without a platform double beyond the effects it returns.

use crate::cluster_scan::{ClusterScanSpec, ClusterScanStatus};
use crate::event::OperatorEvent;
use crate::node_scan::{NodeScanSpec, NodeScanStatus};
use crate::priority::ResourceEnvelope;
use crate::scan_cache::{ScanCacheSpec, ScanCacheStatus};
use crate::scan_policy::{CredentialRef, ScanPolicyStatus};
use crate::scan_schedule::ScanScheduleStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyChannel {
    Chat,
    Mail,
    Webhook,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Emit a platform event against an involved resource.
    EmitEvent { event: OperatorEvent },

    /// Create the batch workload backing a NodeScan (spec §4.1 "Workload construction").
    CreateWorkload {
        name: String,
        node_scan_name: String,
        node_name: String,
        env: Vec<(String, String)>,
        resources: ResourceEnvelope,
        retry_budget: u32,
    },

    /// Best-effort delete of an owned workload (spec §4.1 "pending-deletion marker").
    DeleteWorkload { name: String },

    UpdateNodeScanStatus { name: String, status: NodeScanStatus },
    DeleteNodeScan { name: String },

    CreateNodeScan {
        name: String,
        spec: NodeScanSpec,
        labels: BTreeMap<String, String>,
    },

    UpdateClusterScanStatus {
        name: String,
        status: ClusterScanStatus,
    },

    CreateClusterScan {
        name: String,
        spec: ClusterScanSpec,
        labels: BTreeMap<String, String>,
    },
    DeleteClusterScan { name: String },

    UpdateScanScheduleStatus {
        name: String,
        status: ScanScheduleStatus,
    },

    UpdateScanPolicyStatus {
        name: String,
        status: ScanPolicyStatus,
    },

    /// Persist the merged incremental-scan cache (spec §4.4 "Merge on completion").
    WriteScanCache {
        name: String,
        spec: ScanCacheSpec,
        status: ScanCacheStatus,
    },

    /// Write a large cache as a platform key/value blob when it doesn't fit
    /// inline in the scanner environment (spec §4.4 "Environment emission").
    WriteCacheBlob {
        name: String,
        data: std::collections::HashMap<String, String>,
    },

    /// One channel of one policy's notification configuration, carrying
    /// enough of that channel's config for the executor to build the
    /// right adapter on the fly (policies are resolved per-scan, so the
    /// executor cannot hold pre-wired per-channel adapters).
    SendNotification {
        channel: NotifyChannel,
        subject: String,
        body: String,
        credential: CredentialRef,
        recipients: Vec<String>,
    },

    SetTimer { id: String, duration_secs: u64 },
    CancelTimer { id: String },
    CancelTimersWithPrefix { prefix: String },
}

impl Effect {
    /// Effect name for log spans (e.g. "create_workload").
    pub fn name(&self) -> &'static str {
        match self {
            Effect::EmitEvent { .. } => "emit_event",
            Effect::CreateWorkload { .. } => "create_workload",
            Effect::DeleteWorkload { .. } => "delete_workload",
            Effect::UpdateNodeScanStatus { .. } => "update_node_scan_status",
            Effect::DeleteNodeScan { .. } => "delete_node_scan",
            Effect::CreateNodeScan { .. } => "create_node_scan",
            Effect::UpdateClusterScanStatus { .. } => "update_cluster_scan_status",
            Effect::CreateClusterScan { .. } => "create_cluster_scan",
            Effect::DeleteClusterScan { .. } => "delete_cluster_scan",
            Effect::UpdateScanScheduleStatus { .. } => "update_scan_schedule_status",
            Effect::UpdateScanPolicyStatus { .. } => "update_scan_policy_status",
            Effect::WriteScanCache { .. } => "write_scan_cache",
            Effect::WriteCacheBlob { .. } => "write_cache_blob",
            Effect::SendNotification { .. } => "send_notification",
            Effect::SetTimer { .. } => "set_timer",
            Effect::CancelTimer { .. } => "cancel_timer",
            Effect::CancelTimersWithPrefix { .. } => "cancel_timers_with_prefix",
        }
    }

    /// Key-value pairs for structured logging.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::EmitEvent { event } => vec![("event", event.log_summary())],
            Effect::CreateWorkload {
                name,
                node_scan_name,
                node_name,
                ..
            } => vec![
                ("name", name.clone()),
                ("node_scan", node_scan_name.clone()),
                ("node", node_name.clone()),
            ],
            Effect::DeleteWorkload { name } => vec![("name", name.clone())],
            Effect::UpdateNodeScanStatus { name, status } => vec![
                ("name", name.clone()),
                ("phase", status.phase.to_string()),
            ],
            Effect::DeleteNodeScan { name } => vec![("name", name.clone())],
            Effect::CreateNodeScan { name, spec, .. } => {
                vec![("name", name.clone()), ("node", spec.node_name.clone())]
            }
            Effect::UpdateClusterScanStatus { name, status } => vec![
                ("name", name.clone()),
                ("phase", status.phase.to_string()),
            ],
            Effect::CreateClusterScan { name, .. } => vec![("name", name.clone())],
            Effect::DeleteClusterScan { name } => vec![("name", name.clone())],
            Effect::UpdateScanScheduleStatus { name, .. } => vec![("name", name.clone())],
            Effect::UpdateScanPolicyStatus { name, status } => vec![
                ("name", name.clone()),
                ("usage_count", status.usage_count.to_string()),
            ],
            Effect::WriteScanCache { name, spec, .. } => vec![
                ("name", name.clone()),
                ("files", spec.files.len().to_string()),
            ],
            Effect::WriteCacheBlob { name, .. } => vec![("name", name.clone())],
            Effect::SendNotification { channel, subject, .. } => vec![
                ("channel", format!("{:?}", channel)),
                ("subject", subject.clone()),
            ],
            Effect::SetTimer { id, duration_secs } => {
                vec![("timer_id", id.clone()), ("duration_secs", duration_secs.to_string())]
            }
            Effect::CancelTimer { id } => vec![("timer_id", id.clone())],
            Effect::CancelTimersWithPrefix { prefix } => vec![("prefix", prefix.clone())],
        }
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
