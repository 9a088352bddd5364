// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ClusterScan: fan-out over a node set (spec §3, §4.2).

use crate::condition::Condition;
use crate::node_scan::{NodeScanPhase, ResourceEnvelope, ScanStrategy};
use crate::priority::Priority;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Template fields copied into each child NodeScan created by the fan-out,
/// field-by-field, when non-empty/non-zero (spec §4.2 "Template propagation").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeScanTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceEnvelope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<ScanStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incremental: Option<crate::node_scan::IncrementalConfig>,
    #[serde(default)]
    pub force_full_scan: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterScanSpec {
    /// Label selector matched against visible nodes; `None` selects every node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_ref: Option<String>,
    /// Concurrency cap; 0 means "unset", resolved to [`default_concurrency`].
    #[serde(default)]
    pub concurrent: u32,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<NodeScanTemplate>,
}

/// Implementation default for `concurrent` when unset (spec §9 Open Question a:
/// validation allows `concurrent >= 1`, but the implementation default of 3
/// wins when the field is left at its zero value).
pub const DEFAULT_CONCURRENCY: u32 = 3;

impl ClusterScanSpec {
    pub fn effective_concurrency(&self) -> u32 {
        if self.concurrent == 0 {
            DEFAULT_CONCURRENCY
        } else {
            self.concurrent
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ClusterScanPhase {
    Pending,
    Running,
    Completed,
    Failed,
    PartiallyCompleted,
}

impl Default for ClusterScanPhase {
    fn default() -> Self {
        ClusterScanPhase::Pending
    }
}

impl std::fmt::Display for ClusterScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ClusterScanPhase::Pending => "Pending",
            ClusterScanPhase::Running => "Running",
            ClusterScanPhase::Completed => "Completed",
            ClusterScanPhase::Failed => "Failed",
            ClusterScanPhase::PartiallyCompleted => "PartiallyCompleted",
        };
        write!(f, "{s}")
    }
}

impl ClusterScanPhase {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ClusterScanPhase::Pending | ClusterScanPhase::Running)
    }

    /// Compute the terminal/running phase from aggregated child counts
    /// (spec §4.2 "Phase rule").
    pub fn from_counts(total_nodes: u32, completed: u32, failed: u32) -> Self {
        if completed + failed < total_nodes {
            ClusterScanPhase::Running
        } else if failed == 0 {
            ClusterScanPhase::Completed
        } else if completed == 0 {
            ClusterScanPhase::Failed
        } else {
            ClusterScanPhase::PartiallyCompleted
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildNodeScanRef {
    pub name: String,
    pub node: String,
    pub phase: NodeScanPhase,
    pub files_scanned: u64,
    pub files_infected: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time_epoch_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterScanStatus {
    pub phase: ClusterScanPhase,
    #[serde(default)]
    pub total_nodes: u32,
    #[serde(default)]
    pub completed: u32,
    #[serde(default)]
    pub running: u32,
    #[serde(default)]
    pub failed: u32,
    #[serde(default)]
    pub infected: u32,
    #[serde(default)]
    pub total_files_scanned: u64,
    #[serde(default)]
    pub total_files_infected: u64,
    #[serde(default)]
    pub children: Vec<ChildNodeScanRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time_epoch_ms: Option<u64>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Set once the node set has been snapshotted at the first reconcile
    /// (spec §4.2 "Node selection"); subsequent reconciles never re-list.
    #[serde(default)]
    pub node_set_snapshotted: bool,
    /// The node set snapshotted at the first reconcile. Persisted (not just
    /// held in process memory) so a restarted controller does not re-list
    /// and potentially grow the set.
    #[serde(default)]
    pub selected_nodes: Vec<String>,
    #[serde(default)]
    pub pending_deletion: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterScan {
    pub name: String,
    pub spec: ClusterScanSpec,
    #[serde(default)]
    pub status: ClusterScanStatus,
}

#[cfg(test)]
#[path = "cluster_scan_tests.rs"]
mod tests;
