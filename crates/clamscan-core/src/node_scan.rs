// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! NodeScan: desired and observed state of a single-node scan (spec §3).

use crate::condition::Condition;
use crate::priority::{Priority, ResourceEnvelope};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStrategy {
    Full,
    Incremental,
    ModifiedOnly,
    Smart,
}

impl Default for ScanStrategy {
    fn default() -> Self {
        ScanStrategy::Full
    }
}

impl std::fmt::Display for ScanStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScanStrategy::Full => "full",
            ScanStrategy::Incremental => "incremental",
            ScanStrategy::ModifiedOnly => "modified-only",
            ScanStrategy::Smart => "smart",
        };
        write!(f, "{s}")
    }
}

/// Incremental-scan configuration embedded in a NodeScan or ScanPolicy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncrementalConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Every N-th scan is forced to full, regardless of cache age.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_interval: Option<u32>,
    /// Hours after which the cache is considered stale and a full scan forced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_expiration_hours: Option<u64>,
    /// Hours; files modified more recently than this are eligible for
    /// modified-only / smart strategies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_age_hours: Option<u64>,
}

impl IncrementalConfig {
    pub const DEFAULT_BASELINE_INTERVAL: u32 = 7;
    pub const DEFAULT_CACHE_EXPIRATION_HOURS: u64 = 168;
    pub const DEFAULT_MAX_FILE_AGE_HOURS: u64 = 24;

    pub fn baseline_interval(&self) -> u32 {
        self.baseline_interval.unwrap_or(Self::DEFAULT_BASELINE_INTERVAL)
    }

    pub fn cache_expiration_hours(&self) -> u64 {
        self.cache_expiration_hours
            .unwrap_or(Self::DEFAULT_CACHE_EXPIRATION_HOURS)
    }

    pub fn max_file_age_hours(&self) -> u64 {
        self.max_file_age_hours
            .unwrap_or(Self::DEFAULT_MAX_FILE_AGE_HOURS)
    }
}

/// Desired state of a single-node scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeScanSpec {
    /// Immutable after creation.
    pub node_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_ref: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_patterns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceEnvelope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_after_completion_secs: Option<u64>,
    #[serde(default)]
    pub strategy: ScanStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incremental: Option<IncrementalConfig>,
    #[serde(default)]
    pub force_full_scan: bool,
}

impl NodeScanSpec {
    pub const MAX_PATHS: usize = 100;
    pub const MAX_PATH_LEN: usize = 4096;
    pub const MAX_EXCLUDES: usize = 200;
    pub const MAX_EXCLUDE_LEN: usize = 1024;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum NodeScanPhase {
    Pending,
    Running,
    Completed,
    Failed,
}

impl Default for NodeScanPhase {
    fn default() -> Self {
        NodeScanPhase::Pending
    }
}

impl NodeScanPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, NodeScanPhase::Completed | NodeScanPhase::Failed)
    }
}

impl std::fmt::Display for NodeScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NodeScanPhase::Pending => "Pending",
            NodeScanPhase::Running => "Running",
            NodeScanPhase::Completed => "Completed",
            NodeScanPhase::Failed => "Failed",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfectedFile {
    pub path: String,
    pub virus_names: Vec<String>,
    pub size_bytes: u64,
}

/// Observed state of a single-node scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeScanStatus {
    pub phase: NodeScanPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time_epoch_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time_epoch_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,
    #[serde(default)]
    pub files_scanned: u64,
    #[serde(default)]
    pub files_infected: u64,
    #[serde(default)]
    pub files_skipped: u64,
    #[serde(default)]
    pub error_count: u64,
    #[serde(default)]
    pub infected_files: Vec<InfectedFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_ref: Option<String>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy_used: Option<ScanStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_hit_rate_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time_saved_secs: Option<f64>,
    /// Best-effort marker requesting deletion of owned children before the
    /// NodeScan record itself is removed (spec §4.1 "pending-deletion marker").
    #[serde(default)]
    pub pending_deletion: bool,
}

pub const MAX_INFECTED_FILES: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeScan {
    pub name: String,
    pub spec: NodeScanSpec,
    #[serde(default)]
    pub status: NodeScanStatus,
}

#[cfg(test)]
#[path = "node_scan_tests.rs"]
mod tests;
