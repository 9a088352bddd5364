// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ScanSchedule: cron-driven trigger for ClusterScans (spec §3, §4.3).

use crate::cluster_scan::ClusterScanSpec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ConcurrencyPolicy {
    Allow,
    Forbid,
    Replace,
}

impl Default for ConcurrencyPolicy {
    fn default() -> Self {
        ConcurrencyPolicy::Allow
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanScheduleSpec {
    /// Standard 5-field cron expression.
    pub schedule: String,
    pub cluster_scan: ClusterScanSpec,
    #[serde(default)]
    pub suspend: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub successful_history_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_history_limit: Option<u32>,
    #[serde(default)]
    pub concurrency_policy: ConcurrencyPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_deadline_secs: Option<u64>,
}

pub const DEFAULT_SUCCESSFUL_HISTORY_LIMIT: u32 = 10;
pub const DEFAULT_FAILED_HISTORY_LIMIT: u32 = 3;

impl ScanScheduleSpec {
    pub fn successful_history_limit(&self) -> u32 {
        self.successful_history_limit
            .unwrap_or(DEFAULT_SUCCESSFUL_HISTORY_LIMIT)
    }

    pub fn failed_history_limit(&self) -> u32 {
        self.failed_history_limit
            .unwrap_or(DEFAULT_FAILED_HISTORY_LIMIT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveChildRef {
    pub name: String,
    pub created_at_epoch_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanScheduleStatus {
    #[serde(default)]
    pub active: Vec<ActiveChildRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_schedule_time_epoch_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_successful_time_epoch_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_schedule_time_epoch_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_child_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSchedule {
    pub name: String,
    pub spec: ScanScheduleSpec,
    #[serde(default)]
    pub status: ScanScheduleStatus,
}

#[cfg(test)]
#[path = "scan_schedule_tests.rs"]
mod tests;
