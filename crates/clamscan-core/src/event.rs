// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-visible platform events emitted on every state transition (spec §7).

use serde::{Deserialize, Serialize};

/// The kind of declarative resource an [`OperatorEvent`] is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    NodeScan,
    ClusterScan,
    ScanPolicy,
    ScanSchedule,
    ScanCache,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResourceKind::NodeScan => "NodeScan",
            ResourceKind::ClusterScan => "ClusterScan",
            ResourceKind::ScanPolicy => "ScanPolicy",
            ResourceKind::ScanSchedule => "ScanSchedule",
            ResourceKind::ScanCache => "ScanCache",
        };
        write!(f, "{s}")
    }
}

/// Reason tag for an emitted event (spec §7 "event types").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum EventReason {
    JobCreated,
    ScanCompleted,
    ScanFailed,
    NodeNotFound,
    ScanPolicyNotFound,
    NotificationFailed,
}

impl std::fmt::Display for EventReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EventReason::JobCreated => "JobCreated",
            EventReason::ScanCompleted => "ScanCompleted",
            EventReason::ScanFailed => "ScanFailed",
            EventReason::NodeNotFound => "NodeNotFound",
            EventReason::ScanPolicyNotFound => "ScanPolicyNotFound",
            EventReason::NotificationFailed => "NotificationFailed",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Normal,
    Warning,
}

/// A platform event recorded against an involved resource, mirroring the
/// orchestration platform's own event objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorEvent {
    pub involved_kind: ResourceKind,
    pub involved_name: String,
    pub event_type: EventType,
    pub reason: EventReason,
    pub message: String,
}

impl OperatorEvent {
    pub fn normal(
        involved_kind: ResourceKind,
        involved_name: impl Into<String>,
        reason: EventReason,
        message: impl Into<String>,
    ) -> Self {
        Self {
            involved_kind,
            involved_name: involved_name.into(),
            event_type: EventType::Normal,
            reason,
            message: message.into(),
        }
    }

    pub fn warning(
        involved_kind: ResourceKind,
        involved_name: impl Into<String>,
        reason: EventReason,
        message: impl Into<String>,
    ) -> Self {
        Self {
            involved_kind,
            involved_name: involved_name.into(),
            event_type: EventType::Warning,
            reason,
            message: message.into(),
        }
    }

    /// Compact one-line summary for structured log spans.
    pub fn log_summary(&self) -> String {
        format!(
            "{}/{} {} {}",
            self.involved_kind, self.involved_name, self.reason, self.message
        )
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
