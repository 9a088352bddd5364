// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scan priority and the hardcoded resource-envelope bands (spec §4.1).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// CPU/memory request and limit envelope for the batch workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEnvelope {
    pub cpu_request: String,
    pub mem_request: String,
    pub cpu_limit: String,
    pub mem_limit: String,
}

impl Priority {
    /// The hardcoded CPU/memory band for this priority, per spec §4.1.
    pub fn band(self) -> ResourceEnvelope {
        match self {
            Priority::High => ResourceEnvelope {
                cpu_request: "500m".into(),
                mem_request: "512Mi".into(),
                cpu_limit: "2000m".into(),
                mem_limit: "1Gi".into(),
            },
            Priority::Medium => ResourceEnvelope {
                cpu_request: "100m".into(),
                mem_request: "256Mi".into(),
                cpu_limit: "1000m".into(),
                mem_limit: "512Mi".into(),
            },
            Priority::Low => ResourceEnvelope {
                cpu_request: "50m".into(),
                mem_request: "128Mi".into(),
                cpu_limit: "500m".into(),
                mem_limit: "256Mi".into(),
            },
        }
    }
}

#[cfg(test)]
#[path = "priority_tests.rs"]
mod tests;
