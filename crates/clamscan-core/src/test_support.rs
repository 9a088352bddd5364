// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test builders for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::cluster_scan::{ClusterScan, ClusterScanSpec, ClusterScanStatus};
use crate::node_scan::{NodeScan, NodeScanSpec, NodeScanStatus, ScanStrategy};
use crate::priority::Priority;

pub fn bare_node_scan_spec(node_name: &str) -> NodeScanSpec {
    NodeScanSpec {
        node_name: node_name.to_string(),
        policy_ref: None,
        priority: Priority::Medium,
        paths: None,
        exclude_patterns: None,
        max_concurrent: None,
        file_timeout_ms: None,
        max_file_size_bytes: None,
        resources: None,
        ttl_after_completion_secs: None,
        strategy: ScanStrategy::Full,
        incremental: None,
        force_full_scan: false,
    }
}

pub fn node_scan(name: &str, node_name: &str) -> NodeScan {
    NodeScan {
        name: name.to_string(),
        spec: bare_node_scan_spec(node_name),
        status: NodeScanStatus::default(),
    }
}

pub fn cluster_scan(name: &str, concurrent: u32) -> ClusterScan {
    ClusterScan {
        name: name.to_string(),
        spec: ClusterScanSpec {
            concurrent,
            ..Default::default()
        },
        status: ClusterScanStatus::default(),
    }
}
