// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::node_scan::NodeScanSpec;
use crate::priority::Priority;

fn bare_spec() -> NodeScanSpec {
    NodeScanSpec {
        node_name: "worker-1".into(),
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

#[test]
fn falls_back_to_hardcoded_defaults_with_no_policy() {
    let resolved = resolve(&bare_spec(), None);
    assert_eq!(resolved.paths, vec!["/host/var/lib", "/host/opt"]);
    assert_eq!(resolved.max_concurrent, DEFAULT_MAX_CONCURRENT);
    assert_eq!(resolved.file_timeout_ms, DEFAULT_FILE_TIMEOUT_MS);
    assert_eq!(resolved.connect_timeout_ms, DEFAULT_CONNECT_TIMEOUT_MS);
    assert_eq!(resolved.max_file_size_bytes, DEFAULT_MAX_FILE_SIZE_BYTES);
    assert_eq!(resolved.ttl_after_completion_secs, DEFAULT_TTL_AFTER_COMPLETION_SECS);
    // medium priority band
    assert_eq!(resolved.resources.cpu_request, "100m");
}

#[test]
fn policy_value_wins_when_node_scan_field_unset() {
    let policy = ScanPolicySpec {
        paths: Some(vec!["/host/etc".into()]),
        ..Default::default()
    };
    let resolved = resolve(&bare_spec(), Some(&policy));
    assert_eq!(resolved.paths, vec!["/host/etc".to_string()]);
}

#[test]
fn node_scan_value_wins_over_policy_value() {
    let policy = ScanPolicySpec {
        paths: Some(vec!["/host/etc".into()]),
        ..Default::default()
    };
    let mut spec = bare_spec();
    spec.paths = Some(vec!["/host/srv".into()]);
    let resolved = resolve(&spec, Some(&policy));
    assert_eq!(resolved.paths, vec!["/host/srv".to_string()]);
}

#[test]
fn priority_band_used_when_resources_unset_anywhere() {
    let mut spec = bare_spec();
    spec.priority = Priority::High;
    let resolved = resolve(&spec, None);
    assert_eq!(resolved.resources.cpu_request, "500m");
}

#[test]
fn explicit_node_scan_resources_beat_priority_band() {
    let mut spec = bare_spec();
    spec.priority = Priority::High;
    spec.resources = Some(ResourceEnvelope {
        cpu_request: "10m".into(),
        mem_request: "10Mi".into(),
        cpu_limit: "20m".into(),
        mem_limit: "20Mi".into(),
    });
    let resolved = resolve(&spec, None);
    assert_eq!(resolved.resources.cpu_request, "10m");
}
