// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use clamscan_core::{EventReason, ResourceKind};

#[tokio::test]
async fn node_exists_reflects_seeded_nodes() {
    let client = FakePlatformClient::new();
    client.put_node("worker-1");
    assert!(client.node_exists("worker-1").await.unwrap());
    assert!(!client.node_exists("ghost").await.unwrap());
}

#[tokio::test]
async fn create_node_scan_is_idempotent_and_recorded() {
    let client = FakePlatformClient::new();
    let spec = clamscan_core::test_support::bare_node_scan_spec("worker-1");
    client.create_node_scan("s1", spec.clone(), Default::default()).await.unwrap();
    client.create_node_scan("s1", spec, Default::default()).await.unwrap();
    assert!(client.node_scan("s1").is_some());
    assert_eq!(client.calls().len(), 2);
}

#[tokio::test]
async fn update_node_scan_status_on_missing_resource_errors() {
    let client = FakePlatformClient::new();
    let result = client
        .update_node_scan_status("missing", clamscan_core::NodeScanStatus::default())
        .await;
    assert!(matches!(result, Err(PlatformError::NotFound(_))));
}

#[tokio::test]
async fn list_node_scans_returns_every_seeded_scan() {
    let client = FakePlatformClient::new();
    client.put_node_scan(clamscan_core::test_support::node_scan("cs1-worker-1", "worker-1"));
    client.put_node_scan(clamscan_core::test_support::node_scan("standalone", "worker-2"));
    let all = client.list_node_scans().await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn list_node_scans_by_clusterscan_label_matches_name_prefix() {
    let client = FakePlatformClient::new();
    client.put_node_scan(clamscan_core::test_support::node_scan("cs1-worker-1", "worker-1"));
    client.put_node_scan(clamscan_core::test_support::node_scan("other-worker-1", "worker-1"));
    let children = client.list_node_scans_by_label("clusterscan", "cs1").await.unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "cs1-worker-1");
}

#[tokio::test]
async fn create_workload_starts_running_and_accepts_appended_log_lines() {
    let client = FakePlatformClient::new();
    client
        .create_workload(
            "nodescan-s1",
            "s1",
            "worker-1",
            Vec::new(),
            clamscan_core::Priority::Medium.band(),
            3,
        )
        .await
        .unwrap();
    assert!(client.workload_exists("nodescan-s1"));
    client.append_workload_log("nodescan-s1", r#"{"message":"ok"}"#);
    let obs = client.get_workload("nodescan-s1").await.unwrap().unwrap();
    assert_eq!(obs.phase, WorkloadPhase::Running);
    assert_eq!(obs.log_lines.len(), 1);
}

#[tokio::test]
async fn emit_event_is_recorded_and_retrievable() {
    let client = FakePlatformClient::new();
    client
        .emit_event(clamscan_core::OperatorEvent::warning(
            ResourceKind::NodeScan,
            "s1",
            EventReason::NodeNotFound,
            "no such node",
        ))
        .await
        .unwrap();
    assert_eq!(client.events().len(), 1);
}

#[tokio::test]
async fn startup_probes_default_to_passing() {
    let client = FakePlatformClient::new();
    assert!(client.api_server_reachable().await.unwrap());
    assert!(client.self_subject_access_review("list", "nodescans").await.unwrap());
    assert!(client.virus_scanner_service_ready().await.unwrap());
}
