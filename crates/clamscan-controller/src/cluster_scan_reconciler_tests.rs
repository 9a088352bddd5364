// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use clamscan_core::test_support::{cluster_scan, node_scan};
use clamscan_core::{ClusterScanPhase, FakeClock, NodeScanPhase, NodeScanTemplate};
use clamscan_platform::{FakeCredentialResolver, FakePlatformClient};

#[test]
fn child_name_is_deterministic_and_truncated() {
    let a = child_name("cs-1", "node-a");
    let b = child_name("cs-1", "node-a");
    assert_eq!(a, b);
    assert!(a.len() <= 63);
}

#[test]
fn child_spec_copies_only_non_empty_template_fields() {
    let mut cs = cluster_scan("cs-1", 2);
    cs.spec.priority = clamscan_core::Priority::High;
    cs.spec.template = Some(NodeScanTemplate {
        paths: Some(vec!["/host/etc".to_string()]),
        max_concurrent: Some(0), // explicitly zero: must not override the default
        resources: None,
        strategy: None,
        incremental: None,
        force_full_scan: true,
    });

    let spec = child_spec(&cs, "node-a");

    assert_eq!(spec.node_name, "node-a");
    assert_eq!(spec.priority, clamscan_core::Priority::High);
    assert_eq!(spec.paths, Some(vec!["/host/etc".to_string()]));
    assert_eq!(spec.max_concurrent, None);
    assert!(spec.force_full_scan);
}

#[test]
fn aggregate_counts_children_by_phase() {
    let mut completed = node_scan("cs-1-node-a", "node-a");
    completed.status.phase = NodeScanPhase::Completed;
    completed.status.files_scanned = 10;
    completed.status.files_infected = 2;

    let mut failed = node_scan("cs-1-node-b", "node-b");
    failed.status.phase = NodeScanPhase::Failed;

    let running = node_scan("cs-1-node-c", "node-c");

    let agg = aggregate(&[completed, failed, running]);

    assert_eq!(agg.completed, 1);
    assert_eq!(agg.failed, 1);
    assert_eq!(agg.running, 1);
    assert_eq!(agg.infected, 1);
    assert_eq!(agg.total_files_scanned, 10);
    assert_eq!(agg.total_files_infected, 2);
    assert_eq!(agg.children.len(), 3);
}

fn setup_client(node_count: usize) -> FakePlatformClient {
    let client = FakePlatformClient::new();
    for i in 0..node_count {
        client.put_node(format!("node-{i}"));
    }
    client
}

#[tokio::test]
async fn reconcile_snapshots_node_set_and_fans_out_up_to_the_concurrency_cap() {
    let client = setup_client(5);
    client.put_cluster_scan(cluster_scan("cs-1", 2));
    let clock = FakeClock::default();
    let resolver = FakeCredentialResolver::new();

    reconcile(&client, &clock, &resolver, "cs-1").await.unwrap();

    let cs = client.cluster_scan("cs-1").unwrap();
    assert!(cs.status.node_set_snapshotted);
    assert_eq!(cs.status.total_nodes, 5);
    assert_eq!(cs.status.phase, ClusterScanPhase::Running);

    let create_calls = client
        .calls()
        .into_iter()
        .filter(|c| matches!(c, clamscan_platform::PlatformCall::CreateNodeScan { .. }))
        .count();
    assert_eq!(create_calls, 2, "fan-out must stop at the concurrency cap");
}

#[tokio::test]
async fn reconcile_does_not_refan_out_past_the_cap_while_children_are_running() {
    let client = setup_client(3);
    client.put_cluster_scan(cluster_scan("cs-1", 2));
    let clock = FakeClock::default();
    let resolver = FakeCredentialResolver::new();

    reconcile(&client, &clock, &resolver, "cs-1").await.unwrap();

    // Simulate the two fanned-out children having picked up their workload,
    // so the running-count the next reconcile reads back is non-zero.
    for i in 0..2 {
        let name = child_name("cs-1", &format!("node-{i}"));
        let mut ns = client.node_scan(&name).unwrap();
        ns.status.phase = NodeScanPhase::Running;
        client.put_node_scan(ns);
    }

    reconcile(&client, &clock, &resolver, "cs-1").await.unwrap();

    let create_calls = client
        .calls()
        .into_iter()
        .filter(|c| matches!(c, clamscan_platform::PlatformCall::CreateNodeScan { .. }))
        .count();
    assert_eq!(create_calls, 2, "already-running children must not be recreated past the cap");
}

#[tokio::test]
async fn reconcile_aggregates_children_and_transitions_to_completed() {
    let client = setup_client(2);
    client.put_cluster_scan(cluster_scan("cs-1", 5));
    let clock = FakeClock::default();
    let resolver = FakeCredentialResolver::new();

    reconcile(&client, &clock, &resolver, "cs-1").await.unwrap();

    for i in 0..2 {
        let name = child_name("cs-1", &format!("node-{i}"));
        let mut ns = client.node_scan(&name).unwrap();
        ns.status.phase = NodeScanPhase::Completed;
        ns.status.files_scanned = 5;
        client.put_node_scan(ns);
    }

    reconcile(&client, &clock, &resolver, "cs-1").await.unwrap();

    let cs = client.cluster_scan("cs-1").unwrap();
    assert_eq!(cs.status.phase, ClusterScanPhase::Completed);
    assert_eq!(cs.status.completed, 2);
    assert_eq!(cs.status.total_files_scanned, 10);
    assert!(cs.status.completion_time_epoch_ms.is_some());
}

#[tokio::test]
async fn reconcile_transitions_to_partially_completed_on_mixed_outcomes() {
    let client = setup_client(2);
    client.put_cluster_scan(cluster_scan("cs-1", 5));
    let clock = FakeClock::default();
    let resolver = FakeCredentialResolver::new();

    reconcile(&client, &clock, &resolver, "cs-1").await.unwrap();

    let name_a = child_name("cs-1", "node-0");
    let mut a = client.node_scan(&name_a).unwrap();
    a.status.phase = NodeScanPhase::Completed;
    client.put_node_scan(a);

    let name_b = child_name("cs-1", "node-1");
    let mut b = client.node_scan(&name_b).unwrap();
    b.status.phase = NodeScanPhase::Failed;
    client.put_node_scan(b);

    reconcile(&client, &clock, &resolver, "cs-1").await.unwrap();

    let cs = client.cluster_scan("cs-1").unwrap();
    assert_eq!(cs.status.phase, ClusterScanPhase::PartiallyCompleted);
}

#[tokio::test]
async fn reconcile_deletes_children_on_pending_deletion() {
    let client = setup_client(2);
    client.put_cluster_scan(cluster_scan("cs-1", 5));
    let clock = FakeClock::default();
    let resolver = FakeCredentialResolver::new();

    reconcile(&client, &clock, &resolver, "cs-1").await.unwrap();

    let mut cs = client.cluster_scan("cs-1").unwrap();
    cs.status.pending_deletion = true;
    client.put_cluster_scan(cs);

    reconcile(&client, &clock, &resolver, "cs-1").await.unwrap();

    let delete_calls = client
        .calls()
        .into_iter()
        .filter(|c| matches!(c, clamscan_platform::PlatformCall::DeleteNodeScan { .. }))
        .count();
    assert_eq!(delete_calls, 2);
    assert!(!client.cluster_scan("cs-1").unwrap().status.pending_deletion);
}
