// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use clamscan_core::test_support::node_scan;
use clamscan_core::{
    ChatNotifyConfig, CredentialRef, FakeClock, NotificationConfig, ScanPolicySpec, ScanPolicyStatus,
};
use clamscan_platform::{FakeCredentialResolver, FakePlatformClient, WorkloadObservation, WorkloadPhase};

fn ctx(node_scan: NodeScan, node_exists: Option<bool>) -> NodeScanContext {
    NodeScanContext {
        node_scan,
        node_exists,
        policy: None,
        workload: None,
        cache: clamscan_core::ScanCacheSpec::empty("node-a"),
    }
}

#[test]
fn pending_fails_when_node_does_not_exist() {
    let ns = node_scan("ns-1", "node-a");
    let decision = decide(&ctx(ns, Some(false)), "nodescan-ns-1", 1_000);

    assert_eq!(decision.status.phase, NodeScanPhase::Failed);
    assert!(decision
        .status
        .conditions
        .iter()
        .any(|c| c.type_ == "NodeNotFound"));
    assert!(matches!(
        decision.effects.as_slice(),
        [Effect::EmitEvent { event }] if event.reason == clamscan_core::EventReason::NodeNotFound
    ));
}

#[test]
fn pending_fails_when_referenced_policy_not_found() {
    let mut ns = node_scan("ns-1", "node-a");
    ns.spec.policy_ref = Some("strict".to_string());
    let mut c = ctx(ns, Some(true));
    c.policy = Some(None);

    let decision = decide(&c, "nodescan-ns-1", 1_000);

    assert_eq!(decision.status.phase, NodeScanPhase::Failed);
    assert!(decision
        .status
        .conditions
        .iter()
        .any(|c| c.type_ == "ScanPolicyNotFound"));
}

#[test]
fn pending_creates_workload_and_moves_to_running() {
    let ns = node_scan("ns-1", "node-a");
    let decision = decide(&ctx(ns, Some(true)), "nodescan-ns-1", 1_000);

    assert_eq!(decision.status.phase, NodeScanPhase::Running);
    assert_eq!(decision.status.job_ref.as_deref(), Some("nodescan-ns-1"));
    assert_eq!(decision.status.strategy_used, Some(clamscan_core::ScanStrategy::Full));
    assert!(decision
        .effects
        .iter()
        .any(|e| matches!(e, Effect::CreateWorkload { name, node_name, .. } if name == "nodescan-ns-1" && node_name == "node-a")));
    assert!(decision
        .effects
        .iter()
        .any(|e| matches!(e, Effect::EmitEvent { event } if event.reason == clamscan_core::EventReason::JobCreated)));
}

#[test]
fn running_without_workload_observation_requeues() {
    let mut ns = node_scan("ns-1", "node-a");
    ns.status.phase = NodeScanPhase::Running;
    let decision = decide(&ctx(ns, None), "nodescan-ns-1", 2_000);

    assert_eq!(decision.status.phase, NodeScanPhase::Running);
    assert!(matches!(decision.effects.as_slice(), [Effect::SetTimer { .. }]));
}

#[test]
fn running_with_pending_or_running_workload_requeues() {
    let mut ns = node_scan("ns-1", "node-a");
    ns.status.phase = NodeScanPhase::Running;
    let mut c = ctx(ns, None);
    c.workload = Some(WorkloadObservation { phase: WorkloadPhase::Running, log_lines: Vec::new() });

    let decision = decide(&c, "nodescan-ns-1", 2_000);
    assert_eq!(decision.status.phase, NodeScanPhase::Running);
    assert!(matches!(decision.effects.as_slice(), [Effect::SetTimer { .. }]));
}

#[test]
fn running_with_failed_workload_moves_to_failed() {
    let mut ns = node_scan("ns-1", "node-a");
    ns.status.phase = NodeScanPhase::Running;
    let mut c = ctx(ns, None);
    c.workload = Some(WorkloadObservation { phase: WorkloadPhase::Failed, log_lines: Vec::new() });

    let decision = decide(&c, "nodescan-ns-1", 2_000);

    assert_eq!(decision.status.phase, NodeScanPhase::Failed);
    assert!(decision.status.conditions.iter().any(|c| c.type_ == "ScanFailed"));
}

#[test]
fn running_with_succeeded_workload_completes_and_merges_cache() {
    let mut ns = node_scan("ns-1", "node-a");
    ns.status.phase = NodeScanPhase::Running;
    ns.status.start_time_epoch_ms = Some(1_000);
    ns.status.strategy_used = Some(clamscan_core::ScanStrategy::Full);
    let mut c = ctx(ns, None);
    c.workload = Some(WorkloadObservation {
        phase: WorkloadPhase::Succeeded,
        log_lines: vec![
            r#"{"message": "Scan terminé avec succès", "files_scanned": 10, "files_infected": 1, "files_skipped": 0, "errors_count": 0}"#
                .to_string(),
            r#"{"alert": "INFECTED_FILE", "file_path": "/host/evil", "virus_names": ["Eicar"], "file_size": 10}"#
                .to_string(),
        ],
    });

    let decision = decide(&c, "nodescan-ns-1", 61_000);

    assert_eq!(decision.status.phase, NodeScanPhase::Completed);
    assert_eq!(decision.status.files_scanned, 10);
    assert_eq!(decision.status.files_infected, 1);
    assert_eq!(decision.status.duration_secs, Some(60));
    assert!(decision.status.conditions.iter().any(|c| c.type_ == "ScanCompleted"));
    assert!(decision
        .effects
        .iter()
        .any(|e| matches!(e, Effect::WriteScanCache { name, .. } if name == "scancache-node-a")));
}

#[test]
fn pending_deletion_deletes_workload_and_clears_marker() {
    let mut ns = node_scan("ns-1", "node-a");
    ns.status.phase = NodeScanPhase::Running;
    ns.status.job_ref = Some("nodescan-ns-1".to_string());
    ns.status.pending_deletion = true;

    let decision = decide(&ctx(ns, None), "nodescan-ns-1", 3_000);

    assert!(!decision.status.pending_deletion);
    assert!(matches!(
        decision.effects.as_slice(),
        [Effect::DeleteWorkload { name }] if name == "nodescan-ns-1"
    ));
}

#[test]
fn pending_deletion_with_no_workload_yet_is_a_no_op() {
    let mut ns = node_scan("ns-1", "node-a");
    ns.status.pending_deletion = true;

    let decision = decide(&ctx(ns, None), "nodescan-ns-1", 3_000);

    assert!(!decision.status.pending_deletion);
    assert!(decision.effects.is_empty());
}

#[test]
fn build_notification_effects_skips_channels_gated_on_infection_when_clean() {
    let notifications = NotificationConfig {
        chat: Some(ChatNotifyConfig {
            webhook_credential: CredentialRef { store: "vault".to_string(), key: "chat".to_string() },
            only_on_infection: true,
        }),
        mail: None,
        webhook: None,
    };
    let effects = build_notification_effects(&notifications, "no infected files", 0);
    assert!(effects.is_empty());
}

#[test]
fn build_notification_effects_includes_channel_not_gated_on_infection() {
    let notifications = NotificationConfig {
        chat: Some(ChatNotifyConfig {
            webhook_credential: CredentialRef { store: "vault".to_string(), key: "chat".to_string() },
            only_on_infection: false,
        }),
        mail: None,
        webhook: None,
    };
    let effects = build_notification_effects(&notifications, "no infected files", 0);
    assert_eq!(effects.len(), 1);
}

fn setup_client() -> FakePlatformClient {
    let client = FakePlatformClient::new();
    client.put_node("node-a");
    client.put_node_scan(node_scan("ns-1", "node-a"));
    client
}

#[tokio::test]
async fn reconcile_creates_workload_on_first_pass() {
    let client = setup_client();
    let clock = FakeClock::default();
    let resolver = FakeCredentialResolver::new();

    reconcile(&client, &clock, &resolver, "ns-1").await.unwrap();

    let ns = client.node_scan("ns-1").unwrap();
    assert_eq!(ns.status.phase, NodeScanPhase::Running);
    assert!(client.workload_exists("nodescan-ns-1"));
}

#[tokio::test]
async fn reconcile_is_a_no_op_when_node_scan_is_gone() {
    let client = FakePlatformClient::new();
    let clock = FakeClock::default();
    let resolver = FakeCredentialResolver::new();

    reconcile(&client, &clock, &resolver, "missing").await.unwrap();
    assert!(client.node_scan("missing").is_none());
}

#[tokio::test]
async fn reconcile_fails_when_target_node_is_missing() {
    let client = FakePlatformClient::new();
    client.put_node_scan(node_scan("ns-1", "ghost-node"));
    let clock = FakeClock::default();
    let resolver = FakeCredentialResolver::new();

    reconcile(&client, &clock, &resolver, "ns-1").await.unwrap();

    let ns = client.node_scan("ns-1").unwrap();
    assert_eq!(ns.status.phase, NodeScanPhase::Failed);
}

#[tokio::test]
async fn reconcile_sends_notifications_and_bumps_policy_usage_on_infected_completion() {
    let client = setup_client();
    let mut ns = client.node_scan("ns-1").unwrap();
    ns.spec.policy_ref = Some("alert-on-infection".to_string());
    client.put_node_scan(ns);
    client.put_scan_policy(clamscan_core::ScanPolicy {
        name: "alert-on-infection".to_string(),
        spec: ScanPolicySpec {
            notifications: NotificationConfig {
                chat: Some(ChatNotifyConfig {
                    webhook_credential: CredentialRef { store: "vault".to_string(), key: "chat".to_string() },
                    only_on_infection: true,
                }),
                mail: None,
                webhook: None,
            },
            ..Default::default()
        },
        status: ScanPolicyStatus::default(),
    });
    let clock = FakeClock::default();
    let resolver = FakeCredentialResolver::new();

    // Pending -> Running.
    reconcile(&client, &clock, &resolver, "ns-1").await.unwrap();
    client.set_workload_phase(
        "nodescan-ns-1",
        WorkloadPhase::Succeeded,
    );
    client.append_workload_log(
        "nodescan-ns-1",
        r#"{"alert": "INFECTED_FILE", "file_path": "/host/evil", "virus_names": ["Eicar"], "file_size": 10}"#,
    );
    client.append_workload_log(
        "nodescan-ns-1",
        r#"{"message": "Scan terminé avec succès", "files_scanned": 3, "files_infected": 1, "files_skipped": 0, "errors_count": 0}"#,
    );

    // Running -> Completed: should emit a notification effect (best-effort,
    // swallowed by the executor since no credential is mounted) and bump
    // policy usage.
    reconcile(&client, &clock, &resolver, "ns-1").await.unwrap();

    let ns = client.node_scan("ns-1").unwrap();
    assert_eq!(ns.status.phase, NodeScanPhase::Completed);

    use clamscan_platform::PlatformClient;
    let policy = client.get_scan_policy("alert-on-infection").await.unwrap().unwrap();
    assert_eq!(policy.status.usage_count, 1);
}

#[tokio::test]
async fn reconcile_bumps_policy_usage_on_clean_completion() {
    // spec §4.1: "bump policy usage" happens on every Completed transition
    // that references a policy, independent of whether notifications fire.
    let client = setup_client();
    let mut ns = client.node_scan("ns-1").unwrap();
    ns.spec.policy_ref = Some("quiet".to_string());
    client.put_node_scan(ns);
    client.put_scan_policy(clamscan_core::ScanPolicy {
        name: "quiet".to_string(),
        spec: ScanPolicySpec::default(),
        status: ScanPolicyStatus::default(),
    });
    let clock = FakeClock::default();
    let resolver = FakeCredentialResolver::new();

    reconcile(&client, &clock, &resolver, "ns-1").await.unwrap();
    client.set_workload_phase("nodescan-ns-1", WorkloadPhase::Succeeded);
    client.append_workload_log(
        "nodescan-ns-1",
        r#"{"message": "Scan terminé avec succès", "files_scanned": 10, "files_infected": 0, "files_skipped": 0, "errors_count": 0}"#,
    );
    reconcile(&client, &clock, &resolver, "ns-1").await.unwrap();

    let ns = client.node_scan("ns-1").unwrap();
    assert_eq!(ns.status.phase, NodeScanPhase::Completed);
    assert_eq!(ns.status.files_infected, 0);

    use clamscan_platform::PlatformClient;
    let policy = client.get_scan_policy("quiet").await.unwrap().unwrap();
    assert_eq!(policy.status.usage_count, 1);
}
