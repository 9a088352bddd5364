// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use clamscan_core::{
    ClusterScan, ClusterScanPhase, ClusterScanSpec, ClusterScanStatus, FakeClock, ScanSchedule,
    ScanScheduleSpec, ScanScheduleStatus,
};
use clamscan_platform::{FakeCredentialResolver, FakePlatformClient};

fn schedule(name: &str, cron: &str, policy: ConcurrencyPolicy) -> ScanSchedule {
    ScanSchedule {
        name: name.to_string(),
        spec: ScanScheduleSpec {
            schedule: cron.to_string(),
            cluster_scan: ClusterScanSpec::default(),
            suspend: false,
            successful_history_limit: None,
            failed_history_limit: None,
            concurrency_policy: policy,
            starting_deadline_secs: None,
        },
        status: ScanScheduleStatus::default(),
    }
}

fn terminal_cluster_scan(name: &str, phase: ClusterScanPhase, completion_ms: u64) -> ClusterScan {
    ClusterScan {
        name: name.to_string(),
        spec: ClusterScanSpec::default(),
        status: ClusterScanStatus { phase, completion_time_epoch_ms: Some(completion_ms), ..Default::default() },
    }
}

#[test]
fn firing_name_is_schedule_and_epoch() {
    assert_eq!(firing_name("nightly", 1_700_000_000), "nightly-1700000000");
}

#[tokio::test]
async fn reconcile_fires_on_first_due_tick() {
    let client = FakePlatformClient::new();
    client.put_scan_schedule(schedule("nightly", "* * * * *", ConcurrencyPolicy::Allow));
    let clock = FakeClock::new(1_700_000_060);
    let resolver = FakeCredentialResolver::new();

    reconcile(&client, &clock, &resolver, "nightly").await.unwrap();

    let updated = client.get_scan_schedule("nightly").await.unwrap().unwrap();
    assert_eq!(updated.status.active.len(), 1);
    assert!(updated.status.last_schedule_time_epoch_secs.is_some());
    let create_calls = client
        .calls()
        .into_iter()
        .filter(|c| matches!(c, clamscan_platform::PlatformCall::CreateClusterScan { .. }))
        .count();
    assert_eq!(create_calls, 1);
}

#[tokio::test]
async fn reconcile_does_not_fire_when_suspended() {
    let client = FakePlatformClient::new();
    let mut s = schedule("nightly", "* * * * *", ConcurrencyPolicy::Allow);
    s.spec.suspend = true;
    client.put_scan_schedule(s);
    let clock = FakeClock::new(1_700_000_060);
    let resolver = FakeCredentialResolver::new();

    reconcile(&client, &clock, &resolver, "nightly").await.unwrap();

    let updated = client.get_scan_schedule("nightly").await.unwrap().unwrap();
    assert!(updated.status.active.is_empty());
}

#[tokio::test]
async fn reconcile_forbid_policy_skips_firing_while_a_child_is_still_active() {
    let client = FakePlatformClient::new();
    let mut s = schedule("nightly", "* * * * *", ConcurrencyPolicy::Forbid);
    s.status.active = vec![clamscan_core::ActiveChildRef {
        name: "nightly-1699999990".to_string(),
        created_at_epoch_ms: 1_699_999_990_000,
    }];
    client.put_scan_schedule(s);
    client.put_cluster_scan(terminal_cluster_scan("nightly-1699999990", ClusterScanPhase::Running, 0));
    let clock = FakeClock::new(1_700_000_060);
    let resolver = FakeCredentialResolver::new();

    reconcile(&client, &clock, &resolver, "nightly").await.unwrap();

    let updated = client.get_scan_schedule("nightly").await.unwrap().unwrap();
    assert_eq!(updated.status.active.len(), 1, "the still-running child remains the only active entry");
    let create_calls = client
        .calls()
        .into_iter()
        .filter(|c| matches!(c, clamscan_platform::PlatformCall::CreateClusterScan { .. }))
        .count();
    assert_eq!(create_calls, 0);
}

#[tokio::test]
async fn reconcile_forbid_policy_fires_once_the_prior_child_has_gone_terminal() {
    let client = FakePlatformClient::new();
    let mut s = schedule("nightly", "* * * * *", ConcurrencyPolicy::Forbid);
    s.status.active = vec![clamscan_core::ActiveChildRef {
        name: "nightly-1699999990".to_string(),
        created_at_epoch_ms: 1_699_999_990_000,
    }];
    client.put_scan_schedule(s);
    client.put_cluster_scan(terminal_cluster_scan("nightly-1699999990", ClusterScanPhase::Completed, 1_699_999_999_000));
    let clock = FakeClock::new(1_700_000_060);
    let resolver = FakeCredentialResolver::new();

    reconcile(&client, &clock, &resolver, "nightly").await.unwrap();

    let create_calls = client
        .calls()
        .into_iter()
        .filter(|c| matches!(c, clamscan_platform::PlatformCall::CreateClusterScan { .. }))
        .count();
    assert_eq!(create_calls, 1);
}

#[tokio::test]
async fn reconcile_replace_policy_deletes_the_active_child_before_firing() {
    let client = FakePlatformClient::new();
    let mut s = schedule("nightly", "* * * * *", ConcurrencyPolicy::Replace);
    s.status.active = vec![clamscan_core::ActiveChildRef {
        name: "nightly-1699999990".to_string(),
        created_at_epoch_ms: 1_699_999_990_000,
    }];
    client.put_scan_schedule(s);
    client.put_cluster_scan(terminal_cluster_scan("nightly-1699999990", ClusterScanPhase::Running, 0));
    let clock = FakeClock::new(1_700_000_060);
    let resolver = FakeCredentialResolver::new();

    reconcile(&client, &clock, &resolver, "nightly").await.unwrap();

    let delete_calls = client
        .calls()
        .into_iter()
        .filter(|c| matches!(c, clamscan_platform::PlatformCall::DeleteClusterScan { .. }))
        .count();
    assert_eq!(delete_calls, 1);
    let updated = client.get_scan_schedule("nightly").await.unwrap().unwrap();
    assert_eq!(updated.status.active.len(), 1, "the new firing replaces the old active entry");
}

#[tokio::test]
async fn reconcile_retains_only_the_configured_successful_history_limit() {
    let client = FakePlatformClient::new();
    let mut s = schedule("nightly", "0 0 1 1 *", ConcurrencyPolicy::Allow);
    s.spec.successful_history_limit = Some(1);
    client.put_scan_schedule(s);

    for i in 0..3u64 {
        let name = format!("nightly-{i}");
        client.put_cluster_scan(terminal_cluster_scan(&name, ClusterScanPhase::Completed, 1000 + i));
    }

    let clock = FakeClock::new(500_000_000); // schedule itself never due; this test is about retention only
    let resolver = FakeCredentialResolver::new();

    reconcile(&client, &clock, &resolver, "nightly").await.unwrap();

    let delete_calls = client
        .calls()
        .into_iter()
        .filter(|c| matches!(c, clamscan_platform::PlatformCall::DeleteClusterScan { .. }))
        .count();
    assert_eq!(delete_calls, 2, "only the single most recent completion is retained");
}

#[tokio::test]
async fn reconcile_is_a_no_op_on_malformed_cron() {
    let client = FakePlatformClient::new();
    client.put_scan_schedule(schedule("broken", "not a cron", ConcurrencyPolicy::Allow));
    let clock = FakeClock::default();
    let resolver = FakeCredentialResolver::new();

    reconcile(&client, &clock, &resolver, "broken").await.unwrap();

    let updated = client.get_scan_schedule("broken").await.unwrap().unwrap();
    assert!(updated.status.active.is_empty());
}

#[tokio::test]
async fn reconcile_is_a_no_op_when_schedule_is_gone() {
    let client = FakePlatformClient::new();
    let clock = FakeClock::default();
    let resolver = FakeCredentialResolver::new();

    reconcile(&client, &clock, &resolver, "missing").await.unwrap();
    assert!(client.get_scan_schedule("missing").await.unwrap().is_none());
}
