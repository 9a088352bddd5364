// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn zero_concurrent_resolves_to_implementation_default() {
    let spec = ClusterScanSpec {
        concurrent: 0,
        ..Default::default()
    };
    assert_eq!(spec.effective_concurrency(), DEFAULT_CONCURRENCY);
}

#[test]
fn explicit_concurrent_wins() {
    let spec = ClusterScanSpec {
        concurrent: 10,
        ..Default::default()
    };
    assert_eq!(spec.effective_concurrency(), 10);
}

#[test]
fn phase_running_while_incomplete() {
    assert_eq!(
        ClusterScanPhase::from_counts(5, 2, 0),
        ClusterScanPhase::Running
    );
}

#[test]
fn phase_completed_when_no_failures() {
    assert_eq!(
        ClusterScanPhase::from_counts(5, 5, 0),
        ClusterScanPhase::Completed
    );
}

#[test]
fn phase_failed_when_none_completed() {
    assert_eq!(
        ClusterScanPhase::from_counts(5, 0, 5),
        ClusterScanPhase::Failed
    );
}

#[test]
fn phase_partially_completed_when_mixed() {
    assert_eq!(
        ClusterScanPhase::from_counts(5, 3, 2),
        ClusterScanPhase::PartiallyCompleted
    );
}
