// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn appends_new_type() {
    let mut conditions = Vec::new();
    set_condition(
        &mut conditions,
        Condition::new("Ready", ConditionStatus::True, "Resolved", "ok", 100),
    );
    assert_eq!(conditions.len(), 1);
}

#[test]
fn overwrites_existing_type_in_place() {
    let mut conditions = vec![Condition::new(
        "Ready",
        ConditionStatus::False,
        "NotYet",
        "waiting",
        100,
    )];
    set_condition(
        &mut conditions,
        Condition::new("Ready", ConditionStatus::True, "Resolved", "ok", 200),
    );
    assert_eq!(conditions.len(), 1);
    assert_eq!(conditions[0].status, ConditionStatus::True);
    assert_eq!(conditions[0].last_transition_epoch_ms, 200);
}

#[test]
fn unchanged_status_keeps_transition_time() {
    let mut conditions = vec![Condition::new(
        "Ready",
        ConditionStatus::True,
        "Resolved",
        "ok",
        100,
    )];
    set_condition(
        &mut conditions,
        Condition::new("Ready", ConditionStatus::True, "Resolved", "still ok", 999),
    );
    assert_eq!(conditions[0].last_transition_epoch_ms, 100);
    assert_eq!(conditions[0].message, "still ok");
}
