// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Heterogeneous condition lists attached to every status object.
//!
//! Represented as a tagged record indexed by `type`; updates are
//! index-or-append, never a straight push, so a condition list never grows
//! two entries for the same type (see spec §9 "Heterogeneous conditions lists").

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: ConditionStatus,
    pub reason: String,
    pub message: String,
    pub last_transition_epoch_ms: u64,
}

impl Condition {
    pub fn new(
        type_: impl Into<String>,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
        now_ms: u64,
    ) -> Self {
        Self {
            type_: type_.into(),
            status,
            reason: reason.into(),
            message: message.into(),
            last_transition_epoch_ms: now_ms,
        }
    }
}

/// Set (index-or-append-by-type) a condition on a condition list.
///
/// If a condition of the same `type_` already exists its `status`/`reason`/
/// `message` are overwritten in place and `last_transition_epoch_ms` is only
/// bumped when the status actually changed, matching how controllers avoid
/// churning `lastTransitionTime` on no-op reconciles.
pub fn set_condition(conditions: &mut Vec<Condition>, new: Condition) {
    if let Some(existing) = conditions.iter_mut().find(|c| c.type_ == new.type_) {
        let status_changed = existing.status != new.status;
        existing.reason = new.reason;
        existing.message = new.message;
        existing.status = new.status;
        if status_changed {
            existing.last_transition_epoch_ms = new.last_transition_epoch_ms;
        }
    } else {
        conditions.push(new);
    }
}

#[cfg(test)]
#[path = "condition_tests.rs"]
mod tests;
