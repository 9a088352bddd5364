// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! clamscan-core: domain types shared by every crate in the clamscan operator.
//!
//! No I/O lives here. Resource specs/statuses, the `Effect`/`OperatorEvent`
//! vocabulary reconcilers speak, and the pure effective-value cascade are the
//! only things this crate knows about.

pub mod clock;
pub mod cluster_scan;
pub mod condition;
pub mod effect;
pub mod effective;
pub mod error;
pub mod event;
pub mod id;
pub mod node_scan;
pub mod priority;
pub mod scan_cache;
pub mod scan_policy;
pub mod scan_schedule;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use cluster_scan::{
    ChildNodeScanRef, ClusterScan, ClusterScanPhase, ClusterScanSpec, ClusterScanStatus,
    NodeScanTemplate, DEFAULT_CONCURRENCY,
};
pub use condition::{set_condition, Condition, ConditionStatus};
pub use effect::{Effect, NotifyChannel};
pub use effective::{resolve as resolve_effective_config, EffectiveNodeScanConfig};
pub use error::ValidationError;
pub use event::{EventReason, EventType, OperatorEvent, ResourceKind};
pub use id::truncate_identifier;
pub use node_scan::{
    IncrementalConfig, InfectedFile, NodeScan, NodeScanPhase, NodeScanSpec, NodeScanStatus,
    ScanStrategy, MAX_INFECTED_FILES,
};
pub use priority::{Priority, ResourceEnvelope};
pub use scan_cache::{
    CacheFileEntry, ScanCache, ScanCacheSpec, ScanCacheStatus, ScanResult, CACHE_FORMAT_VERSION,
    MAX_CACHE_ENTRIES,
};
pub use scan_policy::{
    ChatNotifyConfig, CredentialRef, MailNotifyConfig, NotificationConfig, QuarantineAction,
    QuarantinePolicy, ScanPolicy, ScanPolicySpec, ScanPolicyStatus, WebhookNotifyConfig,
};
pub use scan_schedule::{
    ActiveChildRef, ConcurrencyPolicy, ScanSchedule, ScanScheduleSpec, ScanScheduleStatus,
    DEFAULT_FAILED_HISTORY_LIMIT, DEFAULT_SUCCESSFUL_HISTORY_LIMIT,
};
