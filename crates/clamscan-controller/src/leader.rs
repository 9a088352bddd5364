// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Leader election gate (spec §5 "Leader election"): when enabled, only the
//! replica holding the lease runs reconcilers. The lease backend itself is
//! an out-of-scope platform collaborator (spec §1); this crate only models
//! the gating behaviour, plus a single-process fake for tests and for
//! deployments that run leader election disabled.

use async_trait::async_trait;

/// Whether this process currently holds the leader lease.
#[async_trait]
pub trait LeaderLease: Clone + Send + Sync + 'static {
    async fn is_leader(&self) -> bool;
}

/// Always reports leadership — used when leader election is disabled, or
/// when only a single replica is ever running.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysLeader;

#[async_trait]
impl LeaderLease for AlwaysLeader {
    async fn is_leader(&self) -> bool {
        true
    }
}

/// A settable leadership flag, for driving leader-election tests.
#[cfg(any(test, feature = "test-support"))]
#[derive(Clone, Debug)]
pub struct FakeLeaderLease {
    held: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeLeaderLease {
    pub fn new(is_leader: bool) -> Self {
        Self { held: std::sync::Arc::new(std::sync::atomic::AtomicBool::new(is_leader)) }
    }

    pub fn set(&self, is_leader: bool) {
        self.held.store(is_leader, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl LeaderLease for FakeLeaderLease {
    async fn is_leader(&self) -> bool {
        self.held.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "leader_tests.rs"]
mod tests;
