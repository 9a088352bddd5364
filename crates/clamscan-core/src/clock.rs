// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction so reconcilers can be driven by a fake clock in tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock time for reconcilers and the cache manager.
///
/// Reconcilers never call `SystemTime::now()` directly so that TTL expiry,
/// cache-expiration, and cron-due computations can be driven deterministically
/// in tests.
pub trait Clock: Clone + Send + Sync + 'static {
    /// Current time as epoch seconds.
    fn now_epoch_secs(&self) -> u64;

    /// Current time as epoch milliseconds.
    fn now_epoch_ms(&self) -> u64 {
        self.now_epoch_secs() * 1000
    }
}

/// Real wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// A clock that returns a fixed (but advanceable) time, for tests.
#[derive(Clone, Debug)]
pub struct FakeClock {
    epoch_secs: Arc<AtomicU64>,
}

impl FakeClock {
    pub fn new(epoch_secs: u64) -> Self {
        Self {
            epoch_secs: Arc::new(AtomicU64::new(epoch_secs)),
        }
    }

    /// Advance the clock by `secs` seconds and return the new time.
    pub fn advance(&self, secs: u64) -> u64 {
        self.epoch_secs.fetch_add(secs, Ordering::SeqCst) + secs
    }

    pub fn set(&self, epoch_secs: u64) {
        self.epoch_secs.store(epoch_secs, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(1_700_000_000)
    }
}

impl Clock for FakeClock {
    fn now_epoch_secs(&self) -> u64 {
        self.epoch_secs.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
