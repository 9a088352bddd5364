// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconcile-level error taxonomy (spec §7).
//!
//! Decision builders never fail — they are pure `Event -> Vec<Effect>`
//! functions. Only the [`crate::executor::Executor`], which actually talks to
//! [`clamscan_platform::PlatformClient`], can produce an error, and this is
//! where transient platform trouble is distinguished from a bug worth
//! surfacing loudly.

use clamscan_platform::PlatformError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Version conflict, timeout, or throttling: the caller should requeue
    /// with backoff and must not mutate resource status from this attempt.
    #[error("transient platform error: {0}")]
    Transient(PlatformError),

    /// A platform call failed in a way that isn't a version conflict or a
    /// timeout — logged and requeued, but distinguished in metrics from a
    /// plain transient retry.
    #[error("platform request failed: {0}")]
    RequestFailed(PlatformError),
}

impl From<PlatformError> for ReconcileError {
    fn from(err: PlatformError) -> Self {
        if err.is_transient() {
            ReconcileError::Transient(err)
        } else {
            ReconcileError::RequestFailed(err)
        }
    }
}

impl ReconcileError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ReconcileError::Transient(_))
    }
}
