// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake notify adapter and credential resolver for testing.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{CredentialResolver, NotifyAdapter, NotifyError};
use async_trait::async_trait;
use clamscan_core::CredentialRef;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct NotifyCall {
    pub subject: String,
    pub body: String,
}

struct FakeNotifyState {
    calls: Vec<NotifyCall>,
    fail_next: bool,
}

#[derive(Clone)]
pub struct FakeNotifyAdapter {
    inner: Arc<Mutex<FakeNotifyState>>,
}

impl Default for FakeNotifyAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeNotifyState { calls: Vec::new(), fail_next: false })),
        }
    }
}

impl FakeNotifyAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<NotifyCall> {
        self.inner.lock().calls.clone()
    }

    pub fn fail_next_send(&self) {
        self.inner.lock().fail_next = true;
    }
}

#[async_trait]
impl NotifyAdapter for FakeNotifyAdapter {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let mut state = self.inner.lock();
        if state.fail_next {
            state.fail_next = false;
            return Err(NotifyError::SendFailed("forced failure".into()));
        }
        state.calls.push(NotifyCall { subject: subject.to_string(), body: body.to_string() });
        Ok(())
    }
}

/// Resolves whatever store/key pairs are pre-seeded; unknown refs error.
#[derive(Clone, Default)]
pub struct FakeCredentialResolver {
    values: Arc<Mutex<HashMap<(String, String), String>>>,
}

impl FakeCredentialResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, credential: CredentialRef, value: impl Into<String>) {
        self.values.lock().insert((credential.store, credential.key), value.into());
    }
}

#[async_trait]
impl CredentialResolver for FakeCredentialResolver {
    async fn resolve(&self, credential: &CredentialRef) -> Result<String, NotifyError> {
        self.values
            .lock()
            .get(&(credential.store.clone(), credential.key.clone()))
            .cloned()
            .ok_or_else(|| {
                NotifyError::CredentialUnavailable(format!(
                    "{}/{}",
                    credential.store, credential.key
                ))
            })
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
