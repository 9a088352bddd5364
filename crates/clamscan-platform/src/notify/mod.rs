// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification adapters: chat webhook, mail, and generic HTTP webhook
//! (spec §3 "three channels"). Each is a simple I/O sink; credentials are
//! resolved by reference through a [`CredentialResolver`] rather than read
//! directly, since the credential store itself is an out-of-scope opaque
//! key/value lookup (spec §1).

mod chat;
mod mail;
mod webhook;

pub use chat::ChatNotifyAdapter;
pub use mail::MailNotifyAdapter;
pub use webhook::WebhookNotifyAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeCredentialResolver, FakeNotifyAdapter, NotifyCall};

use async_trait::async_trait;
use clamscan_core::CredentialRef;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("credential resolution failed: {0}")]
    CredentialUnavailable(String),
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Resolves a [`CredentialRef`] to the secret value it names. The credential
/// store is an opaque key/value lookup out of scope for this crate.
#[async_trait]
pub trait CredentialResolver: Clone + Send + Sync + 'static {
    async fn resolve(&self, credential: &CredentialRef) -> Result<String, NotifyError>;
}

/// Sends a notification subject/body pair through one channel.
#[async_trait]
pub trait NotifyAdapter: Clone + Send + Sync + 'static {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
}
