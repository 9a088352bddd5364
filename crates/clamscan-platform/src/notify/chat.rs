// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chat-webhook notify adapter (Slack/Teams-style incoming webhook).
//!
//! The credential resolves directly to the webhook URL; nothing else about
//! the destination is configured on this adapter.

use super::{CredentialResolver, NotifyAdapter, NotifyError};
use async_trait::async_trait;
use clamscan_core::CredentialRef;
use reqwest::Client;
use serde_json::json;

#[derive(Clone)]
pub struct ChatNotifyAdapter<R: CredentialResolver> {
    webhook_credential: CredentialRef,
    resolver: R,
    http: Client,
}

impl<R: CredentialResolver> ChatNotifyAdapter<R> {
    pub fn new(webhook_credential: CredentialRef, resolver: R) -> Self {
        Self { webhook_credential, resolver, http: Client::new() }
    }
}

#[async_trait]
impl<R: CredentialResolver> NotifyAdapter for ChatNotifyAdapter<R> {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let url = self.resolver.resolve(&self.webhook_credential).await?;
        let text = format!("*{subject}*\n{body}");
        let resp = self
            .http
            .post(&url)
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| NotifyError::SendFailed(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(NotifyError::SendFailed(format!("chat webhook returned {}", resp.status())));
        }
        Ok(())
    }
}
