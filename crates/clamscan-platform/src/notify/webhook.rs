// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generic HTTP webhook notify adapter.

use super::{CredentialResolver, NotifyAdapter, NotifyError};
use async_trait::async_trait;
use clamscan_core::CredentialRef;
use reqwest::Client;
use serde_json::json;

#[derive(Clone)]
pub struct WebhookNotifyAdapter<R: CredentialResolver> {
    url_credential: CredentialRef,
    resolver: R,
    http: Client,
}

impl<R: CredentialResolver> WebhookNotifyAdapter<R> {
    pub fn new(url_credential: CredentialRef, resolver: R) -> Self {
        Self { url_credential, resolver, http: Client::new() }
    }
}

#[async_trait]
impl<R: CredentialResolver> NotifyAdapter for WebhookNotifyAdapter<R> {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let url = self.resolver.resolve(&self.url_credential).await?;
        let resp = self
            .http
            .post(&url)
            .json(&json!({ "subject": subject, "body": body }))
            .send()
            .await
            .map_err(|e| NotifyError::SendFailed(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(NotifyError::SendFailed(format!("webhook returned {}", resp.status())));
        }
        Ok(())
    }
}
