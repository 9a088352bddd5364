// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mail notify adapter. The `smtp_credential` resolves to a bearer token for
//! an HTTP transactional-mail relay; the relay's base URL is fixed operator
//! configuration, not a per-policy secret.

use super::{CredentialResolver, NotifyAdapter, NotifyError};
use async_trait::async_trait;
use clamscan_core::CredentialRef;
use reqwest::Client;
use serde_json::json;

#[derive(Clone)]
pub struct MailNotifyAdapter<R: CredentialResolver> {
    relay_base_url: String,
    smtp_credential: CredentialRef,
    recipients: Vec<String>,
    resolver: R,
    http: Client,
}

impl<R: CredentialResolver> MailNotifyAdapter<R> {
    pub fn new(
        relay_base_url: impl Into<String>,
        smtp_credential: CredentialRef,
        recipients: Vec<String>,
        resolver: R,
    ) -> Self {
        Self {
            relay_base_url: relay_base_url.into(),
            smtp_credential,
            recipients,
            resolver,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl<R: CredentialResolver> NotifyAdapter for MailNotifyAdapter<R> {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        if self.recipients.is_empty() {
            return Err(NotifyError::SendFailed("no recipients configured".into()));
        }
        let token = self.resolver.resolve(&self.smtp_credential).await?;
        let resp = self
            .http
            .post(format!("{}/send", self.relay_base_url.trim_end_matches('/')))
            .bearer_auth(token)
            .json(&json!({
                "to": self.recipients,
                "subject": subject,
                "body": body,
            }))
            .send()
            .await
            .map_err(|e| NotifyError::SendFailed(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(NotifyError::SendFailed(format!("mail relay returned {}", resp.status())));
        }
        Ok(())
    }
}
