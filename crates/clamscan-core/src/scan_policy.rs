// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ScanPolicy: reusable default bundle referenced by name (spec §3).

use crate::node_scan::{IncrementalConfig, ResourceEnvelope};
use serde::{Deserialize, Serialize};

/// A reference to a value stored in an opaque key/value credential store;
/// the store itself is an out-of-scope external collaborator (spec §1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRef {
    pub store: String,
    pub key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatNotifyConfig {
    pub webhook_credential: CredentialRef,
    #[serde(default)]
    pub only_on_infection: bool,
}

impl Default for CredentialRef {
    fn default() -> Self {
        Self {
            store: String::new(),
            key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MailNotifyConfig {
    pub smtp_credential: CredentialRef,
    pub recipients: Vec<String>,
    #[serde(default)]
    pub only_on_infection: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookNotifyConfig {
    pub url_credential: CredentialRef,
    #[serde(default)]
    pub only_on_infection: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat: Option<ChatNotifyConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail: Option<MailNotifyConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookNotifyConfig>,
}

impl NotificationConfig {
    pub fn is_configured(&self) -> bool {
        self.chat.is_some() || self.mail.is_some() || self.webhook.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuarantineAction {
    AlertOnly,
    Move,
    Delete,
}

impl Default for QuarantineAction {
    fn default() -> Self {
        QuarantineAction::AlertOnly
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuarantinePolicy {
    #[serde(default)]
    pub action: QuarantineAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanPolicySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_patterns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceEnvelope>,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub quarantine: QuarantinePolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incremental: Option<IncrementalConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanPolicyStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_epoch_ms: Option<u64>,
    #[serde(default)]
    pub usage_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanPolicy {
    pub name: String,
    pub spec: ScanPolicySpec,
    #[serde(default)]
    pub status: ScanPolicyStatus,
}

impl ScanPolicy {
    /// Record a use of this policy (spec §4.1 "bump policy usage").
    pub fn record_use(&mut self, now_ms: u64) {
        self.status.last_used_epoch_ms = Some(now_ms);
        self.status.usage_count += 1;
    }
}

#[cfg(test)]
#[path = "scan_policy_tests.rs"]
mod tests;
