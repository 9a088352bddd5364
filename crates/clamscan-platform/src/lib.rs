// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the orchestration platform: the generic resource client and
//! the three notification channels.

pub mod client;
pub mod credential;
pub mod notify;

pub use client::{HttpPlatformClient, PlatformClient, PlatformError, WorkloadObservation, WorkloadPhase};
pub use credential::EnvCredentialResolver;
pub use notify::{
    ChatNotifyAdapter, CredentialResolver, MailNotifyAdapter, NotifyAdapter, NotifyError,
    WebhookNotifyAdapter,
};

#[cfg(any(test, feature = "test-support"))]
pub use client::{FakePlatformClient, PlatformCall};
#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeCredentialResolver, FakeNotifyAdapter, NotifyCall};
