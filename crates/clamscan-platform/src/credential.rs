// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A `CredentialResolver` backed by process environment variables, for
//! deployments where the credential store out-of-scope collaborator is
//! satisfied by secrets mounted into the operator's environment.

use crate::notify::{CredentialResolver, NotifyError};
use async_trait::async_trait;
use clamscan_core::CredentialRef;

/// Resolves `{store}/{key}` to the environment variable
/// `{STORE}_{KEY}` (uppercased, `-` mapped to `_`).
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvCredentialResolver;

impl EnvCredentialResolver {
    pub fn new() -> Self {
        Self
    }

    fn env_var_name(credential: &CredentialRef) -> String {
        format!("{}_{}", credential.store, credential.key)
            .to_uppercase()
            .replace('-', "_")
    }
}

#[async_trait]
impl CredentialResolver for EnvCredentialResolver {
    async fn resolve(&self, credential: &CredentialRef) -> Result<String, NotifyError> {
        let var = Self::env_var_name(credential);
        std::env::var(&var).map_err(|_| NotifyError::CredentialUnavailable(var))
    }
}

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;
