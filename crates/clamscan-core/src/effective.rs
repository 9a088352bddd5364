// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effective-value resolution: NodeScan field -> referenced ScanPolicy field
//! -> priority-band default -> hardcoded default (spec §4.1, §9).
//!
//! Implemented as an explicit cascading lookup rather than a merged record so
//! the precedence stays auditable field-by-field.

use crate::node_scan::{IncrementalConfig, NodeScanSpec, ResourceEnvelope, ScanStrategy};
use crate::scan_policy::ScanPolicySpec;

pub const DEFAULT_PATHS: &[&str] = &["/host/var/lib", "/host/opt"];
pub const DEFAULT_MAX_CONCURRENT: u32 = 5;
pub const DEFAULT_FILE_TIMEOUT_MS: u64 = 300_000;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 100 * 1024 * 1024;
pub const DEFAULT_TTL_AFTER_COMPLETION_SECS: u64 = 24 * 3600;

/// Fully resolved settings for a single NodeScan, after cascading through the
/// referenced policy and priority band.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveNodeScanConfig {
    pub paths: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub max_concurrent: u32,
    pub file_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub max_file_size_bytes: u64,
    pub resources: ResourceEnvelope,
    pub ttl_after_completion_secs: u64,
    pub strategy: ScanStrategy,
    pub incremental: Option<IncrementalConfig>,
}

/// Resolve the effective configuration for a NodeScan given its (optional)
/// referenced policy. Each field independently cascades
/// `NodeScan -> Policy -> priority band -> hardcoded default`.
pub fn resolve(spec: &NodeScanSpec, policy: Option<&ScanPolicySpec>) -> EffectiveNodeScanConfig {
    let band = spec.priority.band();

    let paths = spec
        .paths
        .clone()
        .or_else(|| policy.and_then(|p| p.paths.clone()))
        .unwrap_or_else(|| DEFAULT_PATHS.iter().map(|s| s.to_string()).collect());

    let exclude_patterns = spec
        .exclude_patterns
        .clone()
        .or_else(|| policy.and_then(|p| p.exclude_patterns.clone()))
        .unwrap_or_default();

    // ScanPolicy carries no max_concurrent field (spec §3); falls straight
    // through to the hardcoded default when unset on the NodeScan itself.
    let max_concurrent = spec.max_concurrent.unwrap_or(DEFAULT_MAX_CONCURRENT);

    let file_timeout_ms = spec
        .file_timeout_ms
        .or_else(|| policy.and_then(|p| p.file_timeout_ms))
        .unwrap_or(DEFAULT_FILE_TIMEOUT_MS);

    let connect_timeout_ms = policy
        .and_then(|p| p.connect_timeout_ms)
        .unwrap_or(DEFAULT_CONNECT_TIMEOUT_MS);

    let max_file_size_bytes = spec
        .max_file_size_bytes
        .or_else(|| policy.and_then(|p| p.max_file_size_bytes))
        .unwrap_or(DEFAULT_MAX_FILE_SIZE_BYTES);

    let resources = spec
        .resources
        .clone()
        .or_else(|| policy.and_then(|p| p.resources.clone()))
        .unwrap_or(band);

    let ttl_after_completion_secs = spec
        .ttl_after_completion_secs
        .unwrap_or(DEFAULT_TTL_AFTER_COMPLETION_SECS);

    let incremental = spec
        .incremental
        .clone()
        .or_else(|| policy.and_then(|p| p.incremental.clone()));

    EffectiveNodeScanConfig {
        paths,
        exclude_patterns,
        max_concurrent,
        file_timeout_ms,
        connect_timeout_ms,
        max_file_size_bytes,
        resources,
        ttl_after_completion_secs,
        strategy: spec.strategy,
        incremental,
    }
}

#[cfg(test)]
#[path = "effective_tests.rs"]
mod tests;
