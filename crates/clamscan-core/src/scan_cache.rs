// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ScanCache: per-node incremental-scan state (spec §3, §4.4).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanResult {
    Clean,
    Infected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheFileEntry {
    pub path: String,
    pub mod_time_epoch: u64,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_digest: Option<String>,
    pub last_scanned_epoch: u64,
    pub result: ScanResult,
}

pub const MAX_CACHE_ENTRIES: usize = 10_000;
pub const CACHE_FORMAT_VERSION: &str = "v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanCacheSpec {
    pub node_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_full_scan_epoch: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_incremental_scan_epoch: Option<u64>,
    #[serde(default)]
    pub scan_count: u32,
    /// Keyed by path; invariant: unique by path, at most [`MAX_CACHE_ENTRIES`].
    #[serde(default)]
    pub files: HashMap<String, CacheFileEntry>,
    #[serde(default = "default_cache_version")]
    pub cache_version: String,
}

fn default_cache_version() -> String {
    CACHE_FORMAT_VERSION.to_string()
}

impl ScanCacheSpec {
    pub fn empty(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            last_full_scan_epoch: None,
            last_incremental_scan_epoch: None,
            scan_count: 0,
            files: HashMap::new(),
            cache_version: CACHE_FORMAT_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanCacheStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_epoch_ms: Option<u64>,
    #[serde(default)]
    pub serialized_size_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanCache {
    pub name: String,
    pub spec: ScanCacheSpec,
    #[serde(default)]
    pub status: ScanCacheStatus,
}

impl ScanCache {
    /// Deterministic record name for a node's cache (spec §4.4 "Cache keying").
    pub fn name_for_node(node_name: &str) -> String {
        format!("scancache-{node_name}")
    }

    pub fn empty(node_name: &str) -> Self {
        Self {
            name: Self::name_for_node(node_name),
            spec: ScanCacheSpec::empty(node_name),
            status: ScanCacheStatus::default(),
        }
    }
}

#[cfg(test)]
#[path = "scan_cache_tests.rs"]
mod tests;
