// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `CacheManager`: the incremental-scan decision algorithm, merge-on-completion,
//! scanner environment emission, and derived statistics (spec §4.4).
//!
//! Kept as a set of pure functions over `ScanCacheSpec`/`NodeScanSpec`, the
//! same shape as the decision builders in `clamscan-controller` — no I/O, no
//! clock reads of its own. Callers pass `now_epoch_secs` explicitly so tests
//! can drive it with `FakeClock` without threading the trait through here.

use clamscan_core::{CacheFileEntry, NodeScanSpec, ScanCacheSpec, ScanStrategy};
use std::collections::HashMap;

/// Cache is inlined into the scanner environment below this size; above it,
/// the manager writes a platform blob and points the scanner at it instead
/// (spec §4.4 "Environment emission").
const INLINE_MAX_ENTRIES: usize = 1_000;
const INLINE_MAX_BYTES: usize = 100_000;

/// Heuristic time saved per file skipped via cache hit (spec §4.4 "Derived statistics").
const SECONDS_SAVED_PER_SKIPPED_FILE: f64 = 0.1;

/// The scanner environment overlay plus, when the cache is too large to
/// inline, the blob payload the executor must persist alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheDecision {
    pub force_full_scan: bool,
    pub effective_strategy: ScanStrategy,
    pub env: Vec<(String, String)>,
    /// `Some((blob_name, data))` when the cache exceeded the inline size
    /// heuristic and must be written as a platform key/value blob instead of
    /// folded into `env` as `SCAN_CACHE`.
    pub cache_blob: Option<(String, HashMap<String, String>)>,
}

/// The scanner's completion report, as parsed from its stdout log contract
/// (spec §4.1, §6 "Scanner log contract") and merged back into the cache.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutcome {
    pub files: Vec<CacheFileEntry>,
    pub files_scanned: u64,
    /// Files skipped because the incremental strategy judged them unchanged
    /// (distinct from files skipped for other reasons, e.g. oversize).
    pub files_skipped_incremental: u64,
}

pub struct CacheManager;

impl CacheManager {
    /// `shouldForceFullScan` (spec §4.4): the five ordered conditions, any of
    /// which forces a full scan regardless of the configured strategy.
    pub fn should_force_full_scan(
        node_scan: &NodeScanSpec,
        cache: &ScanCacheSpec,
        now_epoch_secs: u64,
    ) -> bool {
        if node_scan.force_full_scan {
            return true;
        }
        if node_scan.strategy == ScanStrategy::Full {
            return true;
        }
        let incremental = match &node_scan.incremental {
            Some(cfg) if cfg.enabled => cfg,
            _ => return true,
        };
        if cache.scan_count >= incremental.baseline_interval() {
            return true;
        }
        // No full scan has ever run: there is nothing to be "stale" relative
        // to, so absence of `last_full_scan_epoch` does not itself force one.
        if let Some(last_full) = cache.last_full_scan_epoch {
            let expiry_secs = incremental.cache_expiration_hours() * 3600;
            if now_epoch_secs.saturating_sub(last_full) > expiry_secs {
                return true;
            }
        }
        false
    }

    /// Build the scanner environment overlay and, if needed, the cache blob
    /// payload (spec §4.4 "Environment emission").
    pub fn decide(node_scan: &NodeScanSpec, cache: &ScanCacheSpec, now_epoch_secs: u64) -> CacheDecision {
        let force_full = Self::should_force_full_scan(node_scan, cache, now_epoch_secs);
        let effective_strategy = if force_full { ScanStrategy::Full } else { node_scan.strategy };

        let mut env = vec![("SCAN_STRATEGY".to_string(), effective_strategy.to_string())];

        let incremental = node_scan.incremental.clone().unwrap_or_default();
        if incremental.enabled && !force_full {
            env.push(("INCREMENTAL_ENABLED".to_string(), "true".to_string()));
            env.push((
                "MAX_FILE_AGE_HOURS".to_string(),
                incremental.max_file_age_hours().to_string(),
            ));
            env.push(("SKIP_UNCHANGED_FILES".to_string(), "true".to_string()));
        }

        if let Some(epoch) = cache.last_full_scan_epoch {
            env.push(("LAST_FULL_SCAN".to_string(), epoch.to_string()));
        }
        if let Some(epoch) = cache.last_incremental_scan_epoch {
            env.push(("LAST_INCREMENTAL_SCAN".to_string(), epoch.to_string()));
        }

        let cache_blob = if cache.files.is_empty() {
            None
        } else {
            let serialized = serde_json::to_string(&cache.files).unwrap_or_default();
            if cache.files.len() <= INLINE_MAX_ENTRIES && serialized.len() <= INLINE_MAX_BYTES {
                env.push(("SCAN_CACHE".to_string(), serialized));
                None
            } else {
                let blob_name = clamscan_core::ScanCache::name_for_node(&node_scan.node_name);
                let mut data = HashMap::with_capacity(1);
                data.insert("files".to_string(), serialized);
                env.push(("SCAN_CACHE_CONFIGMAP".to_string(), blob_name.clone()));
                Some((blob_name, data))
            }
        };

        CacheDecision {
            force_full_scan: force_full,
            effective_strategy,
            env,
            cache_blob,
        }
    }

    /// Merge the scanner's completion report into the cache (spec §4.4
    /// "Merge on completion"). `force_full` must be the same value `decide`
    /// returned for this run.
    pub fn merge(
        cache: &ScanCacheSpec,
        force_full: bool,
        outcome: &ScanOutcome,
        now_epoch_secs: u64,
    ) -> ScanCacheSpec {
        let mut merged = cache.clone();

        if force_full {
            merged.files = outcome
                .files
                .iter()
                .map(|e| (e.path.clone(), e.clone()))
                .collect();
            merged.last_full_scan_epoch = Some(now_epoch_secs);
            merged.scan_count = 0;
        } else {
            for entry in &outcome.files {
                merged.files.insert(entry.path.clone(), entry.clone());
            }
            merged.last_incremental_scan_epoch = Some(now_epoch_secs);
            merged.scan_count += 1;
        }

        if merged.files.len() > clamscan_core::MAX_CACHE_ENTRIES {
            // Open question (spec §9): the observed source keeps the
            // leading slice; we instead retain the most recently
            // scanned entries, which is the behaviour an incremental
            // cache should converge to under sustained churn. §8 requires
            // this bound to hold for every ScanCache, including a full
            // scan whose report exceeds 10,000 files.
            let mut entries: Vec<CacheFileEntry> = merged.files.into_values().collect();
            entries.sort_by(|a, b| b.last_scanned_epoch.cmp(&a.last_scanned_epoch));
            entries.truncate(clamscan_core::MAX_CACHE_ENTRIES);
            merged.files = entries.into_iter().map(|e| (e.path.clone(), e)).collect();
        }

        merged
    }

    /// Approximate serialized size of the cache, for the cache-size metric
    /// (spec §4.4 "Always recompute... approximate serialised size").
    pub fn serialized_size_bytes(cache: &ScanCacheSpec) -> u64 {
        serde_json::to_string(&cache.files).map(|s| s.len() as u64).unwrap_or(0)
    }

    /// `cacheHitRate` and `timeSaved` (spec §4.4 "Derived statistics").
    /// Returns `(cache_hit_rate_percent, estimated_time_saved_secs)`.
    pub fn derive_statistics(outcome: &ScanOutcome) -> (f64, f64) {
        let denom = outcome.files_scanned + outcome.files_skipped_incremental;
        let hit_rate = if denom == 0 {
            0.0
        } else {
            (outcome.files_skipped_incremental as f64 / denom as f64) * 100.0
        };
        let time_saved = outcome.files_skipped_incremental as f64 * SECONDS_SAVED_PER_SKIPPED_FILE;
        (hit_rate, time_saved)
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
