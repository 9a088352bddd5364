// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use clamscan_core::test_support::bare_node_scan_spec;
use clamscan_core::{IncrementalConfig, ScanResult};

fn incremental_node_scan() -> NodeScanSpec {
    let mut spec = bare_node_scan_spec("worker-1");
    spec.strategy = ScanStrategy::Incremental;
    spec.incremental = Some(IncrementalConfig {
        enabled: true,
        baseline_interval: Some(7),
        cache_expiration_hours: Some(168),
        max_file_age_hours: Some(24),
    });
    spec
}

fn file_entry(path: &str, last_scanned_epoch: u64) -> CacheFileEntry {
    CacheFileEntry {
        path: path.to_string(),
        mod_time_epoch: last_scanned_epoch,
        size_bytes: 1024,
        content_digest: None,
        last_scanned_epoch,
        result: ScanResult::Clean,
    }
}

#[test]
fn force_full_scan_spec_flag_wins() {
    let mut spec = incremental_node_scan();
    spec.force_full_scan = true;
    let cache = ScanCacheSpec::empty("worker-1");
    assert!(CacheManager::should_force_full_scan(&spec, &cache, 0));
}

#[test]
fn full_strategy_forces_full_scan() {
    let mut spec = incremental_node_scan();
    spec.strategy = ScanStrategy::Full;
    let cache = ScanCacheSpec::empty("worker-1");
    assert!(CacheManager::should_force_full_scan(&spec, &cache, 0));
}

#[test]
fn missing_incremental_config_forces_full_scan() {
    let mut spec = incremental_node_scan();
    spec.incremental = None;
    let cache = ScanCacheSpec::empty("worker-1");
    assert!(CacheManager::should_force_full_scan(&spec, &cache, 0));
}

#[test]
fn disabled_incremental_config_forces_full_scan() {
    let mut spec = incremental_node_scan();
    spec.incremental.as_mut().unwrap().enabled = false;
    let cache = ScanCacheSpec::empty("worker-1");
    assert!(CacheManager::should_force_full_scan(&spec, &cache, 0));
}

#[test]
fn baseline_interval_reached_forces_full_scan() {
    let spec = incremental_node_scan();
    let mut cache = ScanCacheSpec::empty("worker-1");
    cache.scan_count = 7;
    assert!(CacheManager::should_force_full_scan(&spec, &cache, 0));
}

#[test]
fn stale_cache_forces_full_scan() {
    let spec = incremental_node_scan();
    let mut cache = ScanCacheSpec::empty("worker-1");
    cache.last_full_scan_epoch = Some(0);
    let now = 169 * 3600;
    assert!(CacheManager::should_force_full_scan(&spec, &cache, now));
}

#[test]
fn fresh_incremental_cache_does_not_force_full_scan() {
    let spec = incremental_node_scan();
    let mut cache = ScanCacheSpec::empty("worker-1");
    cache.last_full_scan_epoch = Some(0);
    cache.scan_count = 1;
    let now = 3600;
    assert!(!CacheManager::should_force_full_scan(&spec, &cache, now));
}

#[test]
fn decide_emits_incremental_env_vars_when_not_forced() {
    let spec = incremental_node_scan();
    let mut cache = ScanCacheSpec::empty("worker-1");
    cache.last_full_scan_epoch = Some(100);
    cache.last_incremental_scan_epoch = Some(200);
    let decision = CacheManager::decide(&spec, &cache, 3600);
    assert!(!decision.force_full_scan);
    let as_map: std::collections::HashMap<_, _> = decision.env.iter().cloned().collect();
    assert_eq!(as_map.get("SCAN_STRATEGY").unwrap(), "incremental");
    assert_eq!(as_map.get("INCREMENTAL_ENABLED").unwrap(), "true");
    assert_eq!(as_map.get("MAX_FILE_AGE_HOURS").unwrap(), "24");
    assert_eq!(as_map.get("SKIP_UNCHANGED_FILES").unwrap(), "true");
    assert_eq!(as_map.get("LAST_FULL_SCAN").unwrap(), "100");
    assert_eq!(as_map.get("LAST_INCREMENTAL_SCAN").unwrap(), "200");
}

#[test]
fn decide_omits_incremental_env_vars_when_forced_full() {
    let mut spec = incremental_node_scan();
    spec.force_full_scan = true;
    let cache = ScanCacheSpec::empty("worker-1");
    let decision = CacheManager::decide(&spec, &cache, 0);
    assert!(decision.force_full_scan);
    assert_eq!(decision.effective_strategy, ScanStrategy::Full);
    let as_map: std::collections::HashMap<_, _> = decision.env.iter().cloned().collect();
    assert_eq!(as_map.get("SCAN_STRATEGY").unwrap(), "full");
    assert!(!as_map.contains_key("INCREMENTAL_ENABLED"));
}

#[test]
fn small_cache_is_inlined() {
    let spec = incremental_node_scan();
    let mut cache = ScanCacheSpec::empty("worker-1");
    cache.files.insert("/host/a".to_string(), file_entry("/host/a", 1));
    let decision = CacheManager::decide(&spec, &cache, 0);
    assert!(decision.cache_blob.is_none());
    assert!(decision.env.iter().any(|(k, _)| k == "SCAN_CACHE"));
}

#[test]
fn oversized_cache_is_written_as_a_blob() {
    let spec = incremental_node_scan();
    let mut cache = ScanCacheSpec::empty("worker-1");
    for i in 0..1_001 {
        let path = format!("/host/file-{i}");
        cache.files.insert(path.clone(), file_entry(&path, i as u64));
    }
    let decision = CacheManager::decide(&spec, &cache, 0);
    let (blob_name, data) = decision.cache_blob.expect("cache should exceed inline threshold");
    assert_eq!(blob_name, "scancache-worker-1");
    assert!(data.contains_key("files"));
    assert!(decision.env.iter().any(|(k, v)| k == "SCAN_CACHE_CONFIGMAP" && v == "scancache-worker-1"));
    assert!(!decision.env.iter().any(|(k, _)| k == "SCAN_CACHE"));
}

#[test]
fn full_scan_merge_replaces_cache_entirely() {
    let mut cache = ScanCacheSpec::empty("worker-1");
    cache.files.insert("/host/stale".to_string(), file_entry("/host/stale", 1));
    cache.scan_count = 5;
    let outcome = ScanOutcome {
        files: vec![file_entry("/host/fresh", 10)],
        files_scanned: 1,
        files_skipped_incremental: 0,
    };
    let merged = CacheManager::merge(&cache, true, &outcome, 100);
    assert_eq!(merged.files.len(), 1);
    assert!(merged.files.contains_key("/host/fresh"));
    assert_eq!(merged.scan_count, 0);
    assert_eq!(merged.last_full_scan_epoch, Some(100));
}

#[test]
fn incremental_merge_overwrites_by_path_and_keeps_others() {
    let mut cache = ScanCacheSpec::empty("worker-1");
    cache.files.insert("/host/a".to_string(), file_entry("/host/a", 1));
    cache.files.insert("/host/b".to_string(), file_entry("/host/b", 1));
    cache.scan_count = 2;
    let outcome = ScanOutcome {
        files: vec![file_entry("/host/a", 50)],
        files_scanned: 1,
        files_skipped_incremental: 1,
    };
    let merged = CacheManager::merge(&cache, false, &outcome, 200);
    assert_eq!(merged.files.len(), 2);
    assert_eq!(merged.files["/host/a"].last_scanned_epoch, 50);
    assert_eq!(merged.files["/host/b"].last_scanned_epoch, 1);
    assert_eq!(merged.scan_count, 3);
    assert_eq!(merged.last_incremental_scan_epoch, Some(200));
}

#[test]
fn incremental_merge_truncates_to_max_entries_keeping_most_recent() {
    let mut cache = ScanCacheSpec::empty("worker-1");
    for i in 0..clamscan_core::MAX_CACHE_ENTRIES {
        let path = format!("/host/old-{i}");
        cache.files.insert(path.clone(), file_entry(&path, 1));
    }
    let outcome = ScanOutcome {
        files: vec![file_entry("/host/new", 999_999)],
        files_scanned: 1,
        files_skipped_incremental: 0,
    };
    let merged = CacheManager::merge(&cache, false, &outcome, 300);
    assert_eq!(merged.files.len(), clamscan_core::MAX_CACHE_ENTRIES);
    assert!(merged.files.contains_key("/host/new"));
}

#[test]
fn derive_statistics_computes_hit_rate_and_time_saved() {
    let outcome = ScanOutcome {
        files: vec![],
        files_scanned: 90,
        files_skipped_incremental: 10,
    };
    let (hit_rate, time_saved) = CacheManager::derive_statistics(&outcome);
    assert!((hit_rate - 10.0).abs() < f64::EPSILON);
    assert!((time_saved - 1.0).abs() < f64::EPSILON);
}

#[test]
fn derive_statistics_handles_zero_denominator() {
    let outcome = ScanOutcome::default();
    let (hit_rate, time_saved) = CacheManager::derive_statistics(&outcome);
    assert_eq!(hit_rate, 0.0);
    assert_eq!(time_saved, 0.0);
}
