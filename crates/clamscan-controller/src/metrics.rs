// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator-wide Prometheus metrics (spec §6 "Metrics"), registered once
//! globally via `lazy_static`, following the teacher's
//! `core::metrics` pattern. A `register_*!` call only fails on a duplicate
//! metric name, a programming error that should fail fast at startup rather
//! than be propagated as a runtime `Result`.

#![allow(clippy::unwrap_used)]

use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, GaugeVec, Histogram, HistogramOpts, HistogramVec, TextEncoder,
    register_counter, register_counter_vec, register_gauge, register_gauge_vec,
    register_histogram_vec,
};

const SCAN_DURATION_BUCKETS: &[f64] = &[30.0, 60.0, 120.0, 300.0, 600.0, 1200.0, 1800.0, 3600.0];

lazy_static! {
    // --- NodeScan ---
    pub static ref NODESCANS_TOTAL: CounterVec = register_counter_vec!(
        "clamav_nodescans_total",
        "Total NodeScans reconciled to a terminal phase, labeled by outcome.",
        &["status"]
    )
    .unwrap();
    pub static ref NODESCANS_RUNNING: Gauge = register_gauge!(
        "clamav_nodescans_running",
        "Number of NodeScans currently in the Running phase."
    )
    .unwrap();
    pub static ref FILES_SCANNED_TOTAL: Counter = register_counter!(
        "clamav_files_scanned_total",
        "Total number of files scanned across all NodeScans."
    )
    .unwrap();
    pub static ref FILES_INFECTED_TOTAL: Counter = register_counter!(
        "clamav_files_infected_total",
        "Total number of infected files found across all NodeScans."
    )
    .unwrap();
    pub static ref SCAN_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        HistogramOpts::new("clamav_scan_duration_seconds", "Duration of completed NodeScans, in seconds.")
            .buckets(SCAN_DURATION_BUCKETS.to_vec()),
        &["node"]
    )
    .unwrap();

    // --- ClusterScan ---
    pub static ref CLUSTERSCAN_NODES_TOTAL: GaugeVec = register_gauge_vec!(
        "clamav_clusterscan_nodes_total",
        "Number of nodes selected for the current ClusterScan fan-out, labeled by cluster scan name.",
        &["cluster_scan"]
    )
    .unwrap();
    pub static ref CLUSTERSCAN_NODES_COMPLETED: GaugeVec = register_gauge_vec!(
        "clamav_clusterscan_nodes_completed",
        "Number of child NodeScans that have completed for the current ClusterScan.",
        &["cluster_scan"]
    )
    .unwrap();
    pub static ref CLUSTERSCAN_NODES_FAILED: GaugeVec = register_gauge_vec!(
        "clamav_clusterscan_nodes_failed",
        "Number of child NodeScans that have failed for the current ClusterScan.",
        &["cluster_scan"]
    )
    .unwrap();
    pub static ref CLUSTERSCANS_TOTAL: CounterVec = register_counter_vec!(
        "clamav_clusterscans_total",
        "Total ClusterScans reconciled to a terminal phase, labeled by outcome.",
        &["status"]
    )
    .unwrap();

    // --- ScanPolicy / ScanSchedule ---
    pub static ref SCANPOLICY_USAGE_TOTAL: CounterVec = register_counter_vec!(
        "clamav_scanpolicy_usage_total",
        "Total number of NodeScans that referenced a ScanPolicy, labeled by policy name.",
        &["policy"]
    )
    .unwrap();
    pub static ref SCANSCHEDULE_EXECUTIONS_TOTAL: CounterVec = register_counter_vec!(
        "clamav_scanschedule_executions_total",
        "Total number of ClusterScans fired by a ScanSchedule, labeled by outcome.",
        &["status"]
    )
    .unwrap();

    // --- Incremental scanning / cache ---
    pub static ref INCREMENTAL_SCANS_TOTAL: CounterVec = register_counter_vec!(
        "clamav_incremental_scans_total",
        "Total NodeScans run under each effective scan strategy.",
        &["strategy"]
    )
    .unwrap();
    pub static ref FILES_SKIPPED_INCREMENTAL_TOTAL: Counter = register_counter!(
        "clamav_files_skipped_incremental_total",
        "Total number of files skipped due to incremental cache hits."
    )
    .unwrap();
    pub static ref CACHE_HIT_RATE_PERCENT: GaugeVec = register_gauge_vec!(
        "clamav_cache_hit_rate_percent",
        "Most recent cache-hit rate observed for a node's incremental scan, labeled by node.",
        &["node"]
    )
    .unwrap();
    pub static ref TIME_SAVED_INCREMENTAL_SECONDS: Counter = register_counter!(
        "clamav_time_saved_incremental_seconds",
        "Cumulative estimated time saved by skipping unchanged files."
    )
    .unwrap();
    pub static ref SCAN_CACHE_SIZE_BYTES: GaugeVec = register_gauge_vec!(
        "clamav_scan_cache_size_bytes",
        "Serialized size of a node's ScanCache, labeled by node.",
        &["node"]
    )
    .unwrap();
    pub static ref SCAN_CACHE_FILES_TOTAL: GaugeVec = register_gauge_vec!(
        "clamav_scan_cache_files_total",
        "Number of entries retained in a node's ScanCache, labeled by node.",
        &["node"]
    )
    .unwrap();
}

/// Gathers all registered metrics and encodes them in the Prometheus text
/// exposition format, for the `/metrics` HTTP endpoint.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder.encode_to_string(&metric_families).unwrap_or_default()
}
