// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parses the scanner workload's stdout (spec §4.1 "Log parsing", §6
//! "Scanner log contract"). Each line is attempted as a standalone JSON
//! object; only three shapes are meaningful, everything else — including
//! lines that fail to parse at all — is ignored. Interleaving and partial
//! lines (e.g. a log read mid-write) are tolerated by construction: a line
//! that doesn't parse as JSON simply contributes nothing.
//!
//! The completion and infected-file lines are spec.md's §6 wire contract
//! verbatim. The third shape, `cache_entry`, is not in spec.md's log
//! contract — that contract only carries aggregate counters and infected
//! files, with no channel for the per-file metadata the incremental cache
//! (§4.4) actually needs. Per spec §9 "Scanner log schema" ("introduce a new
//! structured marker while retaining the legacy one for one release"), this
//! adds exactly that: one additional line kind, in the same shape as
//! `INFECTED_FILE`, that the scanner emits once per file it examines so the
//! cache has real per-file entries to merge.

use clamscan_core::{CacheFileEntry, InfectedFile, ScanResult, MAX_INFECTED_FILES};

/// The literal completion sentence the scanner emits (spec §9 "Scanner log
/// schema" — treated as a wire contract, not a message to be reworded).
const COMPLETION_MESSAGE: &str = "Scan terminé avec succès";
const INFECTED_ALERT: &str = "INFECTED_FILE";
const CACHE_ENTRY_MARKER: &str = "FILE_SCANNED";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    pub files_scanned: u64,
    pub files_infected: u64,
    pub files_skipped: u64,
    pub error_count: u64,
    pub infected_files: Vec<InfectedFile>,
    /// Per-file metadata observed during this run, fed into
    /// `CacheManager::merge` (spec §4.4). Not part of spec.md's own log
    /// contract — see the module doc comment.
    pub cache_entries: Vec<CacheFileEntry>,
}

/// Parse the full set of stdout lines produced by a completed scanner
/// workload into a [`ScanReport`]. Later completion lines overwrite earlier
/// ones (the scanner is expected to emit exactly one); infected-file entries
/// accumulate in order, capped at [`MAX_INFECTED_FILES`] (spec §4.1
/// "capped at 100 stored entries"); cache entries accumulate uncapped (the
/// caller's merge step owns the 10,000-entry truncation, spec §4.4).
/// `fallback_scanned_epoch` stamps `last_scanned_epoch` on a `cache_entry`
/// line that omits its own `scanned_at`.
pub fn parse_scanner_log(lines: &[String], fallback_scanned_epoch: u64) -> ScanReport {
    let mut report = ScanReport::default();
    for line in lines {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(line) else {
            continue;
        };
        if value.get("message").and_then(|m| m.as_str()) == Some(COMPLETION_MESSAGE) {
            report.files_scanned = value.get("files_scanned").and_then(|v| v.as_u64()).unwrap_or(0);
            report.files_infected = value.get("files_infected").and_then(|v| v.as_u64()).unwrap_or(0);
            report.files_skipped = value.get("files_skipped").and_then(|v| v.as_u64()).unwrap_or(0);
            report.error_count = value.get("errors_count").and_then(|v| v.as_u64()).unwrap_or(0);
        } else if value.get("alert").and_then(|a| a.as_str()) == Some(INFECTED_ALERT)
            && report.infected_files.len() < MAX_INFECTED_FILES
        {
            let path = value
                .get("file_path")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let virus_names = value
                .get("virus_names")
                .and_then(|v| v.as_array())
                .map(|arr| arr.iter().filter_map(|x| x.as_str().map(String::from)).collect())
                .unwrap_or_default();
            let size_bytes = value.get("file_size").and_then(|v| v.as_u64()).unwrap_or(0);
            report.infected_files.push(InfectedFile { path, virus_names, size_bytes });
        } else if value.get("cache_entry").and_then(|a| a.as_str()) == Some(CACHE_ENTRY_MARKER) {
            let Some(path) = value.get("file_path").and_then(|v| v.as_str()) else {
                continue;
            };
            let mod_time_epoch = value.get("mod_time").and_then(|v| v.as_u64()).unwrap_or(0);
            let size_bytes = value.get("file_size").and_then(|v| v.as_u64()).unwrap_or(0);
            let content_digest = value
                .get("content_digest")
                .and_then(|v| v.as_str())
                .map(String::from);
            let last_scanned_epoch = value
                .get("scanned_at")
                .and_then(|v| v.as_u64())
                .unwrap_or(fallback_scanned_epoch);
            let result = if value.get("result").and_then(|v| v.as_str()) == Some("infected") {
                ScanResult::Infected
            } else {
                ScanResult::Clean
            };
            report.cache_entries.push(CacheFileEntry {
                path: path.to_string(),
                mod_time_epoch,
                size_bytes,
                content_digest,
                last_scanned_epoch,
                result,
            });
        }
    }
    report
}

#[cfg(test)]
#[path = "log_parser_tests.rs"]
mod tests;
