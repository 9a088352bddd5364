// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure admission-time validation (spec §3, §6, §9 "Admission validation").
//!
//! These functions are wired into the platform's admission mechanism (or a
//! pre-create hook) by a real deployment; the reconcilers in
//! `clamscan-controller` never assume validation has already run, per the
//! design note, so malformed specs are still handled defensively there.

use clamscan_core::{
    ClusterScanSpec, NodeScanSpec, ScanPolicySpec, ScanScheduleSpec, ValidationError,
};

/// Absolute host paths under which the scanner must never be pointed, even
/// when a user-supplied path would otherwise pass the generic checks below.
const PRIVILEGED_KERNEL_TREES: &[&str] = &["/host/proc", "/host/sys", "/host/dev"];

fn validate_path_list(
    field: &str,
    paths: &[String],
    max_len: usize,
    max_count: usize,
    reject_overlap: bool,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if paths.is_empty() {
        errors.push(ValidationError::invalid(field, "must not be empty"));
        return errors;
    }
    if paths.len() > max_count {
        errors.push(ValidationError::invalid(
            field,
            format!("has {} entries, at most {max_count} allowed", paths.len()),
        ));
    }
    for p in paths {
        if p.len() > max_len {
            errors.push(ValidationError::invalid(
                field,
                format!("entry '{p}' exceeds {max_len} characters"),
            ));
        }
        if reject_overlap {
            if !p.starts_with('/') {
                errors.push(ValidationError::invalid(
                    field,
                    format!("entry '{p}' must be an absolute path"),
                ));
            }
            if p.contains("..") {
                errors.push(ValidationError::invalid(
                    field,
                    format!("entry '{p}' must not contain '..'"),
                ));
            }
            if PRIVILEGED_KERNEL_TREES
                .iter()
                .any(|t| p == t || p.starts_with(&format!("{t}/")))
            {
                errors.push(ValidationError::invalid(
                    field,
                    format!("entry '{p}' overlaps a privileged kernel tree"),
                ));
            }
        }
    }
    errors
}

fn validate_file_timeout_ms(field: &str, ms: u64) -> Option<ValidationError> {
    const MIN: u64 = 1_000;
    const MAX: u64 = 3_600_000;
    if (MIN..=MAX).contains(&ms) {
        None
    } else {
        Some(ValidationError::invalid(
            field,
            format!("{ms} out of range [{MIN}, {MAX}]"),
        ))
    }
}

fn validate_max_file_size_bytes(field: &str, bytes: u64) -> Option<ValidationError> {
    const MIN: u64 = 1_024;
    const MAX: u64 = 10_737_418_240;
    if (MIN..=MAX).contains(&bytes) {
        None
    } else {
        Some(ValidationError::invalid(
            field,
            format!("{bytes} out of range [{MIN}, {MAX}]"),
        ))
    }
}

/// Validate a `NodeScanSpec` (spec §3).
pub fn validate_node_scan_spec(spec: &NodeScanSpec) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if spec.node_name.trim().is_empty() {
        errors.push(ValidationError::invalid("node_name", "must not be empty"));
    }

    if let Some(paths) = &spec.paths {
        errors.extend(validate_path_list(
            "paths",
            paths,
            NodeScanSpec::MAX_PATH_LEN,
            NodeScanSpec::MAX_PATHS,
            true,
        ));
    }

    if let Some(excludes) = &spec.exclude_patterns {
        errors.extend(validate_path_list(
            "exclude_patterns",
            excludes,
            NodeScanSpec::MAX_EXCLUDE_LEN,
            NodeScanSpec::MAX_EXCLUDES,
            false,
        ));
    }

    if let Some(max_concurrent) = spec.max_concurrent {
        if !(1..=20).contains(&max_concurrent) {
            errors.push(ValidationError::invalid(
                "max_concurrent",
                format!("{max_concurrent} out of range [1, 20]"),
            ));
        }
    }

    if let Some(ms) = spec.file_timeout_ms {
        errors.extend(validate_file_timeout_ms("file_timeout_ms", ms));
    }

    if let Some(bytes) = spec.max_file_size_bytes {
        errors.extend(validate_max_file_size_bytes("max_file_size_bytes", bytes));
    }

    errors
}

/// Validate a `ClusterScanSpec` (spec §3; Open Question (a): `concurrent = 0`
/// means "unset" and is valid — the implementation default of 3 wins per
/// spec §9 — only an explicit out-of-range value is rejected).
pub fn validate_cluster_scan_spec(spec: &ClusterScanSpec) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if spec.concurrent != 0 && !(1..=50).contains(&spec.concurrent) {
        errors.push(ValidationError::invalid(
            "concurrent",
            format!("{} out of range [1, 50]", spec.concurrent),
        ));
    }
    if let Some(template) = &spec.template {
        if let Some(paths) = &template.paths {
            errors.extend(validate_path_list(
                "template.paths",
                paths,
                NodeScanSpec::MAX_PATH_LEN,
                NodeScanSpec::MAX_PATHS,
                true,
            ));
        }
        if let Some(max_concurrent) = template.max_concurrent {
            if !(1..=20).contains(&max_concurrent) {
                errors.push(ValidationError::invalid(
                    "template.max_concurrent",
                    format!("{max_concurrent} out of range [1, 20]"),
                ));
            }
        }
    }
    errors
}

/// Validate a `ScanPolicySpec` (spec §3).
pub fn validate_scan_policy_spec(spec: &ScanPolicySpec) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(paths) = &spec.paths {
        errors.extend(validate_path_list(
            "paths",
            paths,
            NodeScanSpec::MAX_PATH_LEN,
            NodeScanSpec::MAX_PATHS,
            true,
        ));
    }
    if let Some(excludes) = &spec.exclude_patterns {
        errors.extend(validate_path_list(
            "exclude_patterns",
            excludes,
            NodeScanSpec::MAX_EXCLUDE_LEN,
            NodeScanSpec::MAX_EXCLUDES,
            false,
        ));
    }
    if let Some(ms) = spec.file_timeout_ms {
        errors.extend(validate_file_timeout_ms("file_timeout_ms", ms));
    }
    if let Some(bytes) = spec.max_file_size_bytes {
        errors.extend(validate_max_file_size_bytes("max_file_size_bytes", bytes));
    }

    if let Some(chat) = &spec.notifications.chat {
        if chat.webhook_credential.store.is_empty() || chat.webhook_credential.key.is_empty() {
            errors.push(ValidationError::invalid(
                "notifications.chat.webhook_credential",
                "store and key must both be set",
            ));
        }
    }
    if let Some(mail) = &spec.notifications.mail {
        if mail.recipients.is_empty() {
            errors.push(ValidationError::invalid(
                "notifications.mail.recipients",
                "must not be empty",
            ));
        }
    }
    if let Some(webhook) = &spec.notifications.webhook {
        if webhook.url_credential.store.is_empty() || webhook.url_credential.key.is_empty() {
            errors.push(ValidationError::invalid(
                "notifications.webhook.url_credential",
                "store and key must both be set",
            ));
        }
    }

    errors
}

/// Validate a `ScanScheduleSpec` (spec §3, §4.3). Only checks the cron
/// expression's gross shape (five whitespace-separated fields); per-field
/// range checking happens in `clamscan-controller::scheduler`, the same
/// split the admission layer and the runtime core keep elsewhere.
pub fn validate_scan_schedule_spec(spec: &ScanScheduleSpec) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let field_count = spec.schedule.split_whitespace().count();
    if field_count != 5 {
        errors.push(ValidationError::invalid(
            "schedule",
            format!("expected 5 fields, found {field_count}"),
        ));
    }
    errors.extend(validate_cluster_scan_spec(&spec.cluster_scan));
    errors
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
