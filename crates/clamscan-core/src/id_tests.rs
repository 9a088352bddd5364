// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn truncate_identifier_respects_bound() {
    let long = "a".repeat(100);
    let truncated = truncate_identifier(&long);
    assert_eq!(truncated.len(), 63);
}

#[test]
fn truncate_identifier_noop_when_short() {
    assert_eq!(truncate_identifier("short-name"), "short-name");
}

#[test]
fn truncate_identifier_strips_trailing_dash_after_cut() {
    let mut name = "a".repeat(62);
    name.push('-');
    name.push_str("rest-of-the-name");
    let truncated = truncate_identifier(&name);
    assert!(!truncated.ends_with('-'));
}
