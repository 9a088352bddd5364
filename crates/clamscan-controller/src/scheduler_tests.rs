// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn epoch(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> u64 {
    chrono::NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, 0)
        .unwrap()
        .and_utc()
        .timestamp() as u64
}

#[test]
fn rejects_wrong_field_count() {
    assert_eq!(CronSchedule::parse("* * * *"), Err(CronError::WrongFieldCount(4)));
}

#[test]
fn rejects_out_of_range_field() {
    assert_eq!(CronSchedule::parse("99 * * * *"), Err(CronError::OutOfRange("99".to_string())));
}

#[test]
fn every_minute_matches_everything() {
    let s = CronSchedule::parse("* * * * *").unwrap();
    assert!(s.matches(epoch(2026, 7, 28, 3, 17)));
}

#[test]
fn exact_minute_and_hour_match() {
    let s = CronSchedule::parse("30 2 * * *").unwrap();
    assert!(s.matches(epoch(2026, 7, 28, 2, 30)));
    assert!(!s.matches(epoch(2026, 7, 28, 2, 31)));
    assert!(!s.matches(epoch(2026, 7, 28, 3, 30)));
}

#[test]
fn step_values_match_every_nth_minute() {
    let s = CronSchedule::parse("*/15 * * * *").unwrap();
    assert!(s.matches(epoch(2026, 7, 28, 3, 0)));
    assert!(s.matches(epoch(2026, 7, 28, 3, 15)));
    assert!(s.matches(epoch(2026, 7, 28, 3, 30)));
    assert!(!s.matches(epoch(2026, 7, 28, 3, 20)));
}

#[test]
fn day_of_month_and_day_of_week_combine_with_or_when_both_restricted() {
    // Jan 1 2026 is a Thursday (weekday 4). "1st of month OR Friday".
    let s = CronSchedule::parse("0 0 1 * 5").unwrap();
    assert!(s.matches(epoch(2026, 1, 1, 0, 0)), "matches via day-of-month");
    assert!(s.matches(epoch(2026, 1, 2, 0, 0)), "Jan 2 2026 is a Friday, matches via day-of-week");
    assert!(!s.matches(epoch(2026, 1, 3, 0, 0)), "Saturday, neither field matches");
}

#[test]
fn next_after_finds_the_following_occurrence() {
    let s = CronSchedule::parse("0 3 * * *").unwrap();
    let after = epoch(2026, 7, 28, 3, 0);
    let next = s.next_after(after).unwrap();
    assert_eq!(next, epoch(2026, 7, 29, 3, 0));
}

#[test]
fn is_due_with_no_prior_run_is_always_due() {
    let s = CronSchedule::parse("0 0 * * *").unwrap();
    assert!(is_due(&s, None, epoch(2026, 7, 28, 12, 0)));
}

#[test]
fn is_due_is_false_before_the_next_scheduled_tick() {
    let s = CronSchedule::parse("0 3 * * *").unwrap();
    let last = epoch(2026, 7, 28, 3, 0);
    let soon_after = epoch(2026, 7, 28, 10, 0);
    assert!(!is_due(&s, Some(last), soon_after));
}

#[test]
fn is_due_is_true_once_the_next_tick_has_passed() {
    let s = CronSchedule::parse("0 3 * * *").unwrap();
    let last = epoch(2026, 7, 28, 3, 0);
    let tomorrow_after = epoch(2026, 7, 29, 4, 0);
    assert!(is_due(&s, Some(last), tomorrow_after));
}
