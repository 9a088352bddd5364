// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A standard 5-field cron matcher (spec §4.3 "Trigger semantics"). The
//! teacher's own scheduling primitives (`engine::scheduler::Timer`,
//! `runbook::cron::CronDef`) drive interval-duration strings, not cron
//! expressions, so this is hand-rolled in their style — field parsing plus a
//! bounded forward search — rather than adapted from either.

use chrono::{DateTime, Datelike, Timelike, Utc};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CronError {
    #[error("expected 5 whitespace-separated fields, found {0}")]
    WrongFieldCount(usize),
    #[error("invalid field '{0}'")]
    InvalidField(String),
    #[error("field '{0}' out of range")]
    OutOfRange(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldSet(BTreeSet<u32>);

impl FieldSet {
    fn parse(field: &str, min: u32, max: u32) -> Result<Self, CronError> {
        let mut set = BTreeSet::new();
        for part in field.split(',') {
            let (range_part, step) = match part.split_once('/') {
                Some((r, s)) => {
                    let step: u32 = s.parse().map_err(|_| CronError::InvalidField(field.to_string()))?;
                    (r, step.max(1))
                }
                None => (part, 1),
            };
            let (lo, hi) = if range_part == "*" {
                (min, max)
            } else if let Some((a, b)) = range_part.split_once('-') {
                let lo: u32 = a.parse().map_err(|_| CronError::InvalidField(field.to_string()))?;
                let hi: u32 = b.parse().map_err(|_| CronError::InvalidField(field.to_string()))?;
                (lo, hi)
            } else {
                let v: u32 = range_part.parse().map_err(|_| CronError::InvalidField(field.to_string()))?;
                (v, v)
            };
            if lo < min || hi > max || lo > hi {
                return Err(CronError::OutOfRange(field.to_string()));
            }
            let mut v = lo;
            while v <= hi {
                set.insert(v);
                v += step;
            }
        }
        Ok(Self(set))
    }

    fn contains(&self, v: u32) -> bool {
        self.0.contains(&v)
    }
}

/// A parsed cron expression, in `minute hour day-of-month month day-of-week`
/// order. Day-of-month and day-of-week combine with OR semantics when both
/// are restricted, matching standard cron behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    minute: FieldSet,
    hour: FieldSet,
    day_of_month: FieldSet,
    month: FieldSet,
    day_of_week: FieldSet,
    day_of_month_restricted: bool,
    day_of_week_restricted: bool,
}

/// Bound on how far into the future `next_after` searches before giving up;
/// generous enough for any realistic cron expression to find a match.
const MAX_LOOKAHEAD_MINUTES: u64 = 4 * 366 * 24 * 60;

impl CronSchedule {
    pub fn parse(expr: &str) -> Result<Self, CronError> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(CronError::WrongFieldCount(fields.len()));
        }
        Ok(Self {
            minute: FieldSet::parse(fields[0], 0, 59)?,
            hour: FieldSet::parse(fields[1], 0, 23)?,
            day_of_month: FieldSet::parse(fields[2], 1, 31)?,
            month: FieldSet::parse(fields[3], 1, 12)?,
            day_of_week: FieldSet::parse(fields[4], 0, 6)?,
            day_of_month_restricted: fields[2] != "*",
            day_of_week_restricted: fields[4] != "*",
        })
    }

    fn day_matches(&self, day_of_month: u32, day_of_week: u32) -> bool {
        match (self.day_of_month_restricted, self.day_of_week_restricted) {
            (false, false) => true,
            (true, false) => self.day_of_month.contains(day_of_month),
            (false, true) => self.day_of_week.contains(day_of_week),
            (true, true) => self.day_of_month.contains(day_of_month) || self.day_of_week.contains(day_of_week),
        }
    }

    fn matches(&self, epoch_secs: u64) -> bool {
        let Some(dt) = DateTime::<Utc>::from_timestamp(epoch_secs as i64, 0) else {
            return false;
        };
        self.minute.contains(dt.minute())
            && self.hour.contains(dt.hour())
            && self.month.contains(dt.month())
            && self.day_matches(dt.day(), dt.weekday().num_days_from_sunday())
    }

    /// The next epoch-seconds timestamp strictly after `after_epoch_secs`
    /// that matches this schedule, searched minute-by-minute.
    pub fn next_after(&self, after_epoch_secs: u64) -> Option<u64> {
        let mut candidate = ((after_epoch_secs / 60) + 1) * 60;
        for _ in 0..MAX_LOOKAHEAD_MINUTES {
            if self.matches(candidate) {
                return Some(candidate);
            }
            candidate += 60;
        }
        None
    }
}

/// A schedule is due if it has never fired, or if its next run after the last
/// firing has already arrived (spec §4.3 "Trigger semantics").
pub fn is_due(schedule: &CronSchedule, last_schedule_time_epoch_secs: Option<u64>, now_epoch_secs: u64) -> bool {
    match last_schedule_time_epoch_secs {
        None => true,
        Some(last) => schedule.next_after(last.saturating_sub(1)).is_some_and(|next| next <= now_epoch_secs),
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
