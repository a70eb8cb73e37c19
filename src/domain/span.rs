//! Date-span math shared by the impact calculators
//!
//! All spans are inclusive whole-day counts: a task scheduled
//! `[Mar 1, Mar 3]` spans 3 days. When explicit dates are absent the
//! span is derived from `duration_hours` at 8 hours per day, rounded
//! up, falling back to a single day. Both calculators must route every
//! span/overlap decision through here so they cannot drift apart.

use chrono::{Duration, NaiveDate};

use super::task::Task;

/// Hours of plan work that fill one calendar day
const HOURS_PER_DAY: u32 = 8;

/// Returns the task's span in whole days (always >= 1)
pub fn span_days(task: &Task) -> i64 {
    if let (Some(start), Some(end)) = (task.start_date, task.end_date) {
        if end >= start {
            return (end - start).num_days() + 1;
        }
    }

    if let Some(hours) = task.duration_hours {
        if hours > 0 {
            return hours.div_ceil(HOURS_PER_DAY) as i64;
        }
    }

    // Documented fallback: single-day assumption
    1
}

/// Resolves the task's effective end date
///
/// Uses the explicit `end_date` when present, otherwise derives one
/// from the start date and the task's span. Returns `None` for tasks
/// with no start date (they have no position in the chain).
pub fn effective_end(task: &Task) -> Option<NaiveDate> {
    match (task.start_date, task.end_date) {
        (_, Some(end)) => Some(end),
        (Some(start), None) => Some(start + Duration::days(span_days(task) - 1)),
        (None, None) => None,
    }
}

/// Resolves the task's effective `[start, end]` window, if it has one
pub fn effective_start_end(task: &Task) -> Option<(NaiveDate, NaiveDate)> {
    let start = task.start_date?;
    let end = effective_end(task)?;
    Some((start, end.max(start)))
}

/// Symmetric inclusive interval overlap in whole days, zero if disjoint
pub fn overlap_days(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> i64 {
    let start = a_start.max(b_start);
    let end = a_end.min(b_end);

    if end >= start {
        (end - start).num_days() + 1
    } else {
        0
    }
}

/// Returns true if the date falls before the caller's current date
pub fn is_past(date: NaiveDate, today: NaiveDate) -> bool {
    date < today
}
