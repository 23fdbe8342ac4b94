//! Period key calculus.
//!
//! # Responsibility
//! - Map calendar dates to the daily/weekly/monthly/yearly bucket keys used
//!   by every plan collection.
//! - Enumerate the Monday-anchored weeks overlapping a month.
//!
//! # Invariants
//! - All functions are pure and deterministic.
//! - `week_start(d) <= d <= week_end(d)` and `week_start` is always a Monday.
//! - All four keys for the same date are mutually consistent.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Number of days covered by one plan week (Monday through Sunday).
const DAYS_PER_WEEK: i64 = 7;

/// Daily bucket key, `YYYY-MM-DD`.
///
/// Callers pass a plain calendar date, so no UTC conversion can shift the
/// key across a midnight boundary.
pub fn daily_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Monthly bucket key, `YYYY-MM`.
pub fn monthly_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Yearly bucket key, four-digit year.
pub fn yearly_key(date: NaiveDate) -> String {
    date.format("%Y").to_string()
}

/// The Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// The Sunday of the week containing `date`.
pub fn week_end(date: NaiveDate) -> NaiveDate {
    week_start(date) + Duration::days(DAYS_PER_WEEK - 1)
}

/// Weekly bucket key, `"{weekStart}_{weekEnd}"` with both bounds `YYYY-MM-DD`.
pub fn week_key(date: NaiveDate) -> String {
    week_key_for_bounds(week_start(date), week_end(date))
}

/// Builds a weekly key from already-computed bounds.
pub fn week_key_for_bounds(start: NaiveDate, end: NaiveDate) -> String {
    format!("{}_{}", daily_key(start), daily_key(end))
}

/// One Monday-anchored week overlapping a month, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekDescriptor {
    /// 1-based position within the month's week list.
    pub number: u32,
    /// Monday of the week.
    pub start: NaiveDate,
    /// Sunday of the week.
    pub end: NaiveDate,
}

impl WeekDescriptor {
    /// Weekly bucket key for this descriptor.
    pub fn key(&self) -> String {
        week_key_for_bounds(self.start, self.end)
    }
}

impl Display for WeekDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Week {}: {} to {}",
            self.number,
            daily_key(self.start),
            daily_key(self.end)
        )
    }
}

/// Lists the weeks whose interval overlaps the given month.
///
/// Weeks are walked Monday to Monday starting from the week containing the
/// first day of the month; a week is included when its start or end falls
/// inside the month. Returns an empty list for an invalid year/month pair.
pub fn weeks_in_month(year: i32, month: u32) -> Vec<WeekDescriptor> {
    let Some(first_day) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let last_day = last_day_of_month(first_day);

    let mut weeks = Vec::new();
    let mut cursor = week_start(first_day);
    let mut number = 1;

    while cursor <= last_day {
        let end = cursor + Duration::days(DAYS_PER_WEEK - 1);
        if cursor.month() == month || end.month() == month {
            weeks.push(WeekDescriptor {
                number,
                start: cursor,
                end,
            });
            number += 1;
        }
        cursor += Duration::days(DAYS_PER_WEEK);
    }

    weeks
}

/// Returns whether `date` falls on the weekday the legacy UTC week math
/// anchored weeks to.
pub fn is_legacy_week_anchor(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sun
}

fn last_day_of_month(first_day: NaiveDate) -> NaiveDate {
    let (next_year, next_month) = if first_day.month() == 12 {
        (first_day.year() + 1, 1)
    } else {
        (first_day.year(), first_day.month() + 1)
    };
    // The 1st always exists, so the fallback is unreachable in practice.
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .map(|next_first| next_first - Duration::days(1))
        .unwrap_or(first_day)
}
