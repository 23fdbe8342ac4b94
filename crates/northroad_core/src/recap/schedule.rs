//! Recap scheduling queries.
//!
//! # Responsibility
//! - Derive which learnings are due on a day from their fixed schedule and
//!   the per-date completion ledger.
//!
//! # Invariants
//! - Functions are pure; the derived `completed` flag is computed per view
//!   and never written back to a learning.
//! - Viewing today folds unresolved overdue occurrences in; viewing any
//!   other day shows only exact schedule matches.

use crate::model::learning::Learning;
use chrono::{Duration, NaiveDate};

/// Day offsets of the spaced-repetition schedule, counted from the day a
/// note was learned.
pub const RECAP_INTERVALS_DAYS: [i64; 5] = [1, 3, 7, 15, 30];

/// Recap dates for a note learned on `learned`, in schedule order.
pub fn recap_schedule(learned: NaiveDate) -> Vec<NaiveDate> {
    RECAP_INTERVALS_DAYS
        .iter()
        .map(|days| learned + Duration::days(*days))
        .collect()
}

/// One learning surfaced for a given day, with its per-date completion flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecapEntry<'a> {
    pub learning: &'a Learning,
    /// Whether the occurrence on the viewed date is marked done.
    pub completed: bool,
}

/// Learnings due on `target`.
///
/// When `target` is `today`, a learning is included if it is scheduled for
/// today or has any earlier scheduled date that was never completed (overdue
/// catch-up). For any other day only exact schedule matches are returned,
/// regardless of completion.
pub fn due_on<'a>(
    target: NaiveDate,
    learnings: &'a [Learning],
    today: NaiveDate,
) -> Vec<RecapEntry<'a>> {
    learnings
        .iter()
        .filter(|learning| {
            let scheduled = learning.recap_dates.contains(&target);
            if target != today {
                return scheduled;
            }
            let overdue_incomplete = learning
                .recap_dates
                .iter()
                .any(|date| *date < target && !learning.completed_dates.contains(date));
            scheduled || overdue_incomplete
        })
        .map(|learning| RecapEntry {
            learning,
            completed: learning.is_completed_on(target),
        })
        .collect()
}

/// Learnings created on `date`, independent of any recap schedule.
pub fn learned_on(date: NaiveDate, learnings: &[Learning]) -> Vec<&Learning> {
    learnings
        .iter()
        .filter(|learning| learning.date == date)
        .collect()
}

/// Idempotently adds or removes `date` in the completion ledger.
///
/// Returns whether the ledger actually changed; re-adding a present date or
/// removing an absent one is a no-op, not an error.
pub fn mark_completion(learning: &mut Learning, date: NaiveDate, completed: bool) -> bool {
    let present = learning.completed_dates.contains(&date);
    match (completed, present) {
        (true, false) => {
            learning.completed_dates.push(date);
            true
        }
        (false, true) => {
            learning.completed_dates.retain(|existing| *existing != date);
            true
        }
        _ => false,
    }
}

/// Number of learnings with at least one unresolved occurrence scheduled on
/// or before `today`. Drives the "reviews due" indicator.
pub fn reviews_due_count(learnings: &[Learning], today: NaiveDate) -> usize {
    learnings
        .iter()
        .filter(|learning| {
            learning
                .recap_dates
                .iter()
                .any(|date| *date <= today && !learning.completed_dates.contains(date))
        })
        .count()
}
