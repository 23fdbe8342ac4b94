//! One-time corrective migration for legacy weekly bucket keys.
//!
//! # Responsibility
//! - Detect weekly records whose `week_start` is a Sunday, produced by an
//!   earlier UTC-based week calculation, and shift them to Monday anchoring.
//!
//! # Invariants
//! - Running the correction twice yields the same result as running it once.
//! - Items are corrected in place; nothing is added or duplicated.

use crate::model::plan::WeeklyPlanItem;
use crate::period;
use chrono::Duration;

/// Shifts Sunday-anchored weekly records forward by one day and recomputes
/// their `week_key`. Returns the number of corrected items.
pub fn fix_legacy_week_keys(items: &mut [WeeklyPlanItem]) -> usize {
    let mut corrected = 0;
    for item in items.iter_mut() {
        if !period::is_legacy_week_anchor(item.week_start) {
            continue;
        }
        item.week_start += Duration::days(1);
        item.week_end += Duration::days(1);
        item.week_key = period::week_key_for_bounds(item.week_start, item.week_end);
        corrected += 1;
    }
    corrected
}
