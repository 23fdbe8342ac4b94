//! Plan item records and their bucketing metadata.
//!
//! # Responsibility
//! - Define `PlanItem` (daily/monthly/yearly) and `WeeklyPlanItem`.
//! - Normalize day-section labels coming from outside the core.
//!
//! # Invariants
//! - `date` holds the period key whose format matches the item's
//!   granularity (`YYYY-MM-DD`, `YYYY-MM` or `YYYY`).
//! - Weekly items are keyed by `"{weekStart}_{weekEnd}"` and carry no
//!   section.

use crate::period;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a plan item.
pub type PlanId = Uuid;

/// Stable identifier for a task group.
pub type GroupId = Uuid;

/// Time granularity of one plan collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Slot of the day a daily plan item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaySection {
    WholeDay,
    Morning,
    Afternoon,
    Evening,
}

impl DaySection {
    /// Canonical label stored in `PlanItem.section`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WholeDay => "whole_day",
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
        }
    }

    /// Parses a canonical label; `None` for anything else.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "whole_day" => Some(Self::WholeDay),
            "morning" => Some(Self::Morning),
            "afternoon" => Some(Self::Afternoon),
            "evening" => Some(Self::Evening),
            _ => None,
        }
    }

    /// Lower-cases and trims an externally proposed label, falling back to
    /// `Morning` when it is not a known section.
    pub fn normalize(value: &str) -> Self {
        Self::parse(value.trim().to_lowercase().as_str()).unwrap_or(Self::Morning)
    }
}

/// One plan entry in a daily, monthly or yearly collection.
///
/// `section` is a constrained `DaySection` label for daily items and a free
/// label (possibly empty) for monthly/yearly ones, so it stays a plain
/// string at this level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanItem {
    pub id: PlanId,
    pub section: String,
    pub content: String,
    /// Period key; format depends on the owning collection's granularity.
    pub date: String,
    pub completed: bool,
    /// Weak reference to the AI batch this item was created in, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
}

impl PlanItem {
    /// Creates a manually added plan item with a fresh id.
    pub fn new(
        section: impl Into<String>,
        content: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            section: section.into(),
            content: content.into(),
            date: date.into(),
            completed: false,
            group_id: None,
        }
    }
}

/// One plan entry in the weekly collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPlanItem {
    pub id: PlanId,
    pub content: String,
    /// `"{weekStart}_{weekEnd}"`, both bounds `YYYY-MM-DD`.
    pub week_key: String,
    /// Monday of the week. Sunday values are legacy-corrupt and corrected
    /// once at load time.
    pub week_start: NaiveDate,
    /// Sunday of the week.
    pub week_end: NaiveDate,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
}

impl WeeklyPlanItem {
    /// Creates a weekly plan item for the given bounds with a fresh id.
    pub fn new(content: impl Into<String>, week_start: NaiveDate, week_end: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            week_key: period::week_key_for_bounds(week_start, week_end),
            week_start,
            week_end,
            completed: false,
            group_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DaySection, PlanItem, WeeklyPlanItem};
    use chrono::NaiveDate;

    #[test]
    fn section_normalization_defaults_to_morning() {
        assert_eq!(DaySection::normalize(" Evening "), DaySection::Evening);
        assert_eq!(DaySection::normalize("WHOLE_DAY"), DaySection::WholeDay);
        assert_eq!(DaySection::normalize("late night"), DaySection::Morning);
        assert_eq!(DaySection::normalize(""), DaySection::Morning);
    }

    #[test]
    fn new_items_start_incomplete_and_ungrouped() {
        let item = PlanItem::new("morning", "review notes", "2025-06-10");
        assert!(!item.completed);
        assert!(item.group_id.is_none());
    }

    #[test]
    fn weekly_item_derives_its_key_from_bounds() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 6, 8).unwrap();
        let item = WeeklyPlanItem::new("ship draft", start, end);
        assert_eq!(item.week_key, "2025-06-02_2025-06-08");
    }
}
