//! Learning record with its spaced-repetition recap ledger.
//!
//! # Responsibility
//! - Define the recap-tracked note: fixed `recap_dates` schedule crossed
//!   with a mutable `completed_dates` ledger.
//!
//! # Invariants
//! - `completed_dates` is intended to be a subset of `recap_dates` but is
//!   never structurally enforced; readers tolerate stray entries.
//! - A recap occurrence is identified by `(learning id, date)`, never by the
//!   learning alone.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a learning entry.
pub type LearningId = Uuid;

/// One recorded learning and its recap schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Learning {
    pub id: LearningId,
    pub content: String,
    /// Day the note was learned.
    pub date: NaiveDate,
    /// Days the note should be resurfaced on, in schedule order.
    #[serde(default)]
    pub recap_dates: Vec<NaiveDate>,
    /// Recap dates the user has marked done.
    #[serde(default)]
    pub completed_dates: Vec<NaiveDate>,
}

impl Learning {
    /// Creates a learning with a fresh id and an empty recap ledger.
    pub fn new(content: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            date,
            recap_dates: Vec::new(),
            completed_dates: Vec::new(),
        }
    }

    /// Whether the recap occurrence on `date` has been marked done.
    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        self.completed_dates.contains(&date)
    }
}
