//! Task group record linking one AI-generated batch of plan items.
//!
//! # Responsibility
//! - Record which plan items were created together so the batch can be
//!   revoked as a unit.
//!
//! # Invariants
//! - `plan_ids` is the creation-ordered set of member ids.
//! - Members deleted individually stay listed; they count as inactive.

use crate::model::plan::{GroupId, PlanId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Where a task group batch originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupSource {
    /// Plain planning-assistant conversation.
    Assistant,
    /// Breakdown of an item from a coarser granularity.
    Breakdown,
}

/// One revocable batch of AI-generated plan items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskGroup {
    pub id: GroupId,
    /// Human label of the originating request.
    pub task_name: String,
    pub plan_ids: Vec<PlanId>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<GroupSource>,
}

impl TaskGroup {
    /// Creates a group record stamped with the current time.
    pub fn new(
        id: GroupId,
        task_name: impl Into<String>,
        plan_ids: Vec<PlanId>,
        source: Option<GroupSource>,
    ) -> Self {
        Self {
            id,
            task_name: task_name.into(),
            plan_ids,
            created_at: Utc::now(),
            source,
        }
    }

    /// Generates a fresh group id.
    pub fn fresh_id() -> GroupId {
        Uuid::new_v4()
    }

    /// Number of members still present in the live plan collection.
    ///
    /// Display-only; a group with zero active members is kept until the user
    /// deletes it.
    pub fn active_count(&self, live_plan_ids: &HashSet<PlanId>) -> usize {
        self.plan_ids
            .iter()
            .filter(|id| live_plan_ids.contains(id))
            .count()
    }
}
