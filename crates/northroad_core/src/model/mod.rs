//! Domain model for plans, task groups and recap-tracked learnings.
//!
//! # Responsibility
//! - Define the canonical records persisted per plan collection.
//! - Keep cross-entity links weak and id-based; no embedded object graphs.
//!
//! # Invariants
//! - Every record carries a stable id that is never reused.
//! - `TaskGroup.plan_ids` may reference already-deleted plan items; readers
//!   treat those as inactive members, not errors.

pub mod group;
pub mod learning;
pub mod plan;
