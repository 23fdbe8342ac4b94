//! Core domain logic for Northroad: multi-granularity goal plans and
//! spaced-repetition recaps of daily learnings.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod period;
pub mod plan;
pub mod recap;
pub mod stats;
pub mod store;

pub use ingest::{
    ChatMessage, ChatRole, ExtractionResponse, IngestError, IngestReport, PlanningSession,
    ProposedPlan,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::group::{GroupSource, TaskGroup};
pub use model::learning::{Learning, LearningId};
pub use model::plan::{DaySection, Granularity, GroupId, PlanId, PlanItem, WeeklyPlanItem};
pub use period::WeekDescriptor;
pub use plan::book::{PlanBook, PlanRecord, WriteState};
pub use plan::groups::TaskGroupLedger;
pub use recap::log::LearningLog;
pub use recap::schedule::RecapEntry;
pub use stats::{LedIndicator, Rgb};
pub use store::{CollectionKey, DocumentStore, SqliteDocumentStore, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
