//! Plan collections: per-granularity CRUD, task-group ledger and the
//! legacy week-key data migration.

pub mod book;
pub mod groups;
pub mod migrate;
