//! Keyed-document store contract and typed collection access.
//!
//! # Responsibility
//! - Pin the external persistence contract: read one JSON body per
//!   collection key, write a full replacement of it.
//! - Serialize/deserialize whole collections; the store itself stays opaque.
//!
//! # Invariants
//! - Writes are full replacements, never deltas.
//! - A missing document reads as an empty collection.
//! - The backend guarantees read-your-writes consistency within a session.

use crate::db::DbError;
use crate::model::plan::Granularity;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod sqlite;

pub use sqlite::SqliteDocumentStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Identifier of one persisted collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKey {
    DailyPlans,
    WeeklyPlans,
    MonthlyPlans,
    YearlyPlans,
    TaskGroups,
    WeeklyTaskGroups,
    MonthlyTaskGroups,
    YearlyTaskGroups,
    Learnings,
}

impl CollectionKey {
    /// External document key, kept compatible with the persisted shape.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DailyPlans => "dailyPlans",
            Self::WeeklyPlans => "weeklyPlans",
            Self::MonthlyPlans => "monthlyPlans",
            Self::YearlyPlans => "yearlyPlans",
            Self::TaskGroups => "taskGroups",
            Self::WeeklyTaskGroups => "weeklyTaskGroups",
            Self::MonthlyTaskGroups => "monthlyTaskGroups",
            Self::YearlyTaskGroups => "yearlyTaskGroups",
            Self::Learnings => "learnings",
        }
    }

    /// Plan collection for a granularity.
    pub fn plans_for(granularity: Granularity) -> Self {
        match granularity {
            Granularity::Daily => Self::DailyPlans,
            Granularity::Weekly => Self::WeeklyPlans,
            Granularity::Monthly => Self::MonthlyPlans,
            Granularity::Yearly => Self::YearlyPlans,
        }
    }

    /// Task-group collection for a granularity.
    pub fn groups_for(granularity: Granularity) -> Self {
        match granularity {
            Granularity::Daily => Self::TaskGroups,
            Granularity::Weekly => Self::WeeklyTaskGroups,
            Granularity::Monthly => Self::MonthlyTaskGroups,
            Granularity::Yearly => Self::YearlyTaskGroups,
        }
    }
}

impl Display for CollectionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store-level error for document reads/writes.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Serde {
        key: CollectionKey,
        source: serde_json::Error,
    },
    /// Backend temporarily unreachable; safe to retry.
    Unavailable(String),
}

impl StoreError {
    /// Whether the persist call may be retried without changing its payload.
    ///
    /// Only backend outages and busy/locked database failures qualify;
    /// serialization errors and final database errors surface immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Db(err) => err.is_transient(),
            Self::Unavailable(_) => true,
            Self::Serde { .. } => false,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serde { key, source } => {
                write!(f, "invalid document body for collection `{key}`: {source}")
            }
            Self::Unavailable(message) => write!(f, "document store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serde { source, .. } => Some(source),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Keyed-document persistence contract.
///
/// Implementations either fully apply a write or leave the prior document
/// intact; partial writes are not part of the contract.
pub trait DocumentStore {
    /// Reads the raw JSON body for `key`, `None` when never written.
    fn read_document(&self, key: CollectionKey) -> StoreResult<Option<String>>;
    /// Replaces the whole body for `key`.
    fn write_document(&self, key: CollectionKey, body: &str) -> StoreResult<()>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn read_document(&self, key: CollectionKey) -> StoreResult<Option<String>> {
        (**self).read_document(key)
    }

    fn write_document(&self, key: CollectionKey, body: &str) -> StoreResult<()> {
        (**self).write_document(key, body)
    }
}

/// Loads and deserializes one collection; missing documents read as empty.
pub fn load_collection<T, S>(store: &S, key: CollectionKey) -> StoreResult<Vec<T>>
where
    T: DeserializeOwned,
    S: DocumentStore + ?Sized,
{
    match store.read_document(key)? {
        Some(body) => serde_json::from_str(&body).map_err(|source| StoreError::Serde { key, source }),
        None => Ok(Vec::new()),
    }
}

/// Serializes and writes one collection as a full replacement.
pub fn save_collection<T, S>(store: &S, key: CollectionKey, items: &[T]) -> StoreResult<()>
where
    T: Serialize,
    S: DocumentStore + ?Sized,
{
    let body =
        serde_json::to_string(items).map_err(|source| StoreError::Serde { key, source })?;
    store.write_document(key, &body)
}
