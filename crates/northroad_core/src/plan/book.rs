//! Per-granularity plan collection with optimistic persistence.
//!
//! # Responsibility
//! - Provide CRUD over one collection addressed by item id.
//! - Persist every mutation as a full-collection replacement and keep the
//!   last confirmed state when the persist call fails.
//!
//! # Invariants
//! - Mutations on absent ids are silent no-ops; concurrent deletion is
//!   expected and benign.
//! - Insertion order is the only ordering guarantee.
//! - The write state machine is `Clean -> PendingWrite -> (Clean | Conflict)`;
//!   a book parked in `Conflict` holds the last confirmed items until
//!   `refresh()` re-reads the store.

use crate::model::plan::{GroupId, PlanId, PlanItem, WeeklyPlanItem};
use crate::plan::migrate::fix_legacy_week_keys;
use crate::store::{
    load_collection, save_collection, CollectionKey, DocumentStore, StoreResult,
};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::thread;
use std::time::Duration;

/// Persist attempts per mutation, including the first.
const PERSIST_ATTEMPTS: u32 = 3;
/// Base delay between attempts; grows linearly per retry.
const PERSIST_BACKOFF: Duration = Duration::from_millis(50);

/// Confirmation state of one optimistically mutated collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteState {
    /// In-memory items match the last confirmed store state.
    Clean,
    /// A persist call is in flight.
    PendingWrite,
    /// The last persist failed; in-memory items are the last confirmed
    /// state, the optimistic candidate was discarded.
    Conflict,
}

/// Record shape a plan book can manage.
pub trait PlanRecord: Clone + Serialize + DeserializeOwned {
    fn id(&self) -> PlanId;
    fn assign_id(&mut self, id: PlanId);
    fn set_completed(&mut self, completed: bool);
    fn set_content(&mut self, content: String);
    fn set_group_id(&mut self, group_id: GroupId);
}

impl PlanRecord for PlanItem {
    fn id(&self) -> PlanId {
        self.id
    }

    fn assign_id(&mut self, id: PlanId) {
        self.id = id;
    }

    fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    fn set_content(&mut self, content: String) {
        self.content = content;
    }

    fn set_group_id(&mut self, group_id: GroupId) {
        self.group_id = Some(group_id);
    }
}

impl PlanRecord for WeeklyPlanItem {
    fn id(&self) -> PlanId {
        self.id
    }

    fn assign_id(&mut self, id: PlanId) {
        self.id = id;
    }

    fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    fn set_content(&mut self, content: String) {
        self.content = content;
    }

    fn set_group_id(&mut self, group_id: GroupId) {
        self.group_id = Some(group_id);
    }
}

/// One plan collection bound to its document-store key.
pub struct PlanBook<S: DocumentStore, T: PlanRecord> {
    store: S,
    key: CollectionKey,
    items: Vec<T>,
    state: WriteState,
}

impl<S: DocumentStore, T: PlanRecord> PlanBook<S, T> {
    /// Loads the collection behind `key` into a clean book.
    pub fn load(store: S, key: CollectionKey) -> StoreResult<Self> {
        let items = load_collection(&store, key)?;
        Ok(Self {
            store,
            key,
            items,
            state: WriteState::Clean,
        })
    }

    /// Last confirmed items, in insertion order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Current write state.
    pub fn state(&self) -> WriteState {
        self.state
    }

    /// Collection key this book persists to.
    pub fn key(&self) -> CollectionKey {
        self.key
    }

    /// Ids of all live items, for weak-reference resolution.
    pub fn live_ids(&self) -> HashSet<PlanId> {
        self.items.iter().map(PlanRecord::id).collect()
    }

    /// Re-reads the store and returns the book to `Clean`.
    ///
    /// Conflict-recovery policy: the store is the source of truth, any
    /// unconfirmed optimistic mutation is abandoned.
    pub fn refresh(&mut self) -> StoreResult<()> {
        self.items = load_collection(&self.store, self.key)?;
        self.state = WriteState::Clean;
        Ok(())
    }

    /// Appends one item. No dedup check; callers own double-add avoidance.
    pub fn add(&mut self, mut item: T) -> StoreResult<PlanId> {
        if item.id().is_nil() {
            item.assign_id(uuid::Uuid::new_v4());
        }
        let id = item.id();
        let mut next = self.items.clone();
        next.push(item);
        self.commit(next)?;
        info!(
            "event=plan_add module=plan status=ok collection={} id={id}",
            self.key
        );
        Ok(id)
    }

    /// Appends a batch in one persist call. Used by the group ledger.
    pub fn add_batch(&mut self, items: Vec<T>) -> StoreResult<()> {
        if items.is_empty() {
            return Ok(());
        }
        let count = items.len();
        let mut next = self.items.clone();
        next.extend(items);
        self.commit(next)?;
        info!(
            "event=plan_add_batch module=plan status=ok collection={} count={count}",
            self.key
        );
        Ok(())
    }

    /// Sets the completion flag; silent no-op when the id is absent.
    pub fn toggle(&mut self, id: PlanId, completed: bool) -> StoreResult<()> {
        self.mutate_one(id, |item| item.set_completed(completed))
    }

    /// Replaces the content; silent no-op when the id is absent.
    pub fn edit(&mut self, id: PlanId, content: impl Into<String>) -> StoreResult<()> {
        let content = content.into();
        self.mutate_one(id, move |item| item.set_content(content))
    }

    /// Removes one item; silent no-op when the id is absent.
    pub fn remove(&mut self, id: PlanId) -> StoreResult<()> {
        let next: Vec<T> = self
            .items
            .iter()
            .filter(|item| item.id() != id)
            .cloned()
            .collect();
        if next.len() == self.items.len() {
            return Ok(());
        }
        self.commit(next)?;
        info!(
            "event=plan_remove module=plan status=ok collection={} id={id}",
            self.key
        );
        Ok(())
    }

    /// Removes every item whose id is in `ids`, tolerating already-deleted
    /// members. Used by cascading group deletion.
    pub fn remove_many(&mut self, ids: &HashSet<PlanId>) -> StoreResult<usize> {
        let next: Vec<T> = self
            .items
            .iter()
            .filter(|item| !ids.contains(&item.id()))
            .cloned()
            .collect();
        let removed = self.items.len() - next.len();
        if removed == 0 {
            return Ok(0);
        }
        self.commit(next)?;
        info!(
            "event=plan_remove_batch module=plan status=ok collection={} removed={removed}",
            self.key
        );
        Ok(removed)
    }

    fn mutate_one(&mut self, id: PlanId, apply: impl FnOnce(&mut T)) -> StoreResult<()> {
        let Some(position) = self.items.iter().position(|item| item.id() == id) else {
            return Ok(());
        };
        let mut next = self.items.clone();
        apply(&mut next[position]);
        self.commit(next)
    }

    /// Persists `next` and commits it on success; on failure the prior
    /// confirmed items stay in place and the error surfaces to the caller.
    pub(crate) fn commit(&mut self, next: Vec<T>) -> StoreResult<()> {
        self.state = WriteState::PendingWrite;
        match persist_with_retry(&self.store, self.key, &next) {
            Ok(()) => {
                self.items = next;
                self.state = WriteState::Clean;
                Ok(())
            }
            Err(err) => {
                self.state = WriteState::Conflict;
                warn!(
                    "event=plan_persist module=plan status=error collection={} error={err}",
                    self.key
                );
                Err(err)
            }
        }
    }
}

impl<S: DocumentStore> PlanBook<S, PlanItem> {
    /// Items bucketed under `period_key`, optionally narrowed to a section.
    pub fn for_period(&self, period_key: &str, section: Option<&str>) -> Vec<&PlanItem> {
        self.items
            .iter()
            .filter(|item| item.date == period_key)
            .filter(|item| section.map_or(true, |wanted| item.section == wanted))
            .collect()
    }
}

impl<S: DocumentStore> PlanBook<S, WeeklyPlanItem> {
    /// Loads the weekly collection and runs the one-time legacy week-key
    /// correction, persisting only when something actually changed.
    pub fn load_weekly(store: S) -> StoreResult<Self> {
        let mut book = Self::load(store, CollectionKey::WeeklyPlans)?;
        let corrected = fix_legacy_week_keys(&mut book.items);
        if corrected > 0 {
            let migrated = book.items.clone();
            book.commit(migrated)?;
            info!(
                "event=week_key_migration module=plan status=ok corrected={corrected}"
            );
        }
        Ok(book)
    }

    /// Items bucketed under one week key.
    pub fn for_week(&self, week_key: &str) -> Vec<&WeeklyPlanItem> {
        self.items
            .iter()
            .filter(|item| item.week_key == week_key)
            .collect()
    }
}

/// Writes one collection with bounded retry on transient store errors.
pub(crate) fn persist_with_retry<T, S>(store: &S, key: CollectionKey, items: &[T]) -> StoreResult<()>
where
    T: Serialize,
    S: DocumentStore,
{
    let mut attempt = 1;
    loop {
        match save_collection(store, key, items) {
            Ok(()) => return Ok(()),
            Err(err) if err.is_transient() && attempt < PERSIST_ATTEMPTS => {
                warn!(
                    "event=plan_persist_retry module=plan status=retry collection={key} attempt={attempt} error={err}"
                );
                thread::sleep(PERSIST_BACKOFF * attempt);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
