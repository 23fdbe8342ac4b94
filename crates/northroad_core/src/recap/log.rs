//! Learning log: CRUD over the recap-tracked note collection.
//!
//! # Responsibility
//! - Own the `learnings` collection with the same optimistic persistence
//!   semantics as the plan books.
//! - Generate the spaced-repetition schedule when a note is recorded.
//!
//! # Invariants
//! - Mutations on absent ids are silent no-ops.
//! - `recap_dates` is fixed at creation; only `completed_dates` mutates.

use crate::model::learning::{Learning, LearningId};
use crate::plan::book::{persist_with_retry, WriteState};
use crate::recap::schedule::{self, RecapEntry};
use crate::store::{load_collection, CollectionKey, DocumentStore, StoreResult};
use chrono::NaiveDate;
use log::{info, warn};

/// The learnings collection bound to its document-store key.
pub struct LearningLog<S: DocumentStore> {
    store: S,
    items: Vec<Learning>,
    state: WriteState,
}

impl<S: DocumentStore> LearningLog<S> {
    /// Loads the learnings collection into a clean log.
    pub fn load(store: S) -> StoreResult<Self> {
        let items = load_collection(&store, CollectionKey::Learnings)?;
        Ok(Self {
            store,
            items,
            state: WriteState::Clean,
        })
    }

    /// Last confirmed learnings, in insertion order.
    pub fn items(&self) -> &[Learning] {
        &self.items
    }

    /// Current write state.
    pub fn state(&self) -> WriteState {
        self.state
    }

    /// Re-reads the store and returns the log to `Clean`.
    pub fn refresh(&mut self) -> StoreResult<()> {
        self.items = load_collection(&self.store, CollectionKey::Learnings)?;
        self.state = WriteState::Clean;
        Ok(())
    }

    /// Records a learning for `date` and generates its recap schedule.
    pub fn add(&mut self, content: impl Into<String>, date: NaiveDate) -> StoreResult<LearningId> {
        let mut learning = Learning::new(content, date);
        learning.recap_dates = schedule::recap_schedule(date);
        let id = learning.id;

        let mut next = self.items.clone();
        next.push(learning);
        self.commit(next)?;
        info!("event=learning_add module=recap status=ok id={id} date={date}");
        Ok(id)
    }

    /// Replaces a learning's content; silent no-op when the id is absent.
    pub fn edit_content(&mut self, id: LearningId, content: impl Into<String>) -> StoreResult<()> {
        let Some(position) = self.items.iter().position(|item| item.id == id) else {
            return Ok(());
        };
        let mut next = self.items.clone();
        next[position].content = content.into();
        self.commit(next)
    }

    /// Removes a learning; silent no-op when the id is absent.
    pub fn remove(&mut self, id: LearningId) -> StoreResult<()> {
        let next: Vec<Learning> = self
            .items
            .iter()
            .filter(|item| item.id != id)
            .cloned()
            .collect();
        if next.len() == self.items.len() {
            return Ok(());
        }
        self.commit(next)?;
        info!("event=learning_remove module=recap status=ok id={id}");
        Ok(())
    }

    /// Marks the recap occurrence `(id, date)` done or not done.
    ///
    /// Idempotent per the completion ledger rules; absent ids are silent
    /// no-ops, and an unchanged ledger skips the persist call entirely.
    pub fn set_recap_completion(
        &mut self,
        id: LearningId,
        date: NaiveDate,
        completed: bool,
    ) -> StoreResult<()> {
        let Some(position) = self.items.iter().position(|item| item.id == id) else {
            return Ok(());
        };
        let mut next = self.items.clone();
        if !schedule::mark_completion(&mut next[position], date, completed) {
            return Ok(());
        }
        self.commit(next)
    }

    /// Learnings due on `target` when viewed from `today`.
    pub fn due_on(&self, target: NaiveDate, today: NaiveDate) -> Vec<RecapEntry<'_>> {
        schedule::due_on(target, &self.items, today)
    }

    /// Learnings recorded on `date`.
    pub fn learned_on(&self, date: NaiveDate) -> Vec<&Learning> {
        schedule::learned_on(date, &self.items)
    }

    /// Count of learnings with unresolved occurrences up to `today`.
    pub fn reviews_due_count(&self, today: NaiveDate) -> usize {
        schedule::reviews_due_count(&self.items, today)
    }

    fn commit(&mut self, next: Vec<Learning>) -> StoreResult<()> {
        self.state = WriteState::PendingWrite;
        match persist_with_retry(&self.store, CollectionKey::Learnings, &next) {
            Ok(()) => {
                self.items = next;
                self.state = WriteState::Clean;
                Ok(())
            }
            Err(err) => {
                self.state = WriteState::Conflict;
                warn!("event=learning_persist module=recap status=error error={err}");
                Err(err)
            }
        }
    }
}
