//! Task group ledger: revocable batches of AI-generated plan items.
//!
//! # Responsibility
//! - Create one group record per ingested batch and stamp its members.
//! - Cascade group deletion through the owning plan book.
//!
//! # Invariants
//! - A group is scoped to one granularity; the caller picks the matching
//!   plan book before creating it.
//! - Group/item writes are best-effort ordered (items first); readers
//!   tolerate the half-state where one write landed and the other did not.
//! - Deleting an unknown group id is a silent no-op.

use crate::model::group::{GroupSource, TaskGroup};
use crate::model::plan::{GroupId, Granularity};
use crate::plan::book::{persist_with_retry, PlanBook, PlanRecord, WriteState};
use crate::store::{load_collection, CollectionKey, DocumentStore, StoreResult};
use log::{info, warn};
use std::collections::HashSet;
use uuid::Uuid;

/// Group collection for one granularity.
pub struct TaskGroupLedger<S: DocumentStore> {
    store: S,
    key: CollectionKey,
    groups: Vec<TaskGroup>,
    state: WriteState,
}

impl<S: DocumentStore> TaskGroupLedger<S> {
    /// Loads the group collection for `granularity`.
    pub fn load(store: S, granularity: Granularity) -> StoreResult<Self> {
        let key = CollectionKey::groups_for(granularity);
        let groups = load_collection(&store, key)?;
        Ok(Self {
            store,
            key,
            groups,
            state: WriteState::Clean,
        })
    }

    /// Last confirmed groups, in creation order.
    pub fn groups(&self) -> &[TaskGroup] {
        &self.groups
    }

    /// Current write state.
    pub fn state(&self) -> WriteState {
        self.state
    }

    /// Looks a group up by id.
    pub fn get(&self, group_id: GroupId) -> Option<&TaskGroup> {
        self.groups.iter().find(|group| group.id == group_id)
    }

    /// Re-reads the group collection and returns to `Clean`.
    pub fn refresh(&mut self) -> StoreResult<()> {
        self.groups = load_collection(&self.store, self.key)?;
        self.state = WriteState::Clean;
        Ok(())
    }

    /// Creates one group from a batch of drafts: every draft gets a fresh
    /// item id and the shared group id, the batch is appended to `book`,
    /// then the group record is appended here.
    ///
    /// The two writes are intentionally best-effort: when the group write
    /// fails after the item write landed, the items stay (ungrouped half
    /// state) and the error surfaces to the caller.
    pub fn create_group<B, T>(
        &mut self,
        book: &mut PlanBook<B, T>,
        task_name: impl Into<String>,
        source: Option<GroupSource>,
        mut items: Vec<T>,
    ) -> StoreResult<GroupId>
    where
        B: DocumentStore,
        T: PlanRecord,
    {
        let group_id = TaskGroup::fresh_id();
        let mut plan_ids = Vec::with_capacity(items.len());
        for item in &mut items {
            item.assign_id(Uuid::new_v4());
            item.set_group_id(group_id);
            plan_ids.push(item.id());
        }

        book.add_batch(items)?;

        let group = TaskGroup::new(group_id, task_name, plan_ids, source);
        let mut next = self.groups.clone();
        next.push(group);
        if let Err(err) = self.commit(next) {
            warn!(
                "event=group_create module=groups status=error collection={} group_id={group_id} error={err}",
                self.key
            );
            return Err(err);
        }

        info!(
            "event=group_create module=groups status=ok collection={} group_id={group_id}",
            self.key
        );
        Ok(group_id)
    }

    /// Number of `group`'s members still present in `book`.
    pub fn active_count<B, T>(&self, group: &TaskGroup, book: &PlanBook<B, T>) -> usize
    where
        B: DocumentStore,
        T: PlanRecord,
    {
        group.active_count(&book.live_ids())
    }

    /// Removes every member item of the group from `book`, then the group
    /// record itself. Unknown group ids and already-deleted members are
    /// tolerated silently.
    pub fn delete_group<B, T>(
        &mut self,
        book: &mut PlanBook<B, T>,
        group_id: GroupId,
    ) -> StoreResult<()>
    where
        B: DocumentStore,
        T: PlanRecord,
    {
        let Some(group) = self.get(group_id) else {
            return Ok(());
        };
        let member_ids: HashSet<_> = group.plan_ids.iter().copied().collect();

        book.remove_many(&member_ids)?;

        let next: Vec<TaskGroup> = self
            .groups
            .iter()
            .filter(|group| group.id != group_id)
            .cloned()
            .collect();
        self.commit(next)?;
        info!(
            "event=group_delete module=groups status=ok collection={} group_id={group_id}",
            self.key
        );
        Ok(())
    }

    fn commit(&mut self, next: Vec<TaskGroup>) -> StoreResult<()> {
        self.state = WriteState::PendingWrite;
        match persist_with_retry(&self.store, self.key, &next) {
            Ok(()) => {
                self.groups = next;
                self.state = WriteState::Clean;
                Ok(())
            }
            Err(err) => {
                self.state = WriteState::Conflict;
                Err(err)
            }
        }
    }
}
