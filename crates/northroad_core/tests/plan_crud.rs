use northroad_core::db::migrations::latest_version;
use northroad_core::{
    CollectionKey, DocumentStore, PlanBook, PlanItem, SqliteDocumentStore, StoreError, WriteState,
};
use std::cell::Cell;

/// Store double that can be switched into a failing-writes mode.
struct FailingStore {
    inner: SqliteDocumentStore,
    fail_writes: Cell<bool>,
}

impl FailingStore {
    fn new() -> Self {
        Self {
            inner: SqliteDocumentStore::open_in_memory().unwrap(),
            fail_writes: Cell::new(false),
        }
    }
}

impl DocumentStore for FailingStore {
    fn read_document(&self, key: CollectionKey) -> Result<Option<String>, StoreError> {
        self.inner.read_document(key)
    }

    fn write_document(&self, key: CollectionKey, body: &str) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Unavailable("injected outage".to_string()));
        }
        self.inner.write_document(key, body)
    }
}

#[test]
fn schema_is_migrated_on_open() {
    assert!(latest_version() >= 1);
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    // A fresh database reads every collection as empty.
    assert!(store.read_document(CollectionKey::DailyPlans).unwrap().is_none());
}

#[test]
fn add_toggle_edit_remove_roundtrip() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    let mut book: PlanBook<_, PlanItem> =
        PlanBook::load(&store, CollectionKey::DailyPlans).unwrap();

    let id = book
        .add(PlanItem::new("morning", "review ownership", "2025-06-10"))
        .unwrap();
    assert_eq!(book.items().len(), 1);

    book.toggle(id, true).unwrap();
    assert!(book.items()[0].completed);

    book.edit(id, "review ownership and borrowing").unwrap();
    assert_eq!(book.items()[0].content, "review ownership and borrowing");

    book.remove(id).unwrap();
    assert!(book.items().is_empty());
}

#[test]
fn mutations_on_absent_ids_are_silent_noops() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    let mut book: PlanBook<_, PlanItem> =
        PlanBook::load(&store, CollectionKey::DailyPlans).unwrap();
    book.add(PlanItem::new("evening", "read a chapter", "2025-06-10"))
        .unwrap();
    let before = book.items().to_vec();

    let ghost = uuid::Uuid::new_v4();
    book.toggle(ghost, true).unwrap();
    book.edit(ghost, "never lands").unwrap();
    book.remove(ghost).unwrap();

    assert_eq!(book.items(), before.as_slice());
    assert_eq!(book.state(), WriteState::Clean);
}

#[test]
fn add_then_remove_restores_prior_content() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    let mut book: PlanBook<_, PlanItem> =
        PlanBook::load(&store, CollectionKey::MonthlyPlans).unwrap();
    book.add(PlanItem::new("", "ship the report", "2025-06")).unwrap();
    let before = book.items().to_vec();

    let id = book
        .add(PlanItem::new("", "temporary item", "2025-06"))
        .unwrap();
    book.remove(id).unwrap();

    assert_eq!(book.items(), before.as_slice());
}

#[test]
fn filter_matches_period_and_optional_section() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    let mut book: PlanBook<_, PlanItem> =
        PlanBook::load(&store, CollectionKey::DailyPlans).unwrap();
    book.add(PlanItem::new("morning", "first", "2025-06-10")).unwrap();
    book.add(PlanItem::new("evening", "second", "2025-06-10")).unwrap();
    book.add(PlanItem::new("morning", "other day", "2025-06-11")).unwrap();

    let day = book.for_period("2025-06-10", None);
    assert_eq!(day.len(), 2);
    // Insertion order is preserved.
    assert_eq!(day[0].content, "first");

    let morning = book.for_period("2025-06-10", Some("morning"));
    assert_eq!(morning.len(), 1);
    assert_eq!(morning[0].content, "first");

    assert!(book.for_period("2025-06-12", None).is_empty());
}

#[test]
fn collections_survive_a_reload() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    let mut book: PlanBook<_, PlanItem> =
        PlanBook::load(&store, CollectionKey::YearlyPlans).unwrap();
    book.add(PlanItem::new("", "run a marathon", "2026")).unwrap();

    let reloaded: PlanBook<_, PlanItem> =
        PlanBook::load(&store, CollectionKey::YearlyPlans).unwrap();
    assert_eq!(reloaded.items(), book.items());
}

#[test]
fn file_backed_store_survives_a_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("northroad.db");

    {
        let store = SqliteDocumentStore::open(&path).unwrap();
        let mut book: PlanBook<_, PlanItem> =
            PlanBook::load(&store, CollectionKey::DailyPlans).unwrap();
        book.add(PlanItem::new("morning", "survive a restart", "2025-06-10"))
            .unwrap();
    }

    // A second open migrates nothing and reads the same collection back.
    let store = SqliteDocumentStore::open(&path).unwrap();
    let book: PlanBook<_, PlanItem> = PlanBook::load(&store, CollectionKey::DailyPlans).unwrap();
    assert_eq!(book.items().len(), 1);
    assert_eq!(book.items()[0].content, "survive a restart");
}

#[test]
fn failed_persist_keeps_last_confirmed_state() {
    let store = FailingStore::new();
    let mut book: PlanBook<_, PlanItem> =
        PlanBook::load(&store, CollectionKey::DailyPlans).unwrap();
    book.add(PlanItem::new("morning", "confirmed", "2025-06-10"))
        .unwrap();

    store.fail_writes.set(true);
    let err = book
        .add(PlanItem::new("morning", "never confirmed", "2025-06-10"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));

    // The optimistic candidate was discarded, the book is in conflict.
    assert_eq!(book.items().len(), 1);
    assert_eq!(book.items()[0].content, "confirmed");
    assert_eq!(book.state(), WriteState::Conflict);

    // Conflict recovery: re-read the store and continue.
    store.fail_writes.set(false);
    book.refresh().unwrap();
    assert_eq!(book.state(), WriteState::Clean);
    assert_eq!(book.items().len(), 1);
    book.add(PlanItem::new("morning", "after recovery", "2025-06-10"))
        .unwrap();
    assert_eq!(book.items().len(), 2);
}
