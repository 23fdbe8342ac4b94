use chrono::NaiveDate;
use northroad_core::ingest::{ingest_daily, ingest_monthly, ingest_weekly};
use northroad_core::period::weeks_in_month;
use northroad_core::{
    CollectionKey, ExtractionResponse, Granularity, GroupSource, IngestError, PlanBook,
    PlanningSession, ProposedPlan, SqliteDocumentStore, TaskGroupLedger, WeeklyPlanItem,
};

fn date(text: &str) -> NaiveDate {
    text.parse().expect("test date should parse")
}

fn session() -> PlanningSession {
    let mut session = PlanningSession::new("test-model", date("2025-06-10"), date("2025-07-10"));
    session.push_user("help me plan the month");
    session.push_assistant("here is a draft");
    session
}

fn proposal(date: &str, section: Option<&str>, tasks: &[&str]) -> ProposedPlan {
    ProposedPlan {
        date: date.to_string(),
        section: section.map(str::to_string),
        tasks: tasks.iter().map(|t| t.to_string()).collect(),
    }
}

#[test]
fn daily_ingest_normalizes_sections_and_groups_the_batch() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    let mut book = PlanBook::load(&store, CollectionKey::DailyPlans).unwrap();
    let mut ledger = TaskGroupLedger::load(&store, Granularity::Daily).unwrap();

    let response = ExtractionResponse {
        plans: vec![
            proposal("2025-06-10", Some(" Evening "), &["stretch", "  ", "read"]),
            proposal("2025-06-11", None, &["write summary"]),
            proposal("not a date", Some("morning"), &["lost"]),
        ],
    };

    let report = ingest_daily(
        session(),
        response,
        &mut ledger,
        &mut book,
        "Wind-down routine",
        GroupSource::Assistant,
    )
    .unwrap();

    assert_eq!(report.accepted, 3);
    assert_eq!(report.dropped, 1);
    assert_eq!(book.items().len(), 3);

    let evening = book.for_period("2025-06-10", Some("evening"));
    assert_eq!(evening.len(), 2);
    // An absent section defaults to morning.
    let defaulted = book.for_period("2025-06-11", Some("morning"));
    assert_eq!(defaulted.len(), 1);
    assert_eq!(defaulted[0].content, "write summary");

    // Every created item carries the batch group.
    for item in book.items() {
        assert_eq!(item.group_id, Some(report.group_id));
    }
    let group = ledger.get(report.group_id).unwrap();
    assert_eq!(group.task_name, "Wind-down routine");
    assert_eq!(group.plan_ids.len(), 3);
}

#[test]
fn monthly_ingest_truncates_full_dates_to_month_keys() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    let mut book = PlanBook::load(&store, CollectionKey::MonthlyPlans).unwrap();
    let mut ledger = TaskGroupLedger::load(&store, Granularity::Monthly).unwrap();

    let response = ExtractionResponse {
        plans: vec![
            proposal("2025-07-15", None, &["outline the report"]),
            proposal("2025-08", None, &["collect feedback"]),
        ],
    };

    let report = ingest_monthly(
        session(),
        response,
        &mut ledger,
        &mut book,
        "Quarterly report",
        GroupSource::Assistant,
    )
    .unwrap();

    assert_eq!(report.accepted, 2);
    assert_eq!(report.dropped, 0);
    assert_eq!(book.for_period("2025-07", None).len(), 1);
    assert_eq!(book.for_period("2025-08", None).len(), 1);
}

#[test]
fn weekly_ingest_resolves_labels_and_drops_unmatched_ones() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    let mut book: PlanBook<_, WeeklyPlanItem> = PlanBook::load_weekly(&store).unwrap();
    let mut ledger = TaskGroupLedger::load(&store, Granularity::Weekly).unwrap();
    let weeks = weeks_in_month(2025, 6);

    let response = ExtractionResponse {
        plans: vec![
            proposal("Week 1", None, &["set up the project"]),
            proposal("week 2", None, &["first prototype"]),
            proposal("Week 99", None, &["beyond the month"]),
        ],
    };

    let report = ingest_weekly(
        session(),
        response,
        &mut ledger,
        &mut book,
        &weeks,
        "Prototype sprint",
        GroupSource::Breakdown,
    )
    .unwrap();

    assert_eq!(report.accepted, 2);
    assert_eq!(report.dropped, 1);

    let first_week = book.for_week(&weeks[0].key());
    assert_eq!(first_week.len(), 1);
    assert_eq!(first_week[0].content, "set up the project");
    assert_eq!(first_week[0].group_id, Some(report.group_id));
}

#[test]
fn all_rejected_batch_creates_nothing() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    let mut book = PlanBook::load(&store, CollectionKey::DailyPlans).unwrap();
    let mut ledger = TaskGroupLedger::load(&store, Granularity::Daily).unwrap();

    let response = ExtractionResponse {
        plans: vec![
            proposal("someday", None, &["never lands"]),
            proposal("2025-06-10", None, &["", "   "]),
        ],
    };

    let err = ingest_daily(
        session(),
        response,
        &mut ledger,
        &mut book,
        "Empty batch",
        GroupSource::Assistant,
    )
    .unwrap_err();

    assert!(matches!(err, IngestError::NoValidPlans { dropped: 2 }));
    assert!(book.items().is_empty());
    assert!(ledger.groups().is_empty());
}

#[test]
fn ingested_batches_are_revocable_as_a_unit() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    let mut book = PlanBook::load(&store, CollectionKey::DailyPlans).unwrap();
    let mut ledger = TaskGroupLedger::load(&store, Granularity::Daily).unwrap();

    // A manual item entered outside the batch must survive revocation.
    let manual = book
        .add(northroad_core::PlanItem::new("morning", "keep me", "2025-06-10"))
        .unwrap();

    let response = ExtractionResponse {
        plans: vec![proposal("2025-06-10", None, &["step one", "step two"])],
    };
    let report = ingest_daily(
        session(),
        response,
        &mut ledger,
        &mut book,
        "Revocable batch",
        GroupSource::Assistant,
    )
    .unwrap();
    assert_eq!(book.items().len(), 3);

    ledger.delete_group(&mut book, report.group_id).unwrap();
    assert_eq!(book.items().len(), 1);
    assert_eq!(book.items()[0].id, manual);
    assert!(ledger.get(report.group_id).is_none());
}
