//! Cross-granularity ingestion of AI-proposed plan batches.
//!
//! # Responsibility
//! - Normalize proposed `(date_or_period, section, tasks)` triples into
//!   valid records for the target granularity's collection.
//! - Route every accepted batch through the task group ledger so it stays
//!   revocable as a unit.
//!
//! # Invariants
//! - Rejected proposals (missing/invalid date, empty task list, unmatched
//!   week label) are counted, never silently ignored.
//! - An all-rejected batch surfaces as `IngestError::NoValidPlans`.
//! - One `PlanningSession` covers one planning conversation and is consumed
//!   on confirm; cancelling is just dropping it.

use crate::model::group::GroupSource;
use crate::model::plan::{DaySection, GroupId, PlanItem, WeeklyPlanItem};
use crate::period::WeekDescriptor;
use crate::plan::book::PlanBook;
use crate::plan::groups::TaskGroupLedger;
use crate::store::{DocumentStore, StoreError};
use chrono::NaiveDate;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static WEEK_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)week\s*(\d+)").expect("valid week label regex"));
static MONTH_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}$").expect("valid month key regex"));
static YEAR_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}$").expect("valid year key regex"));

pub type IngestResult<T> = Result<T, IngestError>;

#[derive(Debug)]
pub enum IngestError {
    /// Every proposal in the batch was rejected during normalization.
    NoValidPlans { dropped: usize },
    Store(StoreError),
}

impl Display for IngestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoValidPlans { dropped } => {
                write!(f, "no valid plans were generated ({dropped} proposals rejected)")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for IngestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NoValidPlans { .. } => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for IngestError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Role of one chat transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One transcript entry of the planning conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// One planning conversation with the external AI collaborator.
///
/// Holds the model selection and transcript for exactly one conversation;
/// the ingest entry points consume the session on confirm, and cancelling
/// is simply dropping it.
#[derive(Debug, Clone)]
pub struct PlanningSession {
    pub model: String,
    pub transcript: Vec<ChatMessage>,
    pub start_date: NaiveDate,
    pub deadline: NaiveDate,
}

impl PlanningSession {
    pub fn new(model: impl Into<String>, start_date: NaiveDate, deadline: NaiveDate) -> Self {
        Self {
            model: model.into(),
            transcript: Vec::new(),
            start_date,
            deadline,
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.transcript.push(ChatMessage {
            role: ChatRole::User,
            content: content.into(),
        });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.transcript.push(ChatMessage {
            role: ChatRole::Assistant,
            content: content.into(),
        });
    }
}

/// One proposed bucket of tasks, as extracted by the AI collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedPlan {
    /// Date, period key or week label; free-form until normalized.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub tasks: Vec<String>,
}

/// Extraction output shape consumed from the AI collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResponse {
    pub plans: Vec<ProposedPlan>,
}

/// Outcome of one ingested batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    pub group_id: GroupId,
    /// Plan items created from accepted proposals.
    pub accepted: usize,
    /// Proposals rejected during normalization.
    pub dropped: usize,
}

/// Ingests a batch into the daily collection.
///
/// Sections are normalized to the four day sections (unknown labels default
/// to morning); dates must be valid `YYYY-MM-DD`.
pub fn ingest_daily<L, B>(
    session: PlanningSession,
    response: ExtractionResponse,
    ledger: &mut TaskGroupLedger<L>,
    book: &mut PlanBook<B, PlanItem>,
    task_name: impl Into<String>,
    source: GroupSource,
) -> IngestResult<IngestReport>
where
    L: DocumentStore,
    B: DocumentStore,
{
    let mut drafts = Vec::new();
    let mut dropped = 0;

    for proposal in &response.plans {
        let Some(date) = normalize_daily_date(&proposal.date) else {
            dropped += 1;
            continue;
        };
        let section = DaySection::normalize(proposal.section.as_deref().unwrap_or(""));
        if !collect_tasks(proposal, &mut drafts, |content| {
            PlanItem::new(section.as_str(), content, date.clone())
        }) {
            dropped += 1;
        }
    }

    finish_ingest(session, drafts, dropped, ledger, book, task_name, source)
}

/// Ingests a batch into the monthly collection; dates truncate to `YYYY-MM`.
pub fn ingest_monthly<L, B>(
    session: PlanningSession,
    response: ExtractionResponse,
    ledger: &mut TaskGroupLedger<L>,
    book: &mut PlanBook<B, PlanItem>,
    task_name: impl Into<String>,
    source: GroupSource,
) -> IngestResult<IngestReport>
where
    L: DocumentStore,
    B: DocumentStore,
{
    ingest_period(
        session, response, ledger, book, task_name, source,
        normalize_monthly_date,
    )
}

/// Ingests a batch into the yearly collection; dates truncate to `YYYY`.
pub fn ingest_yearly<L, B>(
    session: PlanningSession,
    response: ExtractionResponse,
    ledger: &mut TaskGroupLedger<L>,
    book: &mut PlanBook<B, PlanItem>,
    task_name: impl Into<String>,
    source: GroupSource,
) -> IngestResult<IngestReport>
where
    L: DocumentStore,
    B: DocumentStore,
{
    ingest_period(
        session, response, ledger, book, task_name, source,
        normalize_yearly_date,
    )
}

/// Ingests a batch into the weekly collection.
///
/// Proposed `"Week N"` labels resolve against the ordered week descriptors
/// of the active month; unmatched labels are dropped and counted.
pub fn ingest_weekly<L, B>(
    session: PlanningSession,
    response: ExtractionResponse,
    ledger: &mut TaskGroupLedger<L>,
    book: &mut PlanBook<B, WeeklyPlanItem>,
    weeks: &[WeekDescriptor],
    task_name: impl Into<String>,
    source: GroupSource,
) -> IngestResult<IngestReport>
where
    L: DocumentStore,
    B: DocumentStore,
{
    let mut drafts = Vec::new();
    let mut dropped = 0;

    for proposal in &response.plans {
        let Some(week) = resolve_week_label(&proposal.date, weeks) else {
            dropped += 1;
            continue;
        };
        if !collect_tasks(proposal, &mut drafts, |content| {
            WeeklyPlanItem::new(content, week.start, week.end)
        }) {
            dropped += 1;
        }
    }

    finish_ingest(session, drafts, dropped, ledger, book, task_name, source)
}

/// Resolves a proposed `"Week N"` label to the N-th descriptor, 1-based.
pub fn resolve_week_label<'a>(
    label: &str,
    weeks: &'a [WeekDescriptor],
) -> Option<&'a WeekDescriptor> {
    let captures = WEEK_LABEL_RE.captures(label)?;
    let number: usize = captures.get(1)?.as_str().parse().ok()?;
    number
        .checked_sub(1)
        .and_then(|index| weeks.get(index))
}

/// Validates a proposed daily date, `YYYY-MM-DD`.
pub fn normalize_daily_date(value: &str) -> Option<String> {
    let trimmed = value.trim();
    trimmed
        .parse::<NaiveDate>()
        .ok()
        .map(|_| trimmed.to_string())
}

/// Truncates a proposed date to its `YYYY-MM` prefix.
pub fn normalize_monthly_date(value: &str) -> Option<String> {
    let truncated: String = value.trim().chars().take(7).collect();
    MONTH_KEY_RE.is_match(&truncated).then_some(truncated)
}

/// Truncates a proposed date to its four-digit year prefix.
pub fn normalize_yearly_date(value: &str) -> Option<String> {
    let truncated: String = value.trim().chars().take(4).collect();
    YEAR_KEY_RE.is_match(&truncated).then_some(truncated)
}

fn ingest_period<L, B>(
    session: PlanningSession,
    response: ExtractionResponse,
    ledger: &mut TaskGroupLedger<L>,
    book: &mut PlanBook<B, PlanItem>,
    task_name: impl Into<String>,
    source: GroupSource,
    normalize_date: fn(&str) -> Option<String>,
) -> IngestResult<IngestReport>
where
    L: DocumentStore,
    B: DocumentStore,
{
    let mut drafts = Vec::new();
    let mut dropped = 0;

    for proposal in &response.plans {
        let Some(date) = normalize_date(&proposal.date) else {
            dropped += 1;
            continue;
        };
        // Monthly/yearly sections are free labels; keep the trimmed proposal.
        let section = proposal
            .section
            .as_deref()
            .map(str::trim)
            .unwrap_or("")
            .to_string();
        if !collect_tasks(proposal, &mut drafts, |content| {
            PlanItem::new(section.clone(), content, date.clone())
        }) {
            dropped += 1;
        }
    }

    finish_ingest(session, drafts, dropped, ledger, book, task_name, source)
}

/// Pushes one draft per non-empty task; returns whether the proposal
/// contributed anything.
fn collect_tasks<T>(
    proposal: &ProposedPlan,
    drafts: &mut Vec<T>,
    mut build: impl FnMut(String) -> T,
) -> bool {
    let before = drafts.len();
    for task in &proposal.tasks {
        let content = task.trim();
        if !content.is_empty() {
            drafts.push(build(content.to_string()));
        }
    }
    drafts.len() > before
}

fn finish_ingest<L, B, T>(
    session: PlanningSession,
    drafts: Vec<T>,
    dropped: usize,
    ledger: &mut TaskGroupLedger<L>,
    book: &mut PlanBook<B, T>,
    task_name: impl Into<String>,
    source: GroupSource,
) -> IngestResult<IngestReport>
where
    L: DocumentStore,
    B: DocumentStore,
    T: crate::plan::book::PlanRecord,
{
    if drafts.is_empty() {
        warn!(
            "event=ingest module=ingest status=rejected model={} dropped={dropped}",
            session.model
        );
        return Err(IngestError::NoValidPlans { dropped });
    }

    let accepted = drafts.len();
    let group_id = ledger.create_group(book, task_name, Some(source), drafts)?;
    info!(
        "event=ingest module=ingest status=ok model={} group_id={group_id} accepted={accepted} dropped={dropped}",
        session.model
    );
    // The session is consumed here; its transcript dies with the confirm.
    drop(session);

    Ok(IngestReport {
        group_id,
        accepted,
        dropped,
    })
}

#[cfg(test)]
mod tests {
    use super::{
        normalize_daily_date, normalize_monthly_date, normalize_yearly_date, resolve_week_label,
    };
    use crate::period::weeks_in_month;

    #[test]
    fn monthly_dates_truncate_to_month_key() {
        assert_eq!(
            normalize_monthly_date("2025-07-15").as_deref(),
            Some("2025-07")
        );
        assert_eq!(normalize_monthly_date("2025-07").as_deref(), Some("2025-07"));
        assert_eq!(normalize_monthly_date("Week 2"), None);
    }

    #[test]
    fn yearly_dates_truncate_to_year() {
        assert_eq!(normalize_yearly_date("2026-03-01").as_deref(), Some("2026"));
        assert_eq!(normalize_yearly_date("soon"), None);
    }

    #[test]
    fn daily_dates_must_parse() {
        assert_eq!(
            normalize_daily_date(" 2025-06-10 ").as_deref(),
            Some("2025-06-10")
        );
        assert_eq!(normalize_daily_date("2025-13-40"), None);
        assert_eq!(normalize_daily_date(""), None);
    }

    #[test]
    fn week_labels_resolve_case_insensitively() {
        let weeks = weeks_in_month(2025, 6);
        let week = resolve_week_label("week 2", &weeks).expect("week 2 exists");
        assert_eq!(week.number, 2);
        assert!(resolve_week_label("Week 99", &weeks).is_none());
        assert!(resolve_week_label("next month", &weeks).is_none());
        assert!(resolve_week_label("Week 0", &weeks).is_none());
    }
}
