//! Run orchestration
//!
//! Feeds each register through the transformer and the reconciler, one at
//! a time, and collects a per-record report. A bad record never stops the
//! run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::TransformError;
use crate::reconcile::{Outcome, Reconciler, SkipReason};
use crate::source::SourceRecord;
use crate::transform::RecordTransformer;

/// What happened to one register
#[derive(Debug)]
pub enum RecordResult {
    /// The register could not be transformed into a draft
    Invalid(TransformError),
    Reconciled(Outcome),
}

impl RecordResult {
    pub fn label(&self) -> &'static str {
        match self {
            RecordResult::Invalid(_) => "invalid",
            RecordResult::Reconciled(outcome) => outcome.label(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RecordResult::Reconciled(outcome) if outcome.is_failed())
    }

    /// Human-readable detail for reports
    pub fn detail(&self) -> String {
        match self {
            RecordResult::Invalid(e) => e.to_string(),
            RecordResult::Reconciled(Outcome::Created { name }) => format!("created {name}"),
            RecordResult::Reconciled(Outcome::AlreadySynchronized { name }) => {
                format!("{name} already exists")
            }
            RecordResult::Reconciled(Outcome::Skipped(SkipReason::NameReserved {
                name,
                message,
            })) => format!("{name} reserved: {message}"),
            RecordResult::Reconciled(Outcome::Failed(e)) => format_error_chain(e),
        }
    }
}

fn format_error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// One line of the report
#[derive(Debug)]
pub struct RecordReport {
    /// Register name in the source index
    pub register: String,
    pub result: RecordResult,
}

impl Serialize for RecordReport {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("RecordReport", 4)?;
        state.serialize_field("register", &self.register)?;
        state.serialize_field("outcome", self.result.label())?;
        let catalog_name = match &self.result {
            RecordResult::Reconciled(outcome) => Some(outcome.name()),
            RecordResult::Invalid(_) => None,
        };
        state.serialize_field("catalog_name", &catalog_name)?;
        state.serialize_field("detail", &self.result.detail())?;
        state.end()
    }
}

/// Counts per outcome kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub created: usize,
    pub already_synchronized: usize,
    pub skipped: usize,
    pub invalid: usize,
    pub failed: usize,
}

impl SyncSummary {
    pub fn total(&self) -> usize {
        self.created + self.already_synchronized + self.skipped + self.invalid + self.failed
    }
}

/// Per-record results of one run, in processing order
#[derive(Debug, Serialize)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub records: Vec<RecordReport>,
}

impl SyncReport {
    pub fn summary(&self) -> SyncSummary {
        let mut summary = SyncSummary::default();
        for record in &self.records {
            match &record.result {
                RecordResult::Invalid(_) => summary.invalid += 1,
                RecordResult::Reconciled(Outcome::Created { .. }) => summary.created += 1,
                RecordResult::Reconciled(Outcome::AlreadySynchronized { .. }) => {
                    summary.already_synchronized += 1
                }
                RecordResult::Reconciled(Outcome::Skipped(_)) => summary.skipped += 1,
                RecordResult::Reconciled(Outcome::Failed(_)) => summary.failed += 1,
            }
        }
        summary
    }

    pub fn has_failures(&self) -> bool {
        self.records.iter().any(|r| r.result.is_failed())
    }

    /// Outcome for a register, if it was processed
    pub fn result_for(&self, register: &str) -> Option<&RecordResult> {
        self.records
            .iter()
            .find(|r| r.register == register)
            .map(|r| &r.result)
    }
}

/// Transforms and reconciles registers sequentially
pub struct Synchronizer {
    transformer: RecordTransformer,
    reconciler: Reconciler,
}

impl Synchronizer {
    pub fn new(transformer: RecordTransformer, reconciler: Reconciler) -> Self {
        Self {
            transformer,
            reconciler,
        }
    }

    pub async fn run<I>(&self, records: I) -> SyncReport
    where
        I: IntoIterator<Item = SourceRecord>,
    {
        let started_at = Utc::now();
        let mut reports = Vec::new();

        for record in records {
            let result = match self.transformer.transform(&record) {
                Ok(draft) => RecordResult::Reconciled(self.reconciler.reconcile(draft).await),
                Err(e) => {
                    warn!("Skipping register '{}': {}", record.name, e);
                    RecordResult::Invalid(e)
                }
            };

            info!(
                register = %record.name,
                outcome = result.label(),
                "{}",
                result.detail()
            );
            reports.push(RecordReport {
                register: record.name,
                result,
            });
        }

        SyncReport {
            started_at,
            finished_at: Utc::now(),
            records: reports,
        }
    }
}
