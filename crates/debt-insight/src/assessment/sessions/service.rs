use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use super::super::catalogue::Catalogue;
use super::super::domain::{AssessmentPolicy, QuestionId};
use super::super::report::AssessmentOutcome;
use super::domain::{AssessmentSession, SessionError, SessionId};
use super::repository::{SessionRecord, SessionStore, StoreError};
use crate::export::{ExportError, ExportedReport, ReportExporter};

/// Service composing the shared catalogue, the session store, and the exporter.
pub struct AssessmentService<S> {
    catalogue: Arc<Catalogue>,
    policy: AssessmentPolicy,
    store: Arc<S>,
    exporter: ReportExporter,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("session-{id:06}"))
}

impl<S> AssessmentService<S>
where
    S: SessionStore + 'static,
{
    pub fn new(
        catalogue: Arc<Catalogue>,
        policy: AssessmentPolicy,
        store: Arc<S>,
        exporter: ReportExporter,
    ) -> Self {
        if catalogue.behavior(policy.crisis_behavior).is_none() {
            warn!(
                crisis_behavior = %policy.crisis_behavior,
                "crisis behavior is not in the catalogue; the emergency override can never trigger"
            );
        }
        Self {
            catalogue,
            policy,
            store,
            exporter,
        }
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn policy(&self) -> AssessmentPolicy {
        self.policy
    }

    /// Open a new session on the survey screen.
    pub fn start(&self) -> Result<SessionRecord, AssessmentServiceError> {
        let now = Utc::now();
        let record = SessionRecord {
            id: next_session_id(),
            started_at: now,
            touched_at: now,
            session: AssessmentSession::new(&self.catalogue),
        };
        let stored = self.store.insert(record)?;
        info!(session = %stored.id.0, "assessment session started");
        Ok(stored)
    }

    pub fn get(&self, id: &SessionId) -> Result<SessionRecord, AssessmentServiceError> {
        let record = self.store.fetch(id)?.ok_or(StoreError::NotFound)?;
        Ok(record)
    }

    pub fn answer(
        &self,
        id: &SessionId,
        question: QuestionId,
        answer: bool,
    ) -> Result<SessionRecord, AssessmentServiceError> {
        self.store.modify(
            id,
            |record: &mut SessionRecord| -> Result<SessionRecord, AssessmentServiceError> {
                record.session.answer(question, answer)?;
                Ok(record.clone())
            },
        )
    }

    /// Move to the results screen and return what it shows.
    pub fn show_results(&self, id: &SessionId) -> Result<AssessmentOutcome, AssessmentServiceError> {
        let outcome = self.store.modify(
            id,
            |record: &mut SessionRecord| -> Result<AssessmentOutcome, AssessmentServiceError> {
                Ok(record.session.show_results(&self.catalogue, &self.policy))
            },
        )?;

        match &outcome {
            AssessmentOutcome::Crisis(_) => {
                warn!(session = %id.0, "crisis behavior detected; showing emergency resources")
            }
            AssessmentOutcome::NoRisk => info!(session = %id.0, "no risk behaviors detected"),
            AssessmentOutcome::Report(report) => info!(
                session = %id.0,
                behaviors = report.behavior_count(),
                tier = report.recommendation.label(),
                "assessment report composed"
            ),
        }
        Ok(outcome)
    }

    pub fn return_to_survey(&self, id: &SessionId) -> Result<SessionRecord, AssessmentServiceError> {
        self.store.modify(
            id,
            |record: &mut SessionRecord| -> Result<SessionRecord, AssessmentServiceError> {
                record.session.return_to_survey();
                Ok(record.clone())
            },
        )
    }

    /// Replace the session with a fresh one under the same id.
    pub fn reset(&self, id: &SessionId) -> Result<SessionRecord, AssessmentServiceError> {
        let record = self.store.modify(
            id,
            |record: &mut SessionRecord| -> Result<SessionRecord, AssessmentServiceError> {
                record.session.reset(&self.catalogue);
                record.started_at = Utc::now();
                Ok(record.clone())
            },
        )?;
        info!(session = %id.0, "assessment session reset");
        Ok(record)
    }

    /// Render the results currently shown as a paginated document.
    pub fn export(
        &self,
        id: &SessionId,
        date: NaiveDate,
    ) -> Result<ExportedReport, AssessmentServiceError> {
        let record = self.get(id)?;
        let outcome = record.session.outcome(&self.catalogue, &self.policy)?;
        let exported = self.exporter.export(&outcome, self.catalogue.help(), date)?;
        if !exported.failures.is_empty() {
            warn!(
                session = %id.0,
                skipped = exported.failures.len(),
                "report exported with skipped lines"
            );
        }
        Ok(exported)
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
