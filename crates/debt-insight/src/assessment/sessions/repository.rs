use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use super::super::catalogue::Catalogue;
use super::domain::{AssessmentSession, SessionId, SessionView};
use crate::assessment::domain::QuestionId;

/// Stored session together with its bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: SessionId,
    pub started_at: DateTime<Utc>,
    /// Last successful change; idle eviction is measured from here.
    pub touched_at: DateTime<Utc>,
    pub session: AssessmentSession,
}

impl SessionRecord {
    pub fn status_view(&self, catalogue: &Catalogue) -> SessionStatusView {
        let answers = self.session.answers();
        SessionStatusView {
            session_id: self.id.clone(),
            started_at: self.started_at,
            view: self.session.view(),
            view_label: self.session.view().label(),
            answered_yes: answers.yes_count(),
            questions: catalogue
                .questions()
                .iter()
                .map(|question| QuestionView {
                    id: question.id,
                    text: question.text.clone(),
                    answer: answers.is_yes(question.id),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: QuestionId,
    pub text: String,
    pub answer: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatusView {
    pub session_id: SessionId,
    pub started_at: DateTime<Utc>,
    pub view: SessionView,
    pub view_label: &'static str,
    pub answered_yes: usize,
    pub questions: Vec<QuestionView>,
}

/// Storage abstraction so the service can be exercised in isolation.
pub trait SessionStore: Send + Sync {
    fn insert(&self, record: SessionRecord) -> Result<SessionRecord, StoreError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError>;

    /// Apply `change` to the stored record as one atomic step. The record is
    /// written back only when `change` succeeds.
    fn modify<T, E, F>(&self, id: &SessionId, change: F) -> Result<T, E>
    where
        F: FnOnce(&mut SessionRecord) -> Result<T, E>,
        E: From<StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Process-local store; sessions vanish with the process or once idle longer
/// than the configured time to live.
#[derive(Debug, Default, Clone)]
pub struct InMemorySessionStore {
    records: Arc<Mutex<HashMap<SessionId, SessionRecord>>>,
    idle_ttl: Option<Duration>,
}

impl InMemorySessionStore {
    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            records: Arc::default(),
            idle_ttl: Some(idle_ttl),
        }
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<SessionId, SessionRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("session store mutex poisoned".to_string()))
    }

    fn is_expired(&self, record: &SessionRecord, now: DateTime<Utc>) -> bool {
        self.idle_ttl
            .is_some_and(|ttl| now.signed_duration_since(record.touched_at) > ttl)
    }

    /// Live records only; expired ones are dropped on the way.
    fn live<'a>(
        &self,
        guard: &'a mut HashMap<SessionId, SessionRecord>,
        id: &SessionId,
    ) -> Option<&'a mut SessionRecord> {
        let expired = guard
            .get(id)
            .is_some_and(|record| self.is_expired(record, Utc::now()));
        if expired {
            guard.remove(id);
            debug!(session = %id.0, "idle session evicted");
            return None;
        }
        guard.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, record: SessionRecord) -> Result<SessionRecord, StoreError> {
        let mut guard = self.lock()?;
        let now = Utc::now();
        let before = guard.len();
        guard.retain(|_, existing| !self.is_expired(existing, now));
        if guard.len() < before {
            debug!(evicted = before - guard.len(), "idle sessions evicted");
        }

        if guard.contains_key(&record.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        let mut guard = self.lock()?;
        Ok(self.live(&mut guard, id).cloned())
    }

    fn modify<T, E, F>(&self, id: &SessionId, change: F) -> Result<T, E>
    where
        F: FnOnce(&mut SessionRecord) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut guard = self.lock()?;
        let stored = self.live(&mut guard, id).ok_or(StoreError::NotFound)?;

        let mut draft = stored.clone();
        let value = change(&mut draft)?;
        draft.touched_at = Utc::now();
        *stored = draft;
        Ok(value)
    }
}
