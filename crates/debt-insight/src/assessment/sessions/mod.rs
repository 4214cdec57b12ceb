//! Questionnaire sessions: explicit per-user state, storage, and HTTP routes.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{AssessmentSession, SessionError, SessionId, SessionView};
pub use repository::{
    InMemorySessionStore, QuestionView, SessionRecord, SessionStatusView, SessionStore,
    StoreError,
};
pub use router::{assessment_router, AnswerPayload, SKIPPED_LINES_HEADER};
pub use service::{AssessmentService, AssessmentServiceError};
