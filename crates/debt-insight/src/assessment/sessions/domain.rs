use serde::Serialize;

use super::super::catalogue::Catalogue;
use super::super::domain::{AssessmentPolicy, QuestionId};
use super::super::report::{compose, AssessmentOutcome};
use super::super::scoring::{score, AnswerSet};

/// Opaque handle for one questionnaire session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

/// Which of the two screens a session is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionView {
    Survey,
    Results,
}

impl SessionView {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Survey => "Survey",
            Self::Results => "Results",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("question {0} is not part of the questionnaire")]
    UnknownQuestion(QuestionId),
    #[error("answers cannot change while results are shown")]
    SurveyClosed,
    #[error("results have not been requested yet")]
    ResultsNotShown,
}

/// Per-user questionnaire state, passed explicitly to every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentSession {
    answers: AnswerSet,
    view: SessionView,
}

impl AssessmentSession {
    /// Fresh session: every question answered "no", survey screen showing.
    pub fn new(catalogue: &Catalogue) -> Self {
        Self {
            answers: AnswerSet::for_catalogue(catalogue),
            view: SessionView::Survey,
        }
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn view(&self) -> SessionView {
        self.view
    }

    pub fn answer(&mut self, question: QuestionId, answer: bool) -> Result<(), SessionError> {
        if self.view == SessionView::Results {
            return Err(SessionError::SurveyClosed);
        }
        if self.answers.get(question).is_none() {
            return Err(SessionError::UnknownQuestion(question));
        }
        self.answers.set(question, answer);
        Ok(())
    }

    /// Switch to the results screen and compute what it displays.
    pub fn show_results(
        &mut self,
        catalogue: &Catalogue,
        policy: &AssessmentPolicy,
    ) -> AssessmentOutcome {
        self.view = SessionView::Results;
        self.evaluate(catalogue, policy)
    }

    /// Outcome of the results screen currently showing.
    pub fn outcome(
        &self,
        catalogue: &Catalogue,
        policy: &AssessmentPolicy,
    ) -> Result<AssessmentOutcome, SessionError> {
        match self.view {
            SessionView::Results => Ok(self.evaluate(catalogue, policy)),
            SessionView::Survey => Err(SessionError::ResultsNotShown),
        }
    }

    /// Back to the questionnaire, keeping the answers given so far.
    pub fn return_to_survey(&mut self) {
        self.view = SessionView::Survey;
    }

    /// Discard everything and start over.
    pub fn reset(&mut self, catalogue: &Catalogue) {
        *self = Self::new(catalogue);
    }

    fn evaluate(&self, catalogue: &Catalogue, policy: &AssessmentPolicy) -> AssessmentOutcome {
        let triggered = score(&self.answers, catalogue);
        compose(triggered, policy, &catalogue.help().emergency)
    }
}
