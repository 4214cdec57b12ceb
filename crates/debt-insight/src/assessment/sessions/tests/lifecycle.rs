use super::common::*;
use crate::assessment::domain::{AssessmentPolicy, QuestionId};
use crate::assessment::report::{AssessmentOutcome, RecommendationTier};
use crate::assessment::sessions::domain::{AssessmentSession, SessionError, SessionView};

#[test]
fn new_session_answers_every_question_no() {
    let catalogue = catalogue();
    let session = AssessmentSession::new(&catalogue);

    assert_eq!(session.view(), SessionView::Survey);
    assert_eq!(session.answers().len(), catalogue.questions().len());
    assert_eq!(session.answers().yes_count(), 0);
}

#[test]
fn unknown_questions_are_rejected() {
    let catalogue = catalogue();
    let mut session = AssessmentSession::new(&catalogue);

    assert_eq!(
        session.answer(QuestionId(400), true),
        Err(SessionError::UnknownQuestion(QuestionId(400)))
    );
}

#[test]
fn all_no_shows_no_risk() {
    let catalogue = catalogue();
    let mut session = AssessmentSession::new(&catalogue);

    let outcome = session.show_results(&catalogue, &AssessmentPolicy::default());
    assert_eq!(outcome, AssessmentOutcome::NoRisk);
    assert_eq!(session.view(), SessionView::Results);
}

#[test]
fn crisis_answer_wins_regardless_of_other_answers() {
    let catalogue = catalogue();
    let mut session = AssessmentSession::new(&catalogue);
    for question in catalogue.questions() {
        session.answer(question.id, true).expect("known question");
    }

    let outcome = session.show_results(&catalogue, &AssessmentPolicy::default());
    match outcome {
        AssessmentOutcome::Crisis(notice) => {
            assert_eq!(notice.emergency_contacts, help().emergency);
        }
        other => panic!("expected crisis outcome, got {other:?}"),
    }
}

#[test]
fn answers_are_frozen_while_results_show() {
    let catalogue = catalogue();
    let mut session = AssessmentSession::new(&catalogue);
    session.show_results(&catalogue, &AssessmentPolicy::default());

    assert_eq!(
        session.answer(QuestionId(1), true),
        Err(SessionError::SurveyClosed)
    );

    session.return_to_survey();
    session.answer(QuestionId(1), true).expect("survey reopened");
    let outcome = session.show_results(&catalogue, &AssessmentPolicy::default());
    assert_eq!(
        outcome.recommendation(),
        Some(RecommendationTier::SmallSteps)
    );
}

#[test]
fn return_to_survey_keeps_answers_and_reset_clears_them() {
    let catalogue = catalogue();
    let mut session = AssessmentSession::new(&catalogue);
    session.answer(QuestionId(2), true).expect("known question");
    session.show_results(&catalogue, &AssessmentPolicy::default());

    session.return_to_survey();
    assert_eq!(session.view(), SessionView::Survey);
    assert!(session.answers().is_yes(QuestionId(2)));
    assert_eq!(
        session.outcome(&catalogue, &AssessmentPolicy::default()),
        Err(SessionError::ResultsNotShown)
    );

    session.reset(&catalogue);
    assert_eq!(session, AssessmentSession::new(&catalogue));
}
