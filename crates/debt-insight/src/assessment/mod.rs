//! Questionnaire scoring and report composition.

pub mod catalogue;
pub mod domain;
pub mod report;
pub mod scoring;
pub mod sessions;

pub use catalogue::{Catalogue, CatalogueError, CatalogueFile};
pub use domain::{
    AssessmentPolicy, Behavior, BehaviorId, HelpCategory, HelpContact, HelpDirectory, Question,
    QuestionId,
};
pub use report::{AssessmentOutcome, ComposedReport, RecommendationTier};
pub use scoring::{score, AnswerSet, TriggeredBehaviors};
