mod composer;
pub mod views;

pub use composer::{
    compose, AssessmentOutcome, BehaviorSection, ComposedReport, CrisisNotice, RecommendationTier,
    CRISIS_MESSAGE, NO_RISK_MESSAGE,
};
