use super::super::domain::{AssessmentPolicy, Behavior, BehaviorId, HelpContact};
use super::super::scoring::TriggeredBehaviors;
use serde::Serialize;

pub const NO_RISK_MESSAGE: &str =
    "No risk behaviors were detected. Your relationship with money looks conscious and balanced.";

pub const CRISIS_MESSAGE: &str =
    "If you are having thoughts of suicide, please reach out for immediate help.";

/// Closing advice picked from the number of triggered behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationTier {
    SmallSteps,
    ProfessionalSupport,
    SeekHelp,
}

impl RecommendationTier {
    const SMALL_STEPS_MAX: usize = 2;
    const PROFESSIONAL_SUPPORT_MAX: usize = 5;

    /// `None` when nothing was triggered; the no-risk message applies instead.
    pub const fn from_count(count: usize) -> Option<Self> {
        match count {
            0 => None,
            n if n <= Self::SMALL_STEPS_MAX => Some(Self::SmallSteps),
            n if n <= Self::PROFESSIONAL_SUPPORT_MAX => Some(Self::ProfessionalSupport),
            _ => Some(Self::SeekHelp),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::SmallSteps => "Small steps",
            Self::ProfessionalSupport => "Professional support",
            Self::SeekHelp => "Seek help",
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::SmallSteps => {
                "You are on the right track. Work on the detected behaviors with small steps."
            }
            Self::ProfessionalSupport => {
                "Several emotional patterns are affecting your financial health. Consider professional support."
            }
            Self::SeekHelp => {
                "Your relationship with money is strongly driven by emotions. Asking for help is an act of courage."
            }
        }
    }
}

/// Narrative block for one triggered behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BehaviorSection {
    pub behavior_id: BehaviorId,
    pub title: String,
    pub description: String,
    pub symptoms: String,
    pub solution: String,
}

impl From<Behavior> for BehaviorSection {
    fn from(behavior: Behavior) -> Self {
        Self {
            behavior_id: behavior.id,
            title: behavior.title,
            description: behavior.description,
            symptoms: behavior.symptoms,
            solution: behavior.solution,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedReport {
    pub sections: Vec<BehaviorSection>,
    pub recommendation: RecommendationTier,
}

impl ComposedReport {
    pub fn behavior_count(&self) -> usize {
        self.sections.len()
    }
}

/// Emergency resources shown in place of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrisisNotice {
    pub message: &'static str,
    pub emergency_contacts: Vec<HelpContact>,
}

/// What a results view displays for one answer set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssessmentOutcome {
    Crisis(CrisisNotice),
    NoRisk,
    Report(ComposedReport),
}

impl AssessmentOutcome {
    pub fn recommendation(&self) -> Option<RecommendationTier> {
        match self {
            Self::Report(report) => Some(report.recommendation),
            Self::Crisis(_) | Self::NoRisk => None,
        }
    }

    pub fn is_crisis(&self) -> bool {
        matches!(self, Self::Crisis(_))
    }
}

/// Turn triggered behaviors into the outcome shown to the user.
///
/// The crisis behavior overrides everything else and no tier is computed for it.
pub fn compose(
    triggered: TriggeredBehaviors,
    policy: &AssessmentPolicy,
    emergency_contacts: &[HelpContact],
) -> AssessmentOutcome {
    if triggered.contains(policy.crisis_behavior) {
        return AssessmentOutcome::Crisis(CrisisNotice {
            message: CRISIS_MESSAGE,
            emergency_contacts: emergency_contacts.to_vec(),
        });
    }

    let Some(recommendation) = RecommendationTier::from_count(triggered.len()) else {
        return AssessmentOutcome::NoRisk;
    };

    AssessmentOutcome::Report(ComposedReport {
        sections: triggered.into_iter().map(BehaviorSection::from).collect(),
        recommendation,
    })
}
