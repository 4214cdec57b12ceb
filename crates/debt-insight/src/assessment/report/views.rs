use super::super::domain::{HelpCategory, HelpContact, HelpDirectory};
use super::composer::{AssessmentOutcome, BehaviorSection, RecommendationTier, NO_RISK_MESSAGE};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationView {
    pub tier: RecommendationTier,
    pub label: &'static str,
    pub message: &'static str,
}

impl From<RecommendationTier> for RecommendationView {
    fn from(tier: RecommendationTier) -> Self {
        Self {
            tier,
            label: tier.label(),
            message: tier.message(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SupportCategoryView {
    pub category: HelpCategory,
    pub label: &'static str,
    pub contacts: Vec<HelpContact>,
}

/// Support resources listed below every non-crisis result.
pub fn support_resources(help: &HelpDirectory) -> Vec<SupportCategoryView> {
    HelpCategory::ordered()
        .into_iter()
        .map(|category| SupportCategoryView {
            category,
            label: category.label(),
            contacts: help.contacts(category).to_vec(),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeView {
    Crisis {
        message: &'static str,
        emergency_contacts: Vec<HelpContact>,
    },
    NoRisk {
        message: &'static str,
        support_resources: Vec<SupportCategoryView>,
    },
    Report {
        behavior_count: usize,
        sections: Vec<BehaviorSection>,
        recommendation: RecommendationView,
        support_resources: Vec<SupportCategoryView>,
    },
}

impl AssessmentOutcome {
    pub fn view(&self, help: &HelpDirectory) -> OutcomeView {
        match self {
            Self::Crisis(notice) => OutcomeView::Crisis {
                message: notice.message,
                emergency_contacts: notice.emergency_contacts.clone(),
            },
            Self::NoRisk => OutcomeView::NoRisk {
                message: NO_RISK_MESSAGE,
                support_resources: support_resources(help),
            },
            Self::Report(report) => OutcomeView::Report {
                behavior_count: report.behavior_count(),
                sections: report.sections.clone(),
                recommendation: report.recommendation.into(),
                support_resources: support_resources(help),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn no_risk_view_is_tagged_and_lists_support() {
        let help = HelpDirectory {
            emergency: Vec::new(),
            financial: vec![HelpContact {
                name: "Counsel".to_string(),
                phone: None,
                country: Some("US".to_string()),
                url: "https://counsel.example".to_string(),
            }],
            therapy: Vec::new(),
        };

        let value = serde_json::to_value(AssessmentOutcome::NoRisk.view(&help)).expect("json");
        assert_eq!(value["status"], json!("no_risk"));
        assert_eq!(value["message"], json!(NO_RISK_MESSAGE));
        assert_eq!(value["support_resources"][1]["category"], json!("financial"));
        assert_eq!(
            value["support_resources"][1]["contacts"][0]["country"],
            json!("US")
        );
    }
}
