use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a questionnaire entry as it appears in the catalogue files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub u32);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a behavior catalogue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BehaviorId(pub u32);

impl fmt::Display for BehaviorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(alias = "texto")]
    pub text: String,
}

/// Narrative catalogue entry shown when a behavior is triggered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Behavior {
    #[serde(default = "unassigned_behavior")]
    pub id: BehaviorId,
    #[serde(alias = "titulo")]
    pub title: String,
    #[serde(alias = "descripcion")]
    pub description: String,
    #[serde(alias = "sintomas")]
    pub symptoms: String,
    #[serde(alias = "solucion")]
    pub solution: String,
}

// Catalogue files key behaviors by id, so the body usually omits it; the
// loader stamps the key back in.
fn unassigned_behavior() -> BehaviorId {
    BehaviorId(0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpContact {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "telefono", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, alias = "pais", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(alias = "web")]
    pub url: String,
}

impl HelpContact {
    /// One-line listing used by both the terminal report and the exported document.
    pub fn listing(&self) -> String {
        let mut line = self.name.clone();
        if let Some(country) = &self.country {
            line.push_str(&format!(" ({country})"));
        }
        if let Some(phone) = &self.phone {
            line.push_str(&format!(": {phone}"));
        }
        line.push_str(&format!(" - {}", self.url));
        line
    }
}

/// Static support resources appended to every report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpDirectory {
    #[serde(default, alias = "emergencia")]
    pub emergency: Vec<HelpContact>,
    #[serde(default, alias = "financiero")]
    pub financial: Vec<HelpContact>,
    #[serde(default, alias = "terapia")]
    pub therapy: Vec<HelpContact>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HelpCategory {
    Emergency,
    Financial,
    Therapy,
}

impl HelpCategory {
    pub const fn ordered() -> [Self; 3] {
        [Self::Emergency, Self::Financial, Self::Therapy]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Emergency => "Emotional emergency lines",
            Self::Financial => "Financial counseling",
            Self::Therapy => "Therapy and mental health",
        }
    }
}

impl HelpDirectory {
    pub fn contacts(&self, category: HelpCategory) -> &[HelpContact] {
        match category {
            HelpCategory::Emergency => &self.emergency,
            HelpCategory::Financial => &self.financial,
            HelpCategory::Therapy => &self.therapy,
        }
    }

    pub fn len(&self) -> usize {
        self.emergency.len() + self.financial.len() + self.therapy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Control-flow policy layered on top of the catalogue content.
///
/// The crisis behavior couples a catalogue entry to an override of the whole
/// report. It is never inferred from catalogue text; deployments whose
/// catalogue numbers the crisis entry differently must configure it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssessmentPolicy {
    pub crisis_behavior: BehaviorId,
}

impl AssessmentPolicy {
    pub const DEFAULT_CRISIS_BEHAVIOR: BehaviorId = BehaviorId(5);
}

impl Default for AssessmentPolicy {
    fn default() -> Self {
        Self {
            crisis_behavior: Self::DEFAULT_CRISIS_BEHAVIOR,
        }
    }
}
