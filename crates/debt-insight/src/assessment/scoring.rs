use super::catalogue::Catalogue;
use super::domain::{Behavior, BehaviorId, QuestionId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Yes/no answers keyed by question id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<QuestionId, bool>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// One "no" per catalogue question, the state a fresh questionnaire starts in.
    pub fn for_catalogue(catalogue: &Catalogue) -> Self {
        Self(
            catalogue
                .questions()
                .iter()
                .map(|question| (question.id, false))
                .collect(),
        )
    }

    pub fn set(&mut self, question: QuestionId, answer: bool) {
        self.0.insert(question, answer);
    }

    pub fn get(&self, question: QuestionId) -> Option<bool> {
        self.0.get(&question).copied()
    }

    pub fn is_yes(&self, question: QuestionId) -> bool {
        self.get(question).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, bool)> + '_ {
        self.0.iter().map(|(id, answer)| (*id, *answer))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn yes_count(&self) -> usize {
        self.0.values().filter(|answer| **answer).count()
    }
}

impl FromIterator<(QuestionId, bool)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (QuestionId, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Behaviors triggered by an answer set, in first-encountered question order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggeredBehaviors {
    behaviors: Vec<Behavior>,
}

impl TriggeredBehaviors {
    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    pub fn contains(&self, id: BehaviorId) -> bool {
        self.behaviors.iter().any(|behavior| behavior.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Behavior> {
        self.behaviors.iter()
    }

    pub fn ids(&self) -> Vec<BehaviorId> {
        self.behaviors.iter().map(|behavior| behavior.id).collect()
    }
}

impl FromIterator<Behavior> for TriggeredBehaviors {
    fn from_iter<I: IntoIterator<Item = Behavior>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        Self {
            behaviors: iter
                .into_iter()
                .filter(|behavior| seen.insert(behavior.id))
                .collect(),
        }
    }
}

impl IntoIterator for TriggeredBehaviors {
    type Item = Behavior;
    type IntoIter = std::vec::IntoIter<Behavior>;

    fn into_iter(self) -> Self::IntoIter {
        self.behaviors.into_iter()
    }
}

/// Union of the behaviors mapped by every "yes" answer.
///
/// Questions are walked in catalogue order so the result does not depend on
/// the order answers were recorded. Behavior ids missing from the catalogue
/// are skipped.
pub fn score(answers: &AnswerSet, catalogue: &Catalogue) -> TriggeredBehaviors {
    let mut seen = HashSet::new();
    let mut behaviors = Vec::new();

    for question in catalogue.questions() {
        if !answers.is_yes(question.id) {
            continue;
        }
        for id in catalogue.behaviors_for(question.id) {
            let Some(behavior) = catalogue.behavior(*id) else {
                continue;
            };
            if seen.insert(*id) {
                behaviors.push(behavior.clone());
            }
        }
    }

    TriggeredBehaviors { behaviors }
}
