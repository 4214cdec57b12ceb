use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::assessment::catalogue::Catalogue;
use crate::assessment::domain::{
    AssessmentPolicy, Behavior, BehaviorId, HelpContact, HelpDirectory, Question, QuestionId,
};
use crate::assessment::sessions::domain::SessionId;
use crate::assessment::sessions::repository::{
    InMemorySessionStore, SessionRecord, SessionStore, StoreError,
};
use crate::assessment::sessions::{assessment_router, AssessmentService};
use crate::export::ReportExporter;

pub(super) const CRISIS_QUESTION: QuestionId = QuestionId(4);

fn behavior(id: u32) -> (BehaviorId, Behavior) {
    (
        BehaviorId(id),
        Behavior {
            id: BehaviorId(id),
            title: format!("Behavior {id}"),
            description: format!("Description of behavior {id}."),
            symptoms: format!("Symptoms of behavior {id}."),
            solution: format!("Solution for behavior {id}."),
        },
    )
}

pub(super) fn help() -> HelpDirectory {
    HelpDirectory {
        emergency: vec![HelpContact {
            name: "Lifeline".to_string(),
            phone: Some("988".to_string()),
            country: None,
            url: "https://988lifeline.org".to_string(),
        }],
        financial: vec![HelpContact {
            name: "Credit counseling".to_string(),
            phone: None,
            country: Some("US".to_string()),
            url: "https://nfcc.example".to_string(),
        }],
        therapy: vec![HelpContact {
            name: "Therapist directory".to_string(),
            phone: None,
            country: None,
            url: "https://therapy.example".to_string(),
        }],
    }
}

/// Seven questions; question 4 maps to the crisis behavior and question 7 to
/// a behavior missing from the catalogue.
pub(super) fn catalogue() -> Catalogue {
    let questions = (1..=7)
        .map(|id| Question {
            id: QuestionId(id),
            text: format!("Question {id}?"),
        })
        .collect();
    let evaluation = vec![
        (QuestionId(1), vec![BehaviorId(1)]),
        (QuestionId(2), vec![BehaviorId(2), BehaviorId(3)]),
        (QuestionId(3), vec![BehaviorId(3)]),
        (CRISIS_QUESTION, vec![BehaviorId(5)]),
        (QuestionId(5), vec![BehaviorId(4), BehaviorId(6)]),
        (QuestionId(6), vec![BehaviorId(7)]),
        (QuestionId(7), vec![BehaviorId(99)]),
    ];
    Catalogue::from_parts(questions, (1..=7).map(behavior), evaluation, help())
        .expect("valid catalogue")
}

pub(super) fn build_service() -> (
    AssessmentService<InMemorySessionStore>,
    Arc<InMemorySessionStore>,
) {
    let store = Arc::new(InMemorySessionStore::default());
    let service = AssessmentService::new(
        Arc::new(catalogue()),
        AssessmentPolicy::default(),
        store.clone(),
        ReportExporter::default(),
    );
    (service, store)
}

pub(super) fn router() -> axum::Router {
    let (service, _) = build_service();
    assessment_router(Arc::new(service))
}

pub(super) struct UnavailableStore;

impl SessionStore for UnavailableStore {
    fn insert(&self, _record: SessionRecord) -> Result<SessionRecord, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn modify<T, E, F>(&self, _id: &SessionId, _change: F) -> Result<T, E>
    where
        F: FnOnce(&mut SessionRecord) -> Result<T, E>,
        E: From<StoreError>,
    {
        Err(StoreError::Unavailable("store offline".to_string()).into())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
