use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::super::domain::QuestionId;
use super::domain::{SessionError, SessionId};
use super::repository::{SessionStore, StoreError};
use super::service::{AssessmentService, AssessmentServiceError};
use crate::export::{ExportError, ExportedReport};

pub const SKIPPED_LINES_HEADER: &str = "x-report-skipped-lines";

#[derive(Debug, Deserialize)]
pub struct AnswerPayload {
    pub answer: bool,
}

/// Router builder exposing the questionnaire lifecycle over HTTP.
pub fn assessment_router<S>(service: Arc<AssessmentService<S>>) -> Router
where
    S: SessionStore + 'static,
{
    Router::new()
        .route("/api/v1/catalogue/questions", get(questions_handler::<S>))
        .route("/api/v1/catalogue/help", get(help_handler::<S>))
        .route("/api/v1/assessment/sessions", post(create_handler::<S>))
        .route(
            "/api/v1/assessment/sessions/:session_id",
            get(status_handler::<S>),
        )
        .route(
            "/api/v1/assessment/sessions/:session_id/answers/:question_id",
            put(answer_handler::<S>),
        )
        .route(
            "/api/v1/assessment/sessions/:session_id/results",
            post(results_handler::<S>),
        )
        .route(
            "/api/v1/assessment/sessions/:session_id/survey",
            post(survey_handler::<S>),
        )
        .route(
            "/api/v1/assessment/sessions/:session_id/reset",
            post(reset_handler::<S>),
        )
        .route(
            "/api/v1/assessment/sessions/:session_id/report",
            get(report_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn questions_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
) -> Response
where
    S: SessionStore + 'static,
{
    (StatusCode::OK, Json(service.catalogue().questions().to_vec())).into_response()
}

pub(crate) async fn help_handler<S>(State(service): State<Arc<AssessmentService<S>>>) -> Response
where
    S: SessionStore + 'static,
{
    (StatusCode::OK, Json(service.catalogue().help().clone())).into_response()
}

pub(crate) async fn create_handler<S>(State(service): State<Arc<AssessmentService<S>>>) -> Response
where
    S: SessionStore + 'static,
{
    match service.start() {
        Ok(record) => (
            StatusCode::CREATED,
            Json(record.status_view(service.catalogue())),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn status_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service.get(&SessionId(session_id)) {
        Ok(record) => (StatusCode::OK, Json(record.status_view(service.catalogue()))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn answer_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    Path((session_id, question_id)): Path<(String, u32)>,
    Json(payload): Json<AnswerPayload>,
) -> Response
where
    S: SessionStore + 'static,
{
    let id = SessionId(session_id);
    match service.answer(&id, QuestionId(question_id), payload.answer) {
        Ok(record) => (StatusCode::OK, Json(record.status_view(service.catalogue()))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn results_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service.show_results(&SessionId(session_id)) {
        Ok(outcome) => {
            let view = outcome.view(service.catalogue().help());
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn survey_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service.return_to_survey(&SessionId(session_id)) {
        Ok(record) => (StatusCode::OK, Json(record.status_view(service.catalogue()))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn reset_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service.reset(&SessionId(session_id)) {
        Ok(record) => (StatusCode::OK, Json(record.status_view(service.catalogue()))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn report_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
{
    let today = Local::now().date_naive();
    let exported = match service.export(&SessionId(session_id), today) {
        Ok(exported) => exported,
        Err(err) => return error_response(err),
    };

    let disposition = format!(
        "attachment; filename=\"{}\"",
        ExportedReport::file_name(today)
    );
    let mut response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, exported.encoding.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        exported.to_bytes(),
    )
        .into_response();
    response.headers_mut().insert(
        SKIPPED_LINES_HEADER,
        HeaderValue::from(exported.failures.len()),
    );
    response
}

pub(crate) fn error_response(err: AssessmentServiceError) -> Response {
    let (status, message) = match &err {
        AssessmentServiceError::Store(StoreError::NotFound) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        AssessmentServiceError::Session(SessionError::UnknownQuestion(_)) => {
            (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        AssessmentServiceError::Session(SessionError::SurveyClosed)
        | AssessmentServiceError::Session(SessionError::ResultsNotShown)
        | AssessmentServiceError::Export(ExportError::CrisisOverride) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        AssessmentServiceError::Export(_) => {
            error!(error = %err, "report export failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "report export failed".to_string(),
            )
        }
        AssessmentServiceError::Store(_) => {
            error!(error = %err, "session store failure");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    };

    (status, Json(json!({ "error": message }))).into_response()
}
