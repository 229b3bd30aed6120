use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::domain::{CandidateId, InterviewStepId, NewCandidate, PositionId};
use super::repository::{RecruitingStore, StoreError};
use super::service::{CandidateService, PositionService, RecruitingError};

const INTERNAL_ERROR: &str = "Internal Server Error";

/// Services shared by the pipeline handlers.
pub struct RecruitingState<S> {
    pub candidates: Arc<CandidateService<S>>,
    pub positions: Arc<PositionService<S>>,
}

impl<S> Clone for RecruitingState<S> {
    fn clone(&self) -> Self {
        Self {
            candidates: Arc::clone(&self.candidates),
            positions: Arc::clone(&self.positions),
        }
    }
}

impl<S> RecruitingState<S>
where
    S: RecruitingStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            candidates: Arc::new(CandidateService::new(Arc::clone(&store))),
            positions: Arc::new(PositionService::new(store)),
        }
    }
}

/// Router builder exposing the candidate and position endpoints.
pub fn recruiting_router<S>(state: RecruitingState<S>) -> Router
where
    S: RecruitingStore + 'static,
{
    Router::new()
        .route("/candidates", post(add_candidate_handler::<S>))
        .route("/candidates/:id", get(candidate_handler::<S>))
        .route(
            "/candidates/:id/stage",
            put(update_stage_handler::<S>).patch(update_stage_handler::<S>),
        )
        .route(
            "/positions/:id/candidates",
            get(position_candidates_handler::<S>),
        )
        .with_state(state)
}

/// Body of a stage update. Identifiers may arrive as JSON numbers or numeric strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StageUpdateRequest {
    #[serde(default)]
    pub(crate) position_id: Option<Value>,
    #[serde(default)]
    pub(crate) interview_step_id: Option<Value>,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum IdField {
    Missing,
    Malformed,
    Valid(i64),
}

impl IdField {
    /// Absent, null, zero, empty, and `false` all count as missing.
    pub(crate) fn read(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) | Some(Value::Bool(false)) => Self::Missing,
            Some(Value::String(raw)) if raw.is_empty() => Self::Missing,
            Some(Value::Number(number)) if number.as_f64() == Some(0.0) => Self::Missing,
            Some(Value::Number(number)) => number.as_i64().map_or(Self::Malformed, Self::Valid),
            Some(Value::String(raw)) => parse_id(raw).map_or(Self::Malformed, Self::Valid),
            Some(_) => Self::Malformed,
        }
    }
}

/// A body without a JSON content type, or with nothing in it, reads as an empty request.
pub(crate) fn read_stage_request(
    headers: &HeaderMap,
    body: &[u8],
) -> Result<StageUpdateRequest, JsonRejection> {
    let declares_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false);

    if !declares_json || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(StageUpdateRequest::default());
    }
    Json::<StageUpdateRequest>::from_bytes(body).map(|Json(request)| request)
}

pub(crate) fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({ "error": message.into() });
    (status, Json(payload)).into_response()
}

pub(crate) async fn add_candidate_handler<S>(
    State(state): State<RecruitingState<S>>,
    payload: Result<Json<NewCandidate>, JsonRejection>,
) -> Response
where
    S: RecruitingStore + 'static,
{
    let outcome = match payload {
        Ok(Json(submission)) => state
            .candidates
            .add(submission)
            .await
            .map_err(|err| err.to_string()),
        Err(rejection) => Err(rejection.body_text()),
    };

    match outcome {
        Ok(candidate) => {
            let payload = json!({
                "message": "Candidate added successfully",
                "data": candidate,
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({
                "message": "Error adding candidate",
                "error": error,
            });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn candidate_handler<S>(
    State(state): State<RecruitingState<S>>,
    Path(raw_id): Path<String>,
) -> Response
where
    S: RecruitingStore + 'static,
{
    let Some(id) = parse_id(&raw_id) else {
        return error_body(StatusCode::BAD_REQUEST, "Invalid ID format");
    };

    match state.candidates.find(CandidateId(id)).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(err @ RecruitingError::CandidateNotFound { .. }) => {
            error_body(StatusCode::NOT_FOUND, err.to_string())
        }
        Err(_) => error_body(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR),
    }
}

pub(crate) async fn update_stage_handler<S>(
    State(state): State<RecruitingState<S>>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    S: RecruitingStore + 'static,
{
    let Some(candidate_id) = parse_id(&raw_id) else {
        return error_body(StatusCode::BAD_REQUEST, "Invalid candidate ID format");
    };

    let request = match read_stage_request(&headers, &body) {
        Ok(request) => request,
        Err(rejection) => return error_body(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let position_id = IdField::read(request.position_id.as_ref());
    let interview_step_id = IdField::read(request.interview_step_id.as_ref());
    let (position_id, interview_step_id) = match (position_id, interview_step_id) {
        (IdField::Missing, _) | (_, IdField::Missing) => {
            return error_body(
                StatusCode::BAD_REQUEST,
                "Missing required fields: positionId and interviewStepId are required",
            );
        }
        (IdField::Valid(position_id), IdField::Valid(interview_step_id)) => {
            (position_id, interview_step_id)
        }
        _ => {
            return error_body(
                StatusCode::BAD_REQUEST,
                "Invalid format: positionId and interviewStepId must be valid numbers",
            );
        }
    };

    let result = state
        .candidates
        .update_interview_step(
            CandidateId(candidate_id),
            PositionId(position_id),
            InterviewStepId(interview_step_id),
        )
        .await;

    match result {
        Ok(transition) => {
            let payload = json!({
                "message": "Candidate interview step updated successfully",
                "data": transition.confirmation(),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => {
            let status = stage_error_status(&err);
            if status.is_server_error() {
                error_body(status, INTERNAL_ERROR)
            } else {
                error_body(status, err.to_string())
            }
        }
    }
}

pub(crate) fn stage_error_status(err: &RecruitingError) -> StatusCode {
    match err {
        err if err.is_not_found() => StatusCode::NOT_FOUND,
        RecruitingError::Intake(_) | RecruitingError::Store(StoreError::DuplicateEmail) => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) async fn position_candidates_handler<S>(
    State(state): State<RecruitingState<S>>,
    Path(raw_id): Path<String>,
) -> Response
where
    S: RecruitingStore + 'static,
{
    let Some(id) = parse_id(&raw_id) else {
        return error_body(StatusCode::BAD_REQUEST, "Invalid position ID format");
    };

    match state.positions.candidates(PositionId(id)).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(err @ RecruitingError::PositionNotFound { .. }) => {
            error_body(StatusCode::NOT_FOUND, err.to_string())
        }
        Err(err) => error_body(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}
