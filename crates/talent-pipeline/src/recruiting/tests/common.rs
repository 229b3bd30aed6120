use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::recruiting::domain::{
    Application, ApplicationDetail, ApplicationId, Candidate, CandidateId, InterviewStep,
    InterviewStepId, NewCandidate, Position, PositionId,
};
use crate::recruiting::memory::InMemoryRecruitingStore;
use crate::recruiting::repository::{RecruitingStore, StoreError};
use crate::recruiting::router::{recruiting_router, RecruitingState};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn new_candidate(email: &str) -> NewCandidate {
    NewCandidate {
        first_name: "Albert".to_string(),
        last_name: "Saelices".to_string(),
        email: email.to_string(),
        phone: Some("656874937".to_string()),
        address: Some("Calle Sant Dalmir 2, 5ºB. Barcelona".to_string()),
    }
}

/// A position with two stages and one candidate applying at the first one.
pub(super) struct Pipeline {
    pub(super) store: Arc<InMemoryRecruitingStore>,
    pub(super) position: Position,
    pub(super) screening: InterviewStep,
    pub(super) technical: InterviewStep,
    pub(super) candidate: Candidate,
    pub(super) application: Application,
}

pub(super) async fn seeded_pipeline() -> Pipeline {
    let store = Arc::new(InMemoryRecruitingStore::default());
    let position = store
        .add_position("Senior Full-Stack Engineer")
        .expect("position stored");
    let screening = store
        .add_interview_step(position.id, "Initial Screening", 1)
        .expect("step stored");
    let technical = store
        .add_interview_step(position.id, "Technical Interview", 2)
        .expect("step stored");
    let candidate = store
        .insert_candidate(new_candidate("albert.saelices@gmail.com"))
        .await
        .expect("candidate stored");
    let application = store
        .add_application(candidate.id, position.id, screening.id, date(2024, 3, 1))
        .expect("application stored");

    Pipeline {
        store,
        position,
        screening,
        technical,
        candidate,
        application,
    }
}

pub(super) fn router_for(store: Arc<InMemoryRecruitingStore>) -> axum::Router {
    recruiting_router(RecruitingState::new(store))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Delegates to an in-memory store while counting stage writes.
pub(super) struct RecordingStore {
    pub(super) inner: InMemoryRecruitingStore,
    writes: AtomicUsize,
}

impl RecordingStore {
    pub(super) fn wrapping(inner: InMemoryRecruitingStore) -> Self {
        Self {
            inner,
            writes: AtomicUsize::new(0),
        }
    }

    pub(super) fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecruitingStore for RecordingStore {
    async fn position(&self, id: PositionId) -> Result<Option<Position>, StoreError> {
        self.inner.position(id).await
    }

    async fn candidate(&self, id: CandidateId) -> Result<Option<Candidate>, StoreError> {
        self.inner.candidate(id).await
    }

    async fn interview_step(
        &self,
        id: InterviewStepId,
    ) -> Result<Option<InterviewStep>, StoreError> {
        self.inner.interview_step(id).await
    }

    async fn insert_candidate(&self, candidate: NewCandidate) -> Result<Candidate, StoreError> {
        self.inner.insert_candidate(candidate).await
    }

    async fn applications_for_position(
        &self,
        position_id: PositionId,
    ) -> Result<Vec<ApplicationDetail>, StoreError> {
        self.inner.applications_for_position(position_id).await
    }

    async fn applications_for_candidate(
        &self,
        candidate_id: CandidateId,
    ) -> Result<Vec<Application>, StoreError> {
        self.inner.applications_for_candidate(candidate_id).await
    }

    async fn application_for(
        &self,
        candidate_id: CandidateId,
        position_id: PositionId,
    ) -> Result<Option<Application>, StoreError> {
        self.inner.application_for(candidate_id, position_id).await
    }

    async fn set_interview_step(
        &self,
        application_id: ApplicationId,
        interview_step_id: InterviewStepId,
    ) -> Result<Application, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner
            .set_interview_step(application_id, interview_step_id)
            .await
    }
}

pub(super) struct UnavailableStore;

fn offline() -> StoreError {
    StoreError::Unavailable("database offline".to_string())
}

#[async_trait]
impl RecruitingStore for UnavailableStore {
    async fn position(&self, _id: PositionId) -> Result<Option<Position>, StoreError> {
        Err(offline())
    }

    async fn candidate(&self, _id: CandidateId) -> Result<Option<Candidate>, StoreError> {
        Err(offline())
    }

    async fn interview_step(
        &self,
        _id: InterviewStepId,
    ) -> Result<Option<InterviewStep>, StoreError> {
        Err(offline())
    }

    async fn insert_candidate(&self, _candidate: NewCandidate) -> Result<Candidate, StoreError> {
        Err(offline())
    }

    async fn applications_for_position(
        &self,
        _position_id: PositionId,
    ) -> Result<Vec<ApplicationDetail>, StoreError> {
        Err(offline())
    }

    async fn applications_for_candidate(
        &self,
        _candidate_id: CandidateId,
    ) -> Result<Vec<Application>, StoreError> {
        Err(offline())
    }

    async fn application_for(
        &self,
        _candidate_id: CandidateId,
        _position_id: PositionId,
    ) -> Result<Option<Application>, StoreError> {
        Err(offline())
    }

    async fn set_interview_step(
        &self,
        _application_id: ApplicationId,
        _interview_step_id: InterviewStepId,
    ) -> Result<Application, StoreError> {
        Err(offline())
    }
}
