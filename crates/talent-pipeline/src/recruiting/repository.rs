use async_trait::async_trait;

use super::domain::{
    Application, ApplicationDetail, ApplicationId, Candidate, CandidateId, InterviewStep,
    InterviewStepId, NewCandidate, Position, PositionId,
};

/// Query interface over the pipeline tables so services can run against any backend.
#[async_trait]
pub trait RecruitingStore: Send + Sync {
    async fn position(&self, id: PositionId) -> Result<Option<Position>, StoreError>;

    async fn candidate(&self, id: CandidateId) -> Result<Option<Candidate>, StoreError>;

    async fn interview_step(
        &self,
        id: InterviewStepId,
    ) -> Result<Option<InterviewStep>, StoreError>;

    /// Persist a validated candidate, assigning its identifier.
    async fn insert_candidate(&self, candidate: NewCandidate) -> Result<Candidate, StoreError>;

    /// Every application of the position with its candidate, current step and interviews,
    /// ordered by application id.
    async fn applications_for_position(
        &self,
        position_id: PositionId,
    ) -> Result<Vec<ApplicationDetail>, StoreError>;

    async fn applications_for_candidate(
        &self,
        candidate_id: CandidateId,
    ) -> Result<Vec<Application>, StoreError>;

    async fn application_for(
        &self,
        candidate_id: CandidateId,
        position_id: PositionId,
    ) -> Result<Option<Application>, StoreError>;

    /// Move an application to another stage and return the stored row.
    async fn set_interview_step(
        &self,
        application_id: ApplicationId,
        interview_step_id: InterviewStepId,
    ) -> Result<Application, StoreError>;
}

/// Error enumeration for data store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("The email already exists in the database")]
    DuplicateEmail,
    #[error("record not found")]
    NotFound,
    #[error("related record missing: {0}")]
    BrokenRelation(String),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}
