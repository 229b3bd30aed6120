use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::domain::{
    Candidate, CandidateId, CandidateProfile, InterviewStepId, NewCandidate, PositionId,
    StageTransition,
};
use super::intake::{CandidateIntake, IntakeViolation};
use super::repository::{RecruitingStore, StoreError};
use super::scoring::PositionCandidateView;

/// Candidate intake, lookup, and stage transitions over an injected store.
pub struct CandidateService<S> {
    store: Arc<S>,
    intake: CandidateIntake,
}

impl<S> CandidateService<S>
where
    S: RecruitingStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            intake: CandidateIntake,
        }
    }

    /// Validate and persist a new candidate.
    pub async fn add(&self, submission: NewCandidate) -> Result<Candidate, RecruitingError> {
        let candidate = self.intake.accept(submission)?;
        let stored = self.store.insert_candidate(candidate).await?;
        info!(candidate_id = %stored.id, "candidate added");
        Ok(stored)
    }

    /// Fetch a candidate together with the applications it holds.
    pub async fn find(
        &self,
        candidate_id: CandidateId,
    ) -> Result<CandidateProfile, RecruitingError> {
        let candidate = self
            .store
            .candidate(candidate_id)
            .await?
            .ok_or(RecruitingError::CandidateNotFound { candidate_id })?;
        let applications = self.store.applications_for_candidate(candidate_id).await?;
        debug!(%candidate_id, applications = applications.len(), "candidate loaded");

        Ok(CandidateProfile {
            candidate,
            applications,
        })
    }

    /// Move the candidate's application for `position_id` to another interview step.
    ///
    /// Preconditions are checked in order (candidate, position, step, application) and the
    /// first missing record aborts the call before anything is written. The step is not
    /// required to belong to the position's own pipeline.
    pub async fn update_interview_step(
        &self,
        candidate_id: CandidateId,
        position_id: PositionId,
        interview_step_id: InterviewStepId,
    ) -> Result<StageTransition, RecruitingError> {
        let result = self
            .transition(candidate_id, position_id, interview_step_id)
            .await;

        match &result {
            Ok(transition) => info!(
                %candidate_id,
                %position_id,
                %interview_step_id,
                application_id = %transition.application.id,
                "candidate moved to new interview step"
            ),
            Err(err) if err.is_not_found() => {
                warn!(%candidate_id, %position_id, %interview_step_id, "{err}")
            }
            Err(err) => error!(%candidate_id, %position_id, error = %err, "stage update failed"),
        }

        result
    }

    async fn transition(
        &self,
        candidate_id: CandidateId,
        position_id: PositionId,
        interview_step_id: InterviewStepId,
    ) -> Result<StageTransition, RecruitingError> {
        let candidate = self
            .store
            .candidate(candidate_id)
            .await?
            .ok_or(RecruitingError::CandidateNotFound { candidate_id })?;
        let position = self
            .store
            .position(position_id)
            .await?
            .ok_or(RecruitingError::PositionNotFound { position_id })?;
        let interview_step = self
            .store
            .interview_step(interview_step_id)
            .await?
            .ok_or(RecruitingError::InterviewStepNotFound { interview_step_id })?;
        let application = self
            .store
            .application_for(candidate_id, position_id)
            .await?
            .ok_or(RecruitingError::ApplicationNotFound {
                candidate_id,
                position_id,
            })?;

        let application = self
            .store
            .set_interview_step(application.id, interview_step.id)
            .await?;

        Ok(StageTransition {
            application,
            candidate,
            position,
            interview_step,
        })
    }
}

/// Read-side aggregation of the candidates applying to a position.
pub struct PositionService<S> {
    store: Arc<S>,
}

impl<S> PositionService<S>
where
    S: RecruitingStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// One row per application in store order, each with its interview average.
    pub async fn candidates(
        &self,
        position_id: PositionId,
    ) -> Result<Vec<PositionCandidateView>, RecruitingError> {
        let result = self.collect_candidates(position_id).await;
        if let Err(err) = &result {
            error!(%position_id, error = %err, "error fetching candidates for position");
        }
        result
    }

    async fn collect_candidates(
        &self,
        position_id: PositionId,
    ) -> Result<Vec<PositionCandidateView>, RecruitingError> {
        self.store
            .position(position_id)
            .await?
            .ok_or(RecruitingError::PositionNotFound { position_id })?;

        let applications = self.store.applications_for_position(position_id).await?;
        debug!(%position_id, applications = applications.len(), "position pipeline loaded");

        Ok(applications
            .iter()
            .map(|detail| PositionCandidateView::from_detail(position_id, detail))
            .collect())
    }
}

/// Error raised by the candidate and position services.
#[derive(Debug, thiserror::Error)]
pub enum RecruitingError {
    #[error("Candidate not found")]
    CandidateNotFound { candidate_id: CandidateId },
    #[error("Position not found")]
    PositionNotFound { position_id: PositionId },
    #[error("Interview step not found")]
    InterviewStepNotFound { interview_step_id: InterviewStepId },
    #[error("Application not found for this candidate and position")]
    ApplicationNotFound {
        candidate_id: CandidateId,
        position_id: PositionId,
    },
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RecruitingError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RecruitingError::CandidateNotFound { .. }
                | RecruitingError::PositionNotFound { .. }
                | RecruitingError::InterviewStepNotFound { .. }
                | RecruitingError::ApplicationNotFound { .. }
        )
    }
}
