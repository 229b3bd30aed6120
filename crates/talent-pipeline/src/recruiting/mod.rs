//! Candidate pipeline: positions, interview stages, and the applications linking them.
//!
//! Services depend on the [`RecruitingStore`] trait rather than a concrete backend. The
//! in-memory store serves tests and local demos; the SQLite store persists through `sqlx`.

pub mod domain;
pub(crate) mod intake;
pub mod memory;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationDetail, ApplicationId, Candidate, CandidateId, CandidateProfile,
    Interview, InterviewId, InterviewStep, InterviewStepId, NewCandidate, Position, PositionId,
    StageTransition, StageUpdateView,
};
pub use intake::IntakeViolation;
pub use memory::InMemoryRecruitingStore;
pub use repository::{RecruitingStore, StoreError};
pub use router::{recruiting_router, RecruitingState};
pub use scoring::{average_points, PositionCandidateView};
pub use service::{CandidateService, PositionService, RecruitingError};
pub use sqlite::SqliteRecruitingStore;
