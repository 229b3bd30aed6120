use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Identifier of a job opening.
    PositionId
);
record_id!(
    /// Identifier of a person tracked through one or more pipelines.
    CandidateId
);
record_id!(
    /// Identifier of a named stage in a position's hiring pipeline.
    InterviewStepId
);
record_id!(
    /// Identifier of the candidate/position join row.
    ApplicationId
);
record_id!(InterviewId);

/// A job opening candidates apply to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: PositionId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: CandidateId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl Candidate {
    /// First and last name joined by a single space.
    pub fn complete_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Unvalidated candidate payload accepted by the intake endpoint.
///
/// Missing fields deserialize to empty values so intake validation, not the JSON
/// extractor, reports which field is wrong.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewCandidate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewStep {
    pub id: InterviewStepId,
    pub position_id: PositionId,
    pub name: String,
    pub order_index: u32,
}

/// One candidate's progress through one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub candidate_id: CandidateId,
    pub position_id: PositionId,
    pub interview_step_id: InterviewStepId,
    pub application_date: NaiveDate,
    pub notes: Option<String>,
}

/// A graded (or not yet graded) interview held for an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    pub id: InterviewId,
    pub application_id: ApplicationId,
    pub interview_date: NaiveDate,
    pub score: Option<i32>,
    pub notes: Option<String>,
}

/// Application joined with the records needed to list it under its position.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationDetail {
    pub application: Application,
    pub candidate: Candidate,
    pub interview_step: InterviewStep,
    pub interviews: Vec<Interview>,
}

/// Result of a stage transition, carrying the related records for confirmation payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct StageTransition {
    pub application: Application,
    pub candidate: Candidate,
    pub position: Position,
    pub interview_step: InterviewStep,
}

impl StageTransition {
    pub fn confirmation(&self) -> StageUpdateView {
        StageUpdateView {
            candidate_id: self.candidate.id,
            position_id: self.position.id,
            interview_step_id: self.interview_step.id,
            current_interview_step: self.interview_step.name.clone(),
            candidate_name: self.candidate.complete_name(),
            position_title: self.position.title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageUpdateView {
    pub candidate_id: CandidateId,
    pub position_id: PositionId,
    pub interview_step_id: InterviewStepId,
    pub current_interview_step: String,
    pub candidate_name: String,
    pub position_title: String,
}

/// Candidate record as exposed by the lookup endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub applications: Vec<Application>,
}
