use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use super::domain::{
    Application, ApplicationDetail, ApplicationId, Candidate, CandidateId, Interview,
    InterviewId, InterviewStep, InterviewStepId, NewCandidate, Position, PositionId,
};
use super::repository::{RecruitingStore, StoreError};

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    positions: BTreeMap<PositionId, Position>,
    candidates: BTreeMap<CandidateId, Candidate>,
    interview_steps: BTreeMap<InterviewStepId, InterviewStep>,
    applications: BTreeMap<ApplicationId, Application>,
    interviews: BTreeMap<InterviewId, Interview>,
}

impl Tables {
    fn allocate(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn detail(&self, application: &Application) -> Result<ApplicationDetail, StoreError> {
        let candidate = self
            .candidates
            .get(&application.candidate_id)
            .cloned()
            .ok_or_else(|| {
                StoreError::BrokenRelation(format!(
                    "application {} references candidate {}",
                    application.id, application.candidate_id
                ))
            })?;
        let interview_step = self
            .interview_steps
            .get(&application.interview_step_id)
            .cloned()
            .ok_or_else(|| {
                StoreError::BrokenRelation(format!(
                    "application {} references interview step {}",
                    application.id, application.interview_step_id
                ))
            })?;
        let interviews = self
            .interviews
            .values()
            .filter(|interview| interview.application_id == application.id)
            .cloned()
            .collect();

        Ok(ApplicationDetail {
            application: application.clone(),
            candidate,
            interview_step,
            interviews,
        })
    }
}

/// Process-local store backing the service when no database URL is configured.
///
/// Identifiers come from a single sequence shared by every table.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRecruitingStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryRecruitingStore {
    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory tables poisoned".to_string()))
    }

    pub fn add_position(&self, title: &str) -> Result<Position, StoreError> {
        let mut tables = self.tables()?;
        let position = Position {
            id: PositionId(tables.allocate()),
            title: title.to_string(),
        };
        tables.positions.insert(position.id, position.clone());
        Ok(position)
    }

    pub fn position_titled(&self, title: &str) -> Result<Option<Position>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .positions
            .values()
            .find(|position| position.title == title)
            .cloned())
    }

    pub fn candidate_with_email(&self, email: &str) -> Result<Option<Candidate>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .candidates
            .values()
            .find(|candidate| candidate.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    pub fn add_interview_step(
        &self,
        position_id: PositionId,
        name: &str,
        order_index: u32,
    ) -> Result<InterviewStep, StoreError> {
        let mut tables = self.tables()?;
        if !tables.positions.contains_key(&position_id) {
            return Err(StoreError::BrokenRelation(format!(
                "interview step references position {position_id}"
            )));
        }
        let step = InterviewStep {
            id: InterviewStepId(tables.allocate()),
            position_id,
            name: name.to_string(),
            order_index,
        };
        tables.interview_steps.insert(step.id, step.clone());
        Ok(step)
    }

    pub fn add_application(
        &self,
        candidate_id: CandidateId,
        position_id: PositionId,
        interview_step_id: InterviewStepId,
        application_date: NaiveDate,
    ) -> Result<Application, StoreError> {
        let mut tables = self.tables()?;
        if !tables.candidates.contains_key(&candidate_id)
            || !tables.positions.contains_key(&position_id)
            || !tables.interview_steps.contains_key(&interview_step_id)
        {
            return Err(StoreError::BrokenRelation(format!(
                "application references candidate {candidate_id}, position {position_id}, step {interview_step_id}"
            )));
        }
        if tables.applications.values().any(|existing| {
            existing.candidate_id == candidate_id && existing.position_id == position_id
        }) {
            return Err(StoreError::BrokenRelation(format!(
                "candidate {candidate_id} already applied to position {position_id}"
            )));
        }
        let application = Application {
            id: ApplicationId(tables.allocate()),
            candidate_id,
            position_id,
            interview_step_id,
            application_date,
            notes: None,
        };
        tables.applications.insert(application.id, application.clone());
        Ok(application)
    }

    pub fn add_interview(
        &self,
        application_id: ApplicationId,
        interview_date: NaiveDate,
        score: Option<i32>,
    ) -> Result<Interview, StoreError> {
        let mut tables = self.tables()?;
        if !tables.applications.contains_key(&application_id) {
            return Err(StoreError::BrokenRelation(format!(
                "interview references application {application_id}"
            )));
        }
        let interview = Interview {
            id: InterviewId(tables.allocate()),
            application_id,
            interview_date,
            score,
            notes: None,
        };
        tables.interviews.insert(interview.id, interview.clone());
        Ok(interview)
    }
}

#[async_trait]
impl RecruitingStore for InMemoryRecruitingStore {
    async fn position(&self, id: PositionId) -> Result<Option<Position>, StoreError> {
        Ok(self.tables()?.positions.get(&id).cloned())
    }

    async fn candidate(&self, id: CandidateId) -> Result<Option<Candidate>, StoreError> {
        Ok(self.tables()?.candidates.get(&id).cloned())
    }

    async fn interview_step(
        &self,
        id: InterviewStepId,
    ) -> Result<Option<InterviewStep>, StoreError> {
        Ok(self.tables()?.interview_steps.get(&id).cloned())
    }

    async fn insert_candidate(&self, candidate: NewCandidate) -> Result<Candidate, StoreError> {
        let mut tables = self.tables()?;
        if tables
            .candidates
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&candidate.email))
        {
            return Err(StoreError::DuplicateEmail);
        }

        let stored = Candidate {
            id: CandidateId(tables.allocate()),
            first_name: candidate.first_name,
            last_name: candidate.last_name,
            email: candidate.email,
            phone: candidate.phone,
            address: candidate.address,
        };
        tables.candidates.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn applications_for_position(
        &self,
        position_id: PositionId,
    ) -> Result<Vec<ApplicationDetail>, StoreError> {
        let tables = self.tables()?;
        tables
            .applications
            .values()
            .filter(|application| application.position_id == position_id)
            .map(|application| tables.detail(application))
            .collect()
    }

    async fn applications_for_candidate(
        &self,
        candidate_id: CandidateId,
    ) -> Result<Vec<Application>, StoreError> {
        Ok(self
            .tables()?
            .applications
            .values()
            .filter(|application| application.candidate_id == candidate_id)
            .cloned()
            .collect())
    }

    async fn application_for(
        &self,
        candidate_id: CandidateId,
        position_id: PositionId,
    ) -> Result<Option<Application>, StoreError> {
        Ok(self
            .tables()?
            .applications
            .values()
            .find(|application| {
                application.candidate_id == candidate_id && application.position_id == position_id
            })
            .cloned())
    }

    async fn set_interview_step(
        &self,
        application_id: ApplicationId,
        interview_step_id: InterviewStepId,
    ) -> Result<Application, StoreError> {
        let mut tables = self.tables()?;
        let application = tables
            .applications
            .get_mut(&application_id)
            .ok_or(StoreError::NotFound)?;
        application.interview_step_id = interview_step_id;
        Ok(application.clone())
    }
}
