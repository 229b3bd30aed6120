use async_trait::async_trait;
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use talent_pipeline::recruiting::{
    Application, ApplicationId, Candidate, CandidateId, InMemoryRecruitingStore, Interview,
    InterviewStep, InterviewStepId, NewCandidate, Position, PositionId, RecruitingStore,
    SqliteRecruitingStore, StoreError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Stores that can be populated with positions, stages, applications, and interviews.
#[async_trait]
pub(crate) trait SeedTarget: RecruitingStore {
    async fn position_titled(&self, title: &str) -> Result<Option<Position>, StoreError>;

    async fn candidate_with_email(&self, email: &str) -> Result<Option<Candidate>, StoreError>;

    async fn seed_position(&self, title: &str) -> Result<Position, StoreError>;

    async fn seed_step(
        &self,
        position_id: PositionId,
        name: &str,
        order_index: u32,
    ) -> Result<InterviewStep, StoreError>;

    async fn seed_application(
        &self,
        candidate_id: CandidateId,
        position_id: PositionId,
        interview_step_id: InterviewStepId,
        application_date: NaiveDate,
    ) -> Result<Application, StoreError>;

    async fn seed_interview(
        &self,
        application_id: ApplicationId,
        interview_date: NaiveDate,
        score: Option<i32>,
    ) -> Result<Interview, StoreError>;
}

#[async_trait]
impl SeedTarget for InMemoryRecruitingStore {
    async fn position_titled(&self, title: &str) -> Result<Option<Position>, StoreError> {
        InMemoryRecruitingStore::position_titled(self, title)
    }

    async fn candidate_with_email(&self, email: &str) -> Result<Option<Candidate>, StoreError> {
        InMemoryRecruitingStore::candidate_with_email(self, email)
    }

    async fn seed_position(&self, title: &str) -> Result<Position, StoreError> {
        self.add_position(title)
    }

    async fn seed_step(
        &self,
        position_id: PositionId,
        name: &str,
        order_index: u32,
    ) -> Result<InterviewStep, StoreError> {
        self.add_interview_step(position_id, name, order_index)
    }

    async fn seed_application(
        &self,
        candidate_id: CandidateId,
        position_id: PositionId,
        interview_step_id: InterviewStepId,
        application_date: NaiveDate,
    ) -> Result<Application, StoreError> {
        self.add_application(candidate_id, position_id, interview_step_id, application_date)
    }

    async fn seed_interview(
        &self,
        application_id: ApplicationId,
        interview_date: NaiveDate,
        score: Option<i32>,
    ) -> Result<Interview, StoreError> {
        self.add_interview(application_id, interview_date, score)
    }
}

#[async_trait]
impl SeedTarget for SqliteRecruitingStore {
    async fn position_titled(&self, title: &str) -> Result<Option<Position>, StoreError> {
        SqliteRecruitingStore::position_titled(self, title).await
    }

    async fn candidate_with_email(&self, email: &str) -> Result<Option<Candidate>, StoreError> {
        SqliteRecruitingStore::candidate_with_email(self, email).await
    }

    async fn seed_position(&self, title: &str) -> Result<Position, StoreError> {
        self.add_position(title).await
    }

    async fn seed_step(
        &self,
        position_id: PositionId,
        name: &str,
        order_index: u32,
    ) -> Result<InterviewStep, StoreError> {
        self.add_interview_step(position_id, name, order_index).await
    }

    async fn seed_application(
        &self,
        candidate_id: CandidateId,
        position_id: PositionId,
        interview_step_id: InterviewStepId,
        application_date: NaiveDate,
    ) -> Result<Application, StoreError> {
        self.add_application(candidate_id, position_id, interview_step_id, application_date)
            .await
    }

    async fn seed_interview(
        &self,
        application_id: ApplicationId,
        interview_date: NaiveDate,
        score: Option<i32>,
    ) -> Result<Interview, StoreError> {
        self.add_interview(application_id, interview_date, score)
            .await
    }
}

/// Records created by [`seed_demo_pipeline`].
#[derive(Debug, Clone)]
pub(crate) struct DemoPipeline {
    pub(crate) position: Position,
    pub(crate) steps: Vec<InterviewStep>,
    pub(crate) candidates: Vec<Candidate>,
}

struct DemoApplicant {
    first_name: &'static str,
    last_name: &'static str,
    email: &'static str,
    phone: Option<&'static str>,
    step_index: usize,
    scores: &'static [Option<i32>],
}

const DEMO_POSITION: &str = "Senior Full-Stack Engineer";

const DEMO_STEPS: [&str; 3] = ["Initial Screening", "Technical Interview", "Manager Interview"];

const DEMO_APPLICANTS: [DemoApplicant; 3] = [
    DemoApplicant {
        first_name: "Albert",
        last_name: "Saelices",
        email: "albert.saelices@gmail.com",
        phone: Some("656874937"),
        step_index: 1,
        scores: &[Some(5), Some(4)],
    },
    DemoApplicant {
        first_name: "Carlos",
        last_name: "García",
        email: "carlos.garcia@example.com",
        phone: None,
        step_index: 0,
        scores: &[None],
    },
    DemoApplicant {
        first_name: "Lucía",
        last_name: "Fernández",
        email: "lucia.fernandez@example.com",
        phone: Some("712345678"),
        step_index: 2,
        scores: &[Some(3), Some(5), None],
    },
];

pub(crate) async fn seed_demo_pipeline<S>(
    store: &S,
    opened_on: NaiveDate,
) -> Result<DemoPipeline, StoreError>
where
    S: SeedTarget + ?Sized,
{
    let position = store.seed_position(DEMO_POSITION).await?;

    let mut steps = Vec::with_capacity(DEMO_STEPS.len());
    for (index, name) in DEMO_STEPS.iter().enumerate() {
        let order_index = u32::try_from(index + 1).unwrap_or(u32::MAX);
        steps.push(store.seed_step(position.id, name, order_index).await?);
    }

    let mut candidates = Vec::with_capacity(DEMO_APPLICANTS.len());
    for (offset, applicant) in (0_u64..).zip(DEMO_APPLICANTS.iter()) {
        let candidate = store
            .insert_candidate(NewCandidate {
                first_name: applicant.first_name.to_string(),
                last_name: applicant.last_name.to_string(),
                email: applicant.email.to_string(),
                phone: applicant.phone.map(str::to_string),
                address: None,
            })
            .await?;

        let applied_on = opened_on + chrono::Days::new(offset);
        let application = store
            .seed_application(
                candidate.id,
                position.id,
                steps[applicant.step_index].id,
                applied_on,
            )
            .await?;
        for (day, score) in (1_u64..).zip(applicant.scores.iter()) {
            store
                .seed_interview(application.id, applied_on + chrono::Days::new(day), *score)
                .await?;
        }
        candidates.push(candidate);
    }

    Ok(DemoPipeline {
        position,
        steps,
        candidates,
    })
}

/// Result of seeding a store that may already hold demo records.
#[derive(Debug)]
pub(crate) enum DemoSeed {
    Seeded(DemoPipeline),
    PositionExists(Position),
    EmailTaken(Candidate),
}

/// Seeds the demo pipeline only when none of its records exist yet, so nothing is written
/// on a store that was seeded before.
pub(crate) async fn ensure_demo_pipeline<S>(
    store: &S,
    opened_on: NaiveDate,
) -> Result<DemoSeed, StoreError>
where
    S: SeedTarget + ?Sized,
{
    if let Some(position) = store.position_titled(DEMO_POSITION).await? {
        return Ok(DemoSeed::PositionExists(position));
    }
    for applicant in &DEMO_APPLICANTS {
        if let Some(candidate) = store.candidate_with_email(applicant.email).await? {
            return Ok(DemoSeed::EmailTaken(candidate));
        }
    }
    seed_demo_pipeline(store, opened_on).await.map(DemoSeed::Seeded)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
