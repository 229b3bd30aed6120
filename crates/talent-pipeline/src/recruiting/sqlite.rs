use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, Pool, Sqlite};
use tracing::debug;

use super::domain::{
    Application, ApplicationDetail, ApplicationId, Candidate, CandidateId, Interview,
    InterviewId, InterviewStep, InterviewStepId, NewCandidate, Position, PositionId,
};
use super::repository::{RecruitingStore, StoreError};

const APPLICATION_COLUMNS: &str =
    "id, candidate_id, position_id, interview_step_id, application_date, notes";

#[derive(Debug, FromRow)]
struct PositionRow {
    id: i64,
    title: String,
}

impl From<PositionRow> for Position {
    fn from(row: PositionRow) -> Self {
        Self {
            id: PositionId(row.id),
            title: row.title,
        }
    }
}

#[derive(Debug, FromRow)]
struct CandidateRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    address: Option<String>,
}

impl From<CandidateRow> for Candidate {
    fn from(row: CandidateRow) -> Self {
        Self {
            id: CandidateId(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            address: row.address,
        }
    }
}

#[derive(Debug, FromRow)]
struct InterviewStepRow {
    id: i64,
    position_id: i64,
    name: String,
    order_index: i64,
}

impl TryFrom<InterviewStepRow> for InterviewStep {
    type Error = StoreError;

    fn try_from(row: InterviewStepRow) -> Result<Self, Self::Error> {
        let order_index = u32::try_from(row.order_index).map_err(|_| {
            StoreError::BrokenRelation(format!(
                "interview step {} has order index {}",
                row.id, row.order_index
            ))
        })?;
        Ok(Self {
            id: InterviewStepId(row.id),
            position_id: PositionId(row.position_id),
            name: row.name,
            order_index,
        })
    }
}

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: i64,
    candidate_id: i64,
    position_id: i64,
    interview_step_id: i64,
    application_date: NaiveDate,
    notes: Option<String>,
}

impl From<ApplicationRow> for Application {
    fn from(row: ApplicationRow) -> Self {
        Self {
            id: ApplicationId(row.id),
            candidate_id: CandidateId(row.candidate_id),
            position_id: PositionId(row.position_id),
            interview_step_id: InterviewStepId(row.interview_step_id),
            application_date: row.application_date,
            notes: row.notes,
        }
    }
}

#[derive(Debug, FromRow)]
struct InterviewRow {
    id: i64,
    application_id: i64,
    interview_date: NaiveDate,
    score: Option<i32>,
    notes: Option<String>,
}

impl From<InterviewRow> for Interview {
    fn from(row: InterviewRow) -> Self {
        Self {
            id: InterviewId(row.id),
            application_id: ApplicationId(row.application_id),
            interview_date: row.interview_date,
            score: row.score,
            notes: row.notes,
        }
    }
}

/// Application joined with its candidate and current step in a single row.
#[derive(Debug, FromRow)]
struct ApplicationDetailRow {
    #[sqlx(flatten)]
    application: ApplicationRow,
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    address: Option<String>,
    step_name: String,
    step_position_id: i64,
    step_order_index: i64,
}

/// `sqlx`-backed store persisting the pipeline tables in SQLite.
#[derive(Clone)]
pub struct SqliteRecruitingStore {
    pool: Pool<Sqlite>,
}

impl SqliteRecruitingStore {
    /// Connect and run the embedded migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let connect_options =
            SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Each connection to `:memory:` opens its own empty database.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(connect_options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        debug!(database_url, "pipeline store migrated");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn add_position(&self, title: &str) -> Result<Position, StoreError> {
        let row = sqlx::query_as::<_, PositionRow>(
            "INSERT INTO positions (title) VALUES (?) RETURNING id, title",
        )
        .bind(title)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    pub async fn position_titled(&self, title: &str) -> Result<Option<Position>, StoreError> {
        let row = sqlx::query_as::<_, PositionRow>(
            "SELECT id, title FROM positions WHERE title = ? ORDER BY id LIMIT 1",
        )
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Position::from))
    }

    pub async fn candidate_with_email(
        &self,
        email: &str,
    ) -> Result<Option<Candidate>, StoreError> {
        let row = sqlx::query_as::<_, CandidateRow>(
            "SELECT id, first_name, last_name, email, phone, address FROM candidates WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Candidate::from))
    }

    pub async fn add_interview_step(
        &self,
        position_id: PositionId,
        name: &str,
        order_index: u32,
    ) -> Result<InterviewStep, StoreError> {
        let row = sqlx::query_as::<_, InterviewStepRow>(
            "INSERT INTO interview_steps (position_id, name, order_index) VALUES (?, ?, ?)
             RETURNING id, position_id, name, order_index",
        )
        .bind(position_id.0)
        .bind(name)
        .bind(i64::from(order_index))
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    pub async fn add_application(
        &self,
        candidate_id: CandidateId,
        position_id: PositionId,
        interview_step_id: InterviewStepId,
        application_date: NaiveDate,
    ) -> Result<Application, StoreError> {
        let sql = format!(
            "INSERT INTO applications (candidate_id, position_id, interview_step_id, application_date)
             VALUES (?, ?, ?, ?) RETURNING {APPLICATION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(candidate_id.0)
            .bind(position_id.0)
            .bind(interview_step_id.0)
            .bind(application_date)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    pub async fn add_interview(
        &self,
        application_id: ApplicationId,
        interview_date: NaiveDate,
        score: Option<i32>,
    ) -> Result<Interview, StoreError> {
        let row = sqlx::query_as::<_, InterviewRow>(
            "INSERT INTO interviews (application_id, interview_date, score) VALUES (?, ?, ?)
             RETURNING id, application_id, interview_date, score, notes",
        )
        .bind(application_id.0)
        .bind(interview_date)
        .bind(score)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }
}

#[async_trait]
impl RecruitingStore for SqliteRecruitingStore {
    async fn position(&self, id: PositionId) -> Result<Option<Position>, StoreError> {
        let row = sqlx::query_as::<_, PositionRow>("SELECT id, title FROM positions WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Position::from))
    }

    async fn candidate(&self, id: CandidateId) -> Result<Option<Candidate>, StoreError> {
        let row = sqlx::query_as::<_, CandidateRow>(
            "SELECT id, first_name, last_name, email, phone, address FROM candidates WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Candidate::from))
    }

    async fn interview_step(
        &self,
        id: InterviewStepId,
    ) -> Result<Option<InterviewStep>, StoreError> {
        let row = sqlx::query_as::<_, InterviewStepRow>(
            "SELECT id, position_id, name, order_index FROM interview_steps WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        row.map(InterviewStep::try_from).transpose()
    }

    async fn insert_candidate(&self, candidate: NewCandidate) -> Result<Candidate, StoreError> {
        let result = sqlx::query_as::<_, CandidateRow>(
            "INSERT INTO candidates (first_name, last_name, email, phone, address)
             VALUES (?, ?, ?, ?, ?)
             RETURNING id, first_name, last_name, email, phone, address",
        )
        .bind(&candidate.first_name)
        .bind(&candidate.last_name)
        .bind(&candidate.email)
        .bind(&candidate.phone)
        .bind(&candidate.address)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                Err(StoreError::DuplicateEmail)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn applications_for_position(
        &self,
        position_id: PositionId,
    ) -> Result<Vec<ApplicationDetail>, StoreError> {
        let rows = sqlx::query_as::<_, ApplicationDetailRow>(
            "SELECT a.id, a.candidate_id, a.position_id, a.interview_step_id,
                    a.application_date, a.notes,
                    c.first_name, c.last_name, c.email, c.phone, c.address,
                    s.name AS step_name, s.position_id AS step_position_id,
                    s.order_index AS step_order_index
             FROM applications a
             JOIN candidates c ON c.id = a.candidate_id
             JOIN interview_steps s ON s.id = a.interview_step_id
             WHERE a.position_id = ?
             ORDER BY a.id",
        )
        .bind(position_id.0)
        .fetch_all(&self.pool)
        .await?;

        let interview_rows = sqlx::query_as::<_, InterviewRow>(
            "SELECT i.id, i.application_id, i.interview_date, i.score, i.notes
             FROM interviews i
             JOIN applications a ON a.id = i.application_id
             WHERE a.position_id = ?
             ORDER BY i.id",
        )
        .bind(position_id.0)
        .fetch_all(&self.pool)
        .await?;

        let mut interviews: BTreeMap<ApplicationId, Vec<Interview>> = BTreeMap::new();
        for row in interview_rows {
            let interview = Interview::from(row);
            interviews
                .entry(interview.application_id)
                .or_default()
                .push(interview);
        }

        rows.into_iter()
            .map(|row| {
                let interview_step = InterviewStep::try_from(InterviewStepRow {
                    id: row.application.interview_step_id,
                    position_id: row.step_position_id,
                    name: row.step_name,
                    order_index: row.step_order_index,
                })?;
                let candidate = Candidate::from(CandidateRow {
                    id: row.application.candidate_id,
                    first_name: row.first_name,
                    last_name: row.last_name,
                    email: row.email,
                    phone: row.phone,
                    address: row.address,
                });
                let application = Application::from(row.application);
                let interviews = interviews.remove(&application.id).unwrap_or_default();
                Ok(ApplicationDetail {
                    application,
                    candidate,
                    interview_step,
                    interviews,
                })
            })
            .collect()
    }

    async fn applications_for_candidate(
        &self,
        candidate_id: CandidateId,
    ) -> Result<Vec<Application>, StoreError> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE candidate_id = ? ORDER BY id"
        );
        let rows = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(candidate_id.0)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Application::from).collect())
    }

    async fn application_for(
        &self,
        candidate_id: CandidateId,
        position_id: PositionId,
    ) -> Result<Option<Application>, StoreError> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications
             WHERE candidate_id = ? AND position_id = ?
             ORDER BY id LIMIT 1"
        );
        let row = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(candidate_id.0)
            .bind(position_id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Application::from))
    }

    async fn set_interview_step(
        &self,
        application_id: ApplicationId,
        interview_step_id: InterviewStepId,
    ) -> Result<Application, StoreError> {
        let sql = format!(
            "UPDATE applications SET interview_step_id = ? WHERE id = ? RETURNING {APPLICATION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(interview_step_id.0)
            .bind(application_id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Application::from).ok_or(StoreError::NotFound)
    }
}
