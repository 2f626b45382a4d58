use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::Application;

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Inserts or overwrites the application for `(job_id, email_id)`.
    /// The first `application_id` written for that pair is kept; every other field
    /// takes the new value. Returns the stored row.
    async fn upsert(&self, application: &Application) -> Result<Application, AppError>;

    /// Sets only the score for `(job_id, email_id)`, creating a placeholder row if
    /// the application has not been written yet.
    async fn record_score(&self, job_id: Uuid, email_id: &str, score: i32)
        -> Result<(), AppError>;

    /// Applications for a job, newest first. Score-only placeholder rows are
    /// skipped until the pipeline has written the full application.
    async fn list_for_job(&self, job_id: Uuid) -> Result<Vec<Application>, AppError>;

    /// Most recent complete application written for a provider message id, across jobs.
    async fn find_by_email_id(&self, email_id: &str) -> Result<Option<Application>, AppError>;
}

#[derive(Clone)]
pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn upsert(&self, application: &Application) -> Result<Application, AppError> {
        let stored = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications
                (application_id, job_id, email_id, applicant_email, job_title,
                 subject_line, score, resume_text, "timestamp")
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (job_id, email_id) DO UPDATE SET
                applicant_email = EXCLUDED.applicant_email,
                job_title       = EXCLUDED.job_title,
                subject_line    = EXCLUDED.subject_line,
                score           = EXCLUDED.score,
                resume_text     = EXCLUDED.resume_text,
                "timestamp"     = EXCLUDED."timestamp"
            RETURNING *
            "#,
        )
        .bind(application.application_id)
        .bind(application.job_id)
        .bind(&application.email_id)
        .bind(&application.applicant_email)
        .bind(&application.job_title)
        .bind(&application.subject_line)
        .bind(application.score)
        .bind(&application.resume_text)
        .bind(application.timestamp)
        .fetch_one(&self.pool)
        .await?;
        Ok(stored)
    }

    async fn record_score(
        &self,
        job_id: Uuid,
        email_id: &str,
        score: i32,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO applications (application_id, job_id, email_id, score)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (job_id, email_id) DO UPDATE SET score = EXCLUDED.score
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(job_id)
        .bind(email_id)
        .bind(score)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_for_job(&self, job_id: Uuid) -> Result<Vec<Application>, AppError> {
        let rows = sqlx::query_as::<_, Application>(
            r#"
            SELECT * FROM applications
            WHERE job_id = $1 AND resume_text <> ''
            ORDER BY "timestamp" DESC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_by_email_id(&self, email_id: &str) -> Result<Option<Application>, AppError> {
        let row = sqlx::query_as::<_, Application>(
            r#"
            SELECT * FROM applications
            WHERE email_id = $1 AND resume_text <> ''
            ORDER BY "timestamp" DESC
            LIMIT 1
            "#,
        )
        .bind(email_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
