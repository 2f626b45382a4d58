use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::Job;

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<Job>, AppError>;
    async fn create(&self, title: &str, description: &str) -> Result<Job, AppError>;
    /// All jobs, newest first.
    async fn list(&self) -> Result<Vec<Job>, AppError>;
}

#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn find(&self, id: Uuid) -> Result<Option<Job>, AppError> {
        let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(job)
    }

    async fn create(&self, title: &str, description: &str) -> Result<Job, AppError> {
        let job = sqlx::query_as::<_, Job>(
            "INSERT INTO jobs (id, title, description) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    async fn list(&self) -> Result<Vec<Job>, AppError> {
        let jobs = sqlx::query_as::<_, Job>("SELECT * FROM jobs ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(jobs)
    }
}
