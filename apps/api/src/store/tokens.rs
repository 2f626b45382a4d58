use async_trait::async_trait;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::credential::Credential;

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Inserts or replaces the credential for its session.
    async fn save(&self, credential: &Credential) -> Result<(), AppError>;
    async fn find(&self, session_id: &str) -> Result<Option<Credential>, AppError>;
    /// Replaces the tokens of an existing session. Returns false if the session is unknown.
    async fn update(&self, credential: &Credential) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgTokenStore {
    pool: PgPool,
}

impl PgTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn save(&self, credential: &Credential) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO oauth_tokens (session_id, access_token, refresh_token, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (session_id) DO UPDATE SET
                access_token  = EXCLUDED.access_token,
                refresh_token = EXCLUDED.refresh_token,
                expires_at    = EXCLUDED.expires_at,
                updated_at    = now()
            "#,
        )
        .bind(&credential.session_id)
        .bind(&credential.access_token)
        .bind(&credential.refresh_token)
        .bind(credential.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, session_id: &str) -> Result<Option<Credential>, AppError> {
        let credential = sqlx::query_as::<_, Credential>(
            "SELECT session_id, access_token, refresh_token, expires_at \
             FROM oauth_tokens WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(credential)
    }

    async fn update(&self, credential: &Credential) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE oauth_tokens
            SET access_token = $2, refresh_token = $3, expires_at = $4, updated_at = now()
            WHERE session_id = $1
            "#,
        )
        .bind(&credential.session_id)
        .bind(&credential.access_token)
        .bind(&credential.refresh_token)
        .bind(credential.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
