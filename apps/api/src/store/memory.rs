//! In-memory store implementations used by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::Application;
use crate::models::credential::Credential;
use crate::models::job::Job;
use crate::store::{ApplicationStore, JobStore, TokenStore};

#[derive(Default)]
pub struct MemoryJobStore {
    jobs: Mutex<Vec<Job>>,
}

impl MemoryJobStore {
    pub fn with_job(title: &str, description: &str) -> (Self, Job) {
        let job = Job {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.to_string(),
            created_at: Utc::now(),
        };
        let store = Self {
            jobs: Mutex::new(vec![job.clone()]),
        };
        (store, job)
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn find(&self, id: Uuid) -> Result<Option<Job>, AppError> {
        let jobs = self.jobs.lock().unwrap();
        Ok(jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn create(&self, title: &str, description: &str) -> Result<Job, AppError> {
        let job = Job {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.to_string(),
            created_at: Utc::now(),
        };
        self.jobs.lock().unwrap().push(job.clone());
        Ok(job)
    }

    async fn list(&self) -> Result<Vec<Job>, AppError> {
        let mut jobs = self.jobs.lock().unwrap().clone();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }
}

#[derive(Default)]
pub struct MemoryApplicationStore {
    rows: Mutex<Vec<Application>>,
    pub fail_upsert_for: Mutex<Vec<String>>,
}

impl MemoryApplicationStore {
    pub fn seeded(rows: Vec<Application>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    pub fn all(&self) -> Vec<Application> {
        self.rows.lock().unwrap().clone()
    }

    pub fn get(&self, job_id: Uuid, email_id: &str) -> Option<Application> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.job_id == job_id && a.email_id == email_id)
            .cloned()
    }
}

#[async_trait]
impl ApplicationStore for MemoryApplicationStore {
    async fn upsert(&self, application: &Application) -> Result<Application, AppError> {
        if self
            .fail_upsert_for
            .lock()
            .unwrap()
            .contains(&application.email_id)
        {
            return Err(AppError::Internal(anyhow::anyhow!("simulated write failure")));
        }
        let mut rows = self.rows.lock().unwrap();
        match rows
            .iter_mut()
            .find(|a| a.job_id == application.job_id && a.email_id == application.email_id)
        {
            Some(existing) => {
                let application_id = existing.application_id;
                *existing = Application {
                    application_id,
                    ..application.clone()
                };
                Ok(existing.clone())
            }
            None => {
                rows.push(application.clone());
                Ok(application.clone())
            }
        }
    }

    async fn record_score(
        &self,
        job_id: Uuid,
        email_id: &str,
        score: i32,
    ) -> Result<(), AppError> {
        let mut rows = self.rows.lock().unwrap();
        match rows
            .iter_mut()
            .find(|a| a.job_id == job_id && a.email_id == email_id)
        {
            Some(existing) => existing.score = score,
            None => rows.push(Application {
                application_id: Uuid::new_v4(),
                job_id,
                email_id: email_id.to_string(),
                applicant_email: String::new(),
                job_title: String::new(),
                subject_line: String::new(),
                score,
                resume_text: String::new(),
                timestamp: Utc::now(),
            }),
        }
        Ok(())
    }

    async fn list_for_job(&self, job_id: Uuid) -> Result<Vec<Application>, AppError> {
        let mut rows: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.job_id == job_id && !a.is_placeholder())
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(rows)
    }

    async fn find_by_email_id(&self, email_id: &str) -> Result<Option<Application>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|a| a.email_id == email_id && !a.is_placeholder())
            .max_by_key(|a| a.timestamp)
            .cloned())
    }
}

#[derive(Default)]
pub struct MemoryTokenStore {
    credentials: Mutex<HashMap<String, Credential>>,
    pub updates: Mutex<u32>,
}

impl MemoryTokenStore {
    pub fn with(credential: Credential) -> Self {
        let store = Self::default();
        store
            .credentials
            .lock()
            .unwrap()
            .insert(credential.session_id.clone(), credential);
        store
    }

    pub fn get(&self, session_id: &str) -> Option<Credential> {
        self.credentials.lock().unwrap().get(session_id).cloned()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn save(&self, credential: &Credential) -> Result<(), AppError> {
        self.credentials
            .lock()
            .unwrap()
            .insert(credential.session_id.clone(), credential.clone());
        Ok(())
    }

    async fn find(&self, session_id: &str) -> Result<Option<Credential>, AppError> {
        Ok(self.get(session_id))
    }

    async fn update(&self, credential: &Credential) -> Result<bool, AppError> {
        *self.updates.lock().unwrap() += 1;
        let mut credentials = self.credentials.lock().unwrap();
        match credentials.get_mut(&credential.session_id) {
            Some(existing) => {
                *existing = credential.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn application(job_id: Uuid, email_id: &str, score: i32) -> Application {
        Application {
            application_id: Uuid::new_v4(),
            job_id,
            email_id: email_id.to_string(),
            applicant_email: "a@example.com".to_string(),
            job_title: "Engineer".to_string(),
            subject_line: "Engineer role".to_string(),
            score,
            resume_text: "resume".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_repeated_upsert_keeps_single_record() {
        let store = MemoryApplicationStore::default();
        let job_id = Uuid::new_v4();
        let first = store.upsert(&application(job_id, "m1", 3)).await.unwrap();
        let second = store.upsert(&application(job_id, "m1", 9)).await.unwrap();

        assert_eq!(store.all().len(), 1);
        assert_eq!(second.application_id, first.application_id);
        assert_eq!(store.get(job_id, "m1").unwrap().score, 9);
    }

    #[tokio::test]
    async fn test_record_score_then_upsert_fills_placeholder() {
        let store = MemoryApplicationStore::default();
        let job_id = Uuid::new_v4();
        store.record_score(job_id, "m1", 6).await.unwrap();
        store.upsert(&application(job_id, "m1", 6)).await.unwrap();

        let rows = store.all();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].applicant_email, "a@example.com");
    }

    #[tokio::test]
    async fn test_score_only_rows_are_not_listed() {
        let store = MemoryApplicationStore::default();
        let job_id = Uuid::new_v4();
        store.record_score(job_id, "m1", 6).await.unwrap();

        assert_eq!(store.all().len(), 1);
        assert!(store.list_for_job(job_id).await.unwrap().is_empty());
        assert!(store.find_by_email_id("m1").await.unwrap().is_none());

        store.upsert(&application(job_id, "m1", 6)).await.unwrap();
        assert_eq!(store.list_for_job(job_id).await.unwrap().len(), 1);
        assert!(store.find_by_email_id("m1").await.unwrap().is_some());
    }
}
