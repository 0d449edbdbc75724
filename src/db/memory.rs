use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::db::repository::{apply_patch, JobRepository, StoreError};
use crate::models::job::{Job, JobFilter, JobPatch, JobStatus, NewJob};

/// Process-local job store, used for tests and throwaway deployments.
#[derive(Debug, Default)]
pub struct InMemoryJobRepository {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    /// Sorted by id, which is also insertion order.
    jobs: Vec<Job>,
}

impl State {
    fn position(&self, id: i64) -> Result<usize, StoreError> {
        self.jobs
            .binary_search_by_key(&id, |job| job.id)
            .map_err(|_| StoreError::NotFound(id))
    }
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create(&self, new_job: NewJob) -> Result<Job, StoreError> {
        let new_job = new_job.validated()?;
        let mut state = self.state.write().await;

        state.last_id += 1;
        let job = Job {
            id: state.last_id,
            customer_name: new_job.customer_name,
            technician_name: new_job.technician_name,
            job_type: new_job.job_type,
            job_status: JobStatus::Scheduled,
            scheduled_date: new_job.scheduled_date,
            before_photo: None,
            after_photo: None,
            completion_time: None,
            notes: None,
            created_at: Utc::now(),
        };
        state.jobs.push(job.clone());

        Ok(job)
    }

    async fn get(&self, id: i64) -> Result<Job, StoreError> {
        let state = self.state.read().await;
        let index = state.position(id)?;
        Ok(state.jobs[index].clone())
    }

    async fn list(&self, filter: JobFilter) -> Result<Vec<Job>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .jobs
            .iter()
            .filter(|job| filter.matches(job))
            .cloned()
            .collect())
    }

    async fn count(&self, filter: JobFilter) -> Result<u64, StoreError> {
        let state = self.state.read().await;
        Ok(state.jobs.iter().filter(|job| filter.matches(job)).count() as u64)
    }

    async fn count_by_technician(&self) -> Result<BTreeMap<String, u64>, StoreError> {
        let state = self.state.read().await;
        let mut counts = BTreeMap::new();
        for job in &state.jobs {
            *counts.entry(job.technician_name.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn update(&self, id: i64, patch: JobPatch) -> Result<Job, StoreError> {
        let mut state = self.state.write().await;
        let index = state.position(id)?;

        // Patch a copy so a rejected patch leaves the stored job untouched.
        let mut job = state.jobs[index].clone();
        apply_patch(&mut job, patch)?;
        state.jobs[index] = job.clone();

        Ok(job)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
