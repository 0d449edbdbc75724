//! Job store contract shared by every persistence backend.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::models::job::{Job, JobFilter, JobPatch, JobStatus, NewJob};

/// Repository trait for job persistence.
///
/// Implementations commit every write before returning; there is no batching
/// and no transaction spanning more than one job.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Validates and inserts a new job in the `scheduled` state.
    async fn create(&self, new_job: NewJob) -> Result<Job, StoreError>;

    /// Fetches one job, or `StoreError::NotFound`.
    async fn get(&self, id: i64) -> Result<Job, StoreError>;

    /// Jobs matching `filter`, in insertion order.
    async fn list(&self, filter: JobFilter) -> Result<Vec<Job>, StoreError>;

    /// Number of jobs matching `filter`.
    async fn count(&self, filter: JobFilter) -> Result<u64, StoreError>;

    /// Number of jobs assigned to each technician.
    async fn count_by_technician(&self) -> Result<BTreeMap<String, u64>, StoreError>;

    /// Applies `patch` to one job and returns the updated row.
    async fn update(&self, id: i64, patch: JobPatch) -> Result<Job, StoreError>;

    /// Cheap connectivity probe for health checks.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Applies a patch in place, refusing to complete a job twice.
pub fn apply_patch(job: &mut Job, patch: JobPatch) -> Result<(), StoreError> {
    if let Some(at) = patch.completed_at {
        if job.is_completed() {
            return Err(StoreError::AlreadyCompleted(job.id));
        }
        job.job_status = JobStatus::Completed;
        job.completion_time = Some(at);
    }
    if let Some(reference) = patch.before_photo {
        job.before_photo = Some(reference);
    }
    if let Some(reference) = patch.after_photo {
        job.after_photo = Some(reference);
    }
    if let Some(notes) = patch.notes {
        job.notes = Some(notes);
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Job {0} not found")]
    NotFound(i64),

    #[error("Invalid job: {0}")]
    Validation(#[from] garde::Report),

    #[error("Job {0} is already completed")]
    AlreadyCompleted(i64),

    #[error("Corrupt job row: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
