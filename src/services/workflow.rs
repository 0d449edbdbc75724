use chrono::Utc;
use std::sync::Arc;

use crate::db::JobRepository;
use crate::error::{AppError, AppResult};
use crate::models::job::{Job, JobFilter, JobPatch, NewJob, PhotoSlot};
use crate::services::uploader::{PhotoFile, PhotoUploader, UploadContext};

/// Job lifecycle: create, attach evidence photos, complete.
///
/// Completion is driven by the after photo only. A completed job is terminal,
/// so further photo uploads are refused before anything is stored. If the
/// store update fails after a successful upload the stored object is left in
/// place.
#[derive(Clone)]
pub struct JobWorkflow {
    jobs: Arc<dyn JobRepository>,
    uploader: Arc<PhotoUploader>,
}

impl JobWorkflow {
    pub fn new(jobs: Arc<dyn JobRepository>, uploader: Arc<PhotoUploader>) -> Self {
        Self { jobs, uploader }
    }

    pub async fn create_job(&self, new_job: NewJob) -> AppResult<Job> {
        let job = self.jobs.create(new_job).await?;

        metrics::counter!("hvac_jobs_created_total").increment(1);
        tracing::info!(
            job_id = job.id,
            technician = %job.technician_name,
            job_type = %job.job_type,
            "Job created"
        );

        Ok(job)
    }

    pub async fn get_job(&self, job_id: i64) -> AppResult<Job> {
        Ok(self.jobs.get(job_id).await?)
    }

    pub async fn list_jobs(&self, filter: JobFilter) -> AppResult<Vec<Job>> {
        Ok(self.jobs.list(filter).await?)
    }

    /// Store the before photo; status is unchanged.
    pub async fn attach_before_photo(&self, job_id: i64, photo: &PhotoFile) -> AppResult<Job> {
        self.ensure_open(job_id).await?;
        let reference = self.store_photo(job_id, PhotoSlot::Before, photo).await?;

        Ok(self
            .jobs
            .update(job_id, JobPatch::photo(PhotoSlot::Before, reference))
            .await?)
    }

    /// Store the after photo and complete the job.
    pub async fn attach_after_photo(
        &self,
        job_id: i64,
        photo: &PhotoFile,
        notes: Option<String>,
    ) -> AppResult<Job> {
        self.ensure_open(job_id).await?;
        let reference = self.store_photo(job_id, PhotoSlot::After, photo).await?;

        let notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        let job = self
            .jobs
            .update(job_id, JobPatch::complete(reference, notes, Utc::now()))
            .await?;

        metrics::counter!("hvac_jobs_completed_total").increment(1);
        tracing::info!(job_id, technician = %job.technician_name, "Job completed");

        Ok(job)
    }

    /// Attach a photo to the named slot.
    pub async fn attach_photo(
        &self,
        job_id: i64,
        slot: PhotoSlot,
        photo: &PhotoFile,
        notes: Option<String>,
    ) -> AppResult<Job> {
        match slot {
            PhotoSlot::Before => self.attach_before_photo(job_id, photo).await,
            PhotoSlot::After => self.attach_after_photo(job_id, photo, notes).await,
        }
    }

    /// Attach either or both photos in one step.
    ///
    /// Both photos are checked before either is stored, and the job is
    /// updated with a single write. An after photo completes the job.
    pub async fn perform_job(
        &self,
        job_id: i64,
        before: Option<&PhotoFile>,
        after: Option<&PhotoFile>,
        notes: Option<String>,
    ) -> AppResult<Job> {
        if before.is_none() && after.is_none() {
            return Err(AppError::Validation(
                "Provide a before photo, an after photo, or both".to_string(),
            ));
        }

        self.ensure_open(job_id).await?;
        for (slot, photo) in [(PhotoSlot::Before, before), (PhotoSlot::After, after)] {
            if let Some(photo) = photo {
                self.uploader.check(photo, UploadContext { job_id, slot })?;
            }
        }

        let before_ref = match before {
            Some(photo) => Some(self.store_photo(job_id, PhotoSlot::Before, photo).await?),
            None => None,
        };
        let mut patch = match after {
            Some(photo) => {
                let reference = self.store_photo(job_id, PhotoSlot::After, photo).await?;
                let notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
                JobPatch::complete(reference, notes, Utc::now())
            }
            None => JobPatch::default(),
        };
        patch.before_photo = before_ref;

        let completes = patch.completed_at.is_some();
        let job = self.jobs.update(job_id, patch).await?;
        if completes {
            metrics::counter!("hvac_jobs_completed_total").increment(1);
            tracing::info!(job_id, technician = %job.technician_name, "Job completed");
        }

        Ok(job)
    }

    async fn ensure_open(&self, job_id: i64) -> AppResult<Job> {
        let job = self.jobs.get(job_id).await?;
        if job.is_completed() {
            return Err(AppError::AlreadyCompleted(job_id));
        }
        Ok(job)
    }

    async fn store_photo(&self, job_id: i64, slot: PhotoSlot, photo: &PhotoFile) -> AppResult<String> {
        Ok(self
            .uploader
            .upload(photo, UploadContext { job_id, slot })
            .await?)
    }
}
