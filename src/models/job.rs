use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Lifecycle status of a service job. `Completed` is terminal.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    Scheduled,
    Completed,
}

/// One of the two evidence-photo attachment points on a job.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PhotoSlot {
    Before,
    After,
}

/// An HVAC service job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: i64,
    pub customer_name: String,
    pub technician_name: String,
    pub job_type: String,
    pub job_status: JobStatus,
    pub scheduled_date: Option<String>,
    pub before_photo: Option<String>,
    pub after_photo: Option<String>,
    pub completion_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn is_completed(&self) -> bool {
        self.job_status == JobStatus::Completed
    }

    pub fn photo(&self, slot: PhotoSlot) -> Option<&str> {
        match slot {
            PhotoSlot::Before => self.before_photo.as_deref(),
            PhotoSlot::After => self.after_photo.as_deref(),
        }
    }
}

/// Fields supplied when registering a job (form or JSON body).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewJob {
    #[garde(length(min = 1, max = 100))]
    pub customer_name: String,

    #[garde(length(min = 1, max = 100))]
    pub technician_name: String,

    #[garde(length(min = 1, max = 50))]
    pub job_type: String,

    /// Informational only; never parsed as a calendar date.
    #[serde(default)]
    #[garde(length(max = 50))]
    pub scheduled_date: Option<String>,
}

impl NewJob {
    pub fn new(
        customer_name: impl Into<String>,
        technician_name: impl Into<String>,
        job_type: impl Into<String>,
        scheduled_date: Option<&str>,
    ) -> Self {
        Self {
            customer_name: customer_name.into(),
            technician_name: technician_name.into(),
            job_type: job_type.into(),
            scheduled_date: scheduled_date.map(str::to_string),
        }
    }

    /// Trim every field and drop a blank date, then validate.
    pub fn validated(self) -> Result<Self, garde::Report> {
        let job = Self {
            customer_name: self.customer_name.trim().to_string(),
            technician_name: self.technician_name.trim().to_string(),
            job_type: self.job_type.trim().to_string(),
            scheduled_date: self
                .scheduled_date
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        };
        job.validate()?;
        Ok(job)
    }
}

/// Field changes applied by `JobRepository::update`.
///
/// Completion is a single field so the status and its timestamp can only
/// change together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPatch {
    pub before_photo: Option<String>,
    pub after_photo: Option<String>,
    pub notes: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobPatch {
    /// Set the photo reference for one slot.
    pub fn photo(slot: PhotoSlot, reference: impl Into<String>) -> Self {
        let reference = Some(reference.into());
        match slot {
            PhotoSlot::Before => Self {
                before_photo: reference,
                ..Self::default()
            },
            PhotoSlot::After => Self {
                after_photo: reference,
                ..Self::default()
            },
        }
    }

    /// Attach the after photo and mark the job completed at `at`.
    pub fn complete(after_photo: impl Into<String>, notes: Option<String>, at: DateTime<Utc>) -> Self {
        Self {
            after_photo: Some(after_photo.into()),
            notes,
            completed_at: Some(at),
            ..Self::default()
        }
    }
}

/// Query parameters for job listings.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
}

impl JobFilter {
    pub fn all() -> Self {
        Self { status: None }
    }

    pub fn with_status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
        }
    }

    pub fn matches(&self, job: &Job) -> bool {
        self.status.map_or(true, |s| s == job.job_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_trims_and_drops_blank_date() {
        let job = NewJob::new("  Acme Corp ", "Dana", "AC repair", Some("   "))
            .validated()
            .unwrap();
        assert_eq!(job.customer_name, "Acme Corp");
        assert_eq!(job.scheduled_date, None);
    }

    #[test]
    fn test_new_job_rejects_blank_required_field() {
        let report = NewJob::new("Acme Corp", "   ", "AC repair", None)
            .validated()
            .unwrap_err();
        assert!(report.to_string().contains("technician_name"));
    }

    #[test]
    fn test_status_and_slot_strings() {
        assert_eq!(JobStatus::Scheduled.to_string(), "scheduled");
        assert_eq!("completed".parse::<JobStatus>().unwrap(), JobStatus::Completed);
        assert_eq!("before".parse::<PhotoSlot>().unwrap(), PhotoSlot::Before);
        assert_eq!("After".parse::<PhotoSlot>().unwrap(), PhotoSlot::After);
        assert!("sideways".parse::<PhotoSlot>().is_err());
    }

    #[test]
    fn test_complete_patch_carries_timestamp() {
        let at = Utc::now();
        let patch = JobPatch::complete("after.png", Some("ok".to_string()), at);
        assert_eq!(patch.completed_at, Some(at));
        assert_eq!(patch.before_photo, None);
    }
}
