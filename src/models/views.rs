use serde::{Deserialize, Serialize};

use crate::models::job::{Job, PhotoSlot};

/// A job with its photo references resolved to fetchable URLs.
#[derive(Debug, Serialize, Deserialize)]
pub struct JobDetails {
    #[serde(flatten)]
    pub job: Job,
    pub before_photo_url: Option<String>,
    pub after_photo_url: Option<String>,
}

impl JobDetails {
    pub fn new(job: Job) -> Self {
        Self {
            before_photo_url: job.photo(PhotoSlot::Before).map(photo_url),
            after_photo_url: job.photo(PhotoSlot::After).map(photo_url),
            job,
        }
    }
}

/// Response after a photo upload.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub job: Job,
}

/// Remote references are already URLs; local ones are served under `/uploads`.
pub fn photo_url(reference: &str) -> String {
    if reference.starts_with("http://") || reference.starts_with("https://") {
        reference.to_string()
    } else {
        format!("/uploads/{reference}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_url_resolution() {
        assert_eq!(photo_url("3_before_17_unit.png"), "/uploads/3_before_17_unit.png");
        assert_eq!(
            photo_url("https://photos.example.com/jobs/3/after/ab_unit.png"),
            "https://photos.example.com/jobs/3/after/ab_unit.png"
        );
    }
}
