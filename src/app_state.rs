use std::sync::Arc;

use crate::db::JobRepository;
use crate::services::uploader::PhotoUploader;
use crate::services::workflow::JobWorkflow;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<dyn JobRepository>,
    pub uploader: Arc<PhotoUploader>,
    pub workflow: JobWorkflow,
}

impl AppState {
    pub fn new(jobs: Arc<dyn JobRepository>, uploader: PhotoUploader) -> Self {
        let uploader = Arc::new(uploader);
        Self {
            workflow: JobWorkflow::new(jobs.clone(), uploader.clone()),
            jobs,
            uploader,
        }
    }
}
