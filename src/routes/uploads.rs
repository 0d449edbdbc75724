use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::collections::HashMap;

use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::models::job::{Job, PhotoSlot};
use crate::models::views::UploadResponse;
use crate::services::uploader::{PhotoFile, UploadError};

/// A fully read multipart body: text fields and file parts by field name.
#[derive(Debug, Default)]
struct PhotoForm {
    fields: HashMap<String, String>,
    files: HashMap<String, PhotoFile>,
}

impl PhotoForm {
    async fn read(mut multipart: Multipart, limit: usize) -> AppResult<Self> {
        let mut form = Self::default();
        let to_app_error = |e: MultipartError| multipart_error(e, limit);

        while let Some(field) = multipart.next_field().await.map_err(to_app_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let data = field.bytes().await.map_err(to_app_error)?;
                    // Browsers send an empty part for an untouched file input.
                    if file_name.is_empty() && data.is_empty() {
                        continue;
                    }
                    form.files.insert(name, PhotoFile::new(file_name, data));
                }
                None => {
                    let text = field.text().await.map_err(to_app_error)?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn file(&self, name: &str) -> Option<&PhotoFile> {
        self.files.get(name)
    }

    fn job_id(&self) -> AppResult<i64> {
        let raw = self
            .text("job_id")
            .ok_or_else(|| AppError::Validation("job_id is required".to_string()))?;
        raw.parse()
            .map_err(|_| AppError::Validation(format!("job_id '{raw}' is not a valid id")))
    }
}

fn multipart_error(err: MultipartError, limit: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::Upload(UploadError::PayloadTooLarge { limit })
    } else {
        AppError::Validation(format!("Malformed multipart body: {}", err.body_text()))
    }
}

/// POST /upload: Attach one photo; `photo_type=after` completes the job.
pub async fn upload_photo(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let form = PhotoForm::read(multipart, state.uploader.max_bytes()).await?;

    let job_id = form.job_id()?;
    let photo_type = form
        .text("photo_type")
        .ok_or_else(|| AppError::Validation("photo_type is required".to_string()))?;
    let slot: PhotoSlot = photo_type
        .parse()
        .map_err(|_| UploadError::UnsupportedPhotoType(photo_type.clone()))?;
    let photo = form
        .file("file")
        .ok_or_else(|| AppError::Validation("file is required".to_string()))?;

    let job = state
        .workflow
        .attach_photo(job_id, slot, photo, form.text("notes"))
        .await?;

    let label = match slot {
        PhotoSlot::Before => "Before",
        PhotoSlot::After => "After",
    };
    Ok(Json(UploadResponse {
        message: format!("{label} photo uploaded successfully"),
        job,
    }))
}

/// POST /complete_job: Attach the after photo and notes, completing the job.
pub async fn complete_job(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let form = PhotoForm::read(multipart, state.uploader.max_bytes()).await?;

    let job_id = form.job_id()?;
    let photo = form
        .file("file")
        .ok_or_else(|| AppError::Validation("file is required".to_string()))?;

    let job = state
        .workflow
        .attach_after_photo(job_id, photo, form.text("notes"))
        .await?;

    Ok(Json(UploadResponse {
        message: format!("Job {job_id} completed"),
        job,
    }))
}

/// POST /perform_job: Multipart with `job_id` and either or both photos.
pub async fn perform_job(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<Job>> {
    let form = PhotoForm::read(multipart, state.uploader.max_bytes()).await?;
    let job_id = form.job_id()?;
    perform(&state, job_id, &form).await
}

/// POST /perform_job/{job_id}: As above with the id in the path.
pub async fn perform_job_by_id(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
    multipart: Multipart,
) -> AppResult<Json<Job>> {
    let form = PhotoForm::read(multipart, state.uploader.max_bytes()).await?;
    perform(&state, job_id, &form).await
}

async fn perform(state: &AppState, job_id: i64, form: &PhotoForm) -> AppResult<Json<Job>> {
    let job = state
        .workflow
        .perform_job(
            job_id,
            form.file("before_photo"),
            form.file("after_photo"),
            form.text("notes"),
        )
        .await?;
    Ok(Json(job))
}
