use axum::body::Bytes;
use image::ImageFormat;
use std::sync::Arc;

use crate::models::job::PhotoSlot;
use crate::services::storage::{PhotoStorage, StorageError};

/// Longest sanitized file name kept in an object key.
const MAX_FILE_NAME_LEN: usize = 100;

/// Which job and slot an upload belongs to; used for naming only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadContext {
    pub job_id: i64,
    pub slot: PhotoSlot,
}

/// A photo received from a client, fully buffered.
#[derive(Debug, Clone)]
pub struct PhotoFile {
    pub file_name: String,
    pub data: Bytes,
}

impl PhotoFile {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
        }
    }
}

/// Validates photo uploads and hands them to the configured storage backend.
///
/// The uploader never touches the job store; recording the returned
/// reference is the caller's job.
pub struct PhotoUploader {
    storage: Arc<dyn PhotoStorage>,
    max_bytes: usize,
}

impl PhotoUploader {
    pub fn new(storage: Arc<dyn PhotoStorage>, max_bytes: usize) -> Self {
        Self { storage, max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn storage(&self) -> &Arc<dyn PhotoStorage> {
        &self.storage
    }

    /// Reject empty, oversized and non-image payloads without storing anything.
    pub fn check(&self, photo: &PhotoFile, context: UploadContext) -> Result<ImageFormat, UploadError> {
        let size = photo.data.len();

        if size == 0 {
            reject("empty");
            return Err(UploadError::EmptyFile);
        }
        if size > self.max_bytes {
            reject("too_large");
            tracing::warn!(
                job_id = context.job_id,
                slot = %context.slot,
                bytes = size,
                limit = self.max_bytes,
                "Rejecting oversized photo"
            );
            return Err(UploadError::PayloadTooLarge {
                limit: self.max_bytes,
            });
        }

        match image::guess_format(&photo.data) {
            Ok(format @ (ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP)) => Ok(format),
            _ => {
                reject("unsupported_media");
                Err(UploadError::UnsupportedMedia)
            }
        }
    }

    /// Check, name and store one photo, returning its reference.
    pub async fn upload(
        &self,
        photo: &PhotoFile,
        context: UploadContext,
    ) -> Result<String, UploadError> {
        let format = self.check(photo, context)?;
        let size = photo.data.len();

        let file_name = sanitize_filename(&photo.file_name);
        let key = self.storage.object_key(&context, &file_name);
        let reference = self
            .storage
            .put(&key, &photo.data, format.to_mime_type())
            .await
            .map_err(|e| {
                reject("storage");
                UploadError::Storage(e)
            })?;

        metrics::counter!("hvac_photos_uploaded_total", "slot" => context.slot.to_string())
            .increment(1);
        metrics::histogram!("hvac_photo_upload_bytes").record(size as f64);

        tracing::info!(
            job_id = context.job_id,
            slot = %context.slot,
            bytes = size,
            reference = %reference,
            "Photo stored"
        );

        Ok(reference)
    }
}

fn reject(reason: &'static str) {
    metrics::counter!("hvac_uploads_rejected_total", "reason" => reason).increment(1);
}

/// Reduce a client-supplied file name to a safe single path component.
///
/// Path separators become word breaks, non-ASCII is dropped, whitespace runs
/// become `_`, anything outside `[A-Za-z0-9_.-]` is removed and leading or
/// trailing dots and underscores are stripped. Falls back to `photo`.
pub fn sanitize_filename(original: &str) -> String {
    let spaced: String = original
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    let mut name: String = trimmed.chars().take(MAX_FILE_NAME_LEN).collect();
    if name.is_empty() {
        name.push_str("photo");
    }
    name
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Photo exceeds the {limit} byte upload limit")]
    PayloadTooLarge { limit: usize },

    #[error("Unsupported photo type '{0}' (expected 'before' or 'after')")]
    UnsupportedPhotoType(String),

    #[error("Uploaded file is not a supported image (JPEG, PNG or WebP)")]
    UnsupportedMedia,

    #[error("Uploaded file is empty")]
    EmptyFile,

    #[error("Failed to store photo: {0}")]
    Storage(#[from] StorageError),
}
