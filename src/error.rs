//! Application error taxonomy and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::db::StoreError;
use crate::services::uploader::UploadError;

/// Every failure a request can end in.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Job {0} not found")]
    NotFound(i64),

    #[error("Job {0} is already completed")]
    AlreadyCompleted(i64),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(id),
            StoreError::AlreadyCompleted(id) => AppError::AlreadyCompleted(id),
            StoreError::Validation(report) => AppError::Validation(report.to_string().trim().to_string()),
            other => AppError::Store(other),
        }
    }
}

impl AppError {
    /// The single place errors become HTTP status codes.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyCompleted(_) => StatusCode::CONFLICT,
            AppError::Upload(err) => match err {
                UploadError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                UploadError::UnsupportedMedia => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                UploadError::UnsupportedPhotoType(_) | UploadError::EmptyFile => {
                    StatusCode::BAD_REQUEST
                }
                UploadError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            match self {
                AppError::Upload(_) => "Failed to store photo".to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
            self.to_string()
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::StorageError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound(3).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::AlreadyCompleted(3).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::from(UploadError::PayloadTooLarge { limit: 10 }).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::from(UploadError::UnsupportedPhotoType("side".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(UploadError::Storage(StorageError::Status(503))).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_not_found_becomes_404() {
        let err = AppError::from(StoreError::NotFound(9));
        assert!(matches!(err, AppError::NotFound(9)));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_store_database_failure_is_500() {
        let err = AppError::from(StoreError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
