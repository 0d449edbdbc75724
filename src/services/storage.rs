use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::config::{AppConfig, R2Settings, StorageBackend};
use crate::services::uploader::UploadContext;

/// Durable destination for photo bytes.
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Object name for a new upload; `file_name` is already sanitized.
    fn object_key(&self, context: &UploadContext, file_name: &str) -> String;

    /// Write the bytes and return the reference to persist on the job.
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<String, StorageError>;

    /// Whether the backend is currently writable.
    async fn health_check(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Build the storage backend selected by `STORAGE_BACKEND`.
pub async fn from_config(config: &AppConfig) -> Result<Arc<dyn PhotoStorage>, StorageError> {
    match config.storage_backend {
        StorageBackend::Local => {
            tracing::info!(upload_dir = %config.upload_dir.display(), "Using local photo storage");
            Ok(Arc::new(LocalDiskStorage::open(&config.upload_dir).await?))
        }
        StorageBackend::R2 => {
            let settings = config
                .r2_settings()
                .map_err(|e| StorageError::Config(e.to_string()))?;
            tracing::info!(bucket = %settings.bucket, "Using R2 photo storage");
            Ok(Arc::new(R2Storage::new(&settings)?))
        }
    }
}

/// Photos written as plain files under one directory.
#[derive(Debug, Clone)]
pub struct LocalDiskStorage {
    root: PathBuf,
}

impl LocalDiskStorage {
    /// Use `root`, creating it if needed.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }
}

#[async_trait]
impl PhotoStorage for LocalDiskStorage {
    fn object_key(&self, context: &UploadContext, file_name: &str) -> String {
        format!(
            "{}_{}_{}_{}",
            context.job_id,
            context.slot,
            chrono::Utc::now().timestamp_micros(),
            file_name
        )
    }

    async fn put(&self, key: &str, data: &[u8], _content_type: &str) -> Result<String, StorageError> {
        if key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        let path = self.root.join(key);
        // create_new: an existing photo is never overwritten.
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(data).await?;
        file.sync_all().await?;

        Ok(key.to_string())
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        let metadata = tokio::fs::metadata(&self.root).await?;
        if metadata.is_dir() {
            Ok(())
        } else {
            Err(StorageError::Config(format!(
                "{} is not a directory",
                self.root.display()
            )))
        }
    }
}

/// Client for Cloudflare R2 object storage (S3-compatible).
pub struct R2Storage {
    bucket: Box<Bucket>,
    public_url: String,
}

impl R2Storage {
    pub fn new(settings: &R2Settings) -> Result<Self, StorageError> {
        let region = Region::Custom {
            region: "auto".to_string(),
            endpoint: settings.endpoint.clone(),
        };

        let credentials = Credentials::new(
            Some(settings.access_key.as_str()),
            Some(settings.secret_key.as_str()),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Config(e.to_string()))?;

        let bucket = Bucket::new(&settings.bucket, region, credentials)
            .map_err(|e| StorageError::Config(e.to_string()))?;

        Ok(Self {
            bucket,
            public_url: settings.public_url.trim_end_matches('/').to_string(),
        })
    }

    /// Download an object (used by the live round-trip test).
    pub async fn download(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let response = self.bucket.get_object(key).await.map_err(StorageError::S3)?;
        Ok(response.to_vec())
    }

    /// Delete an object from R2.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.bucket.delete_object(key).await.map_err(StorageError::S3)?;
        Ok(())
    }
}

#[async_trait]
impl PhotoStorage for R2Storage {
    fn object_key(&self, context: &UploadContext, file_name: &str) -> String {
        format!(
            "jobs/{}/{}/{}_{}",
            context.job_id,
            context.slot,
            Uuid::new_v4().simple(),
            file_name
        )
    }

    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<String, StorageError> {
        let response = self
            .bucket
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(StorageError::S3)?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::Status(status));
        }

        Ok(format!("{}/{}", self.public_url, key))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("S3 operation failed: {0}")]
    S3(#[from] s3::error::S3Error),

    #[error("S3 returned HTTP {0}")]
    Status(u16),

    #[error("Filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Refusing to store object under key '{0}'")]
    InvalidKey(String),

    #[error("Storage configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::PhotoSlot;

    #[tokio::test]
    async fn test_local_put_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalDiskStorage::open(dir.path()).await.unwrap();

        let reference = storage.put("1_before_1_a.png", b"first", "image/png").await.unwrap();
        assert_eq!(reference, "1_before_1_a.png");

        let err = storage.put("1_before_1_a.png", b"second", "image/png").await.unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
        assert_eq!(std::fs::read(dir.path().join("1_before_1_a.png")).unwrap(), b"first");
    }

    #[tokio::test]
    async fn test_local_rejects_keys_with_separators() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalDiskStorage::open(dir.path()).await.unwrap();

        let err = storage.put("../escape.png", b"x", "image/png").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn test_local_key_layout() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalDiskStorage::open(dir.path()).await.unwrap();
        let context = UploadContext {
            job_id: 42,
            slot: PhotoSlot::After,
        };

        let key = storage.object_key(&context, "unit.jpg");
        assert!(key.starts_with("42_after_"));
        assert!(key.ends_with("_unit.jpg"));
    }
}
