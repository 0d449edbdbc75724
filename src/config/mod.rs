use serde::Deserialize;
use std::path::PathBuf;

/// Hard ceiling for a single photo upload (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Which repository implementation backs the job store.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Memory,
}

/// Where uploaded photos are written.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Local,
    R2,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:5000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// SQLite connection string
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default)]
    pub store_backend: StoreBackend,

    #[serde(default)]
    pub storage_backend: StorageBackend,

    /// Directory for photos when `storage_backend = local`
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// R2 bucket name
    pub r2_bucket: Option<String>,

    /// R2 endpoint URL
    pub r2_endpoint: Option<String>,

    /// R2 access key ID (S3-compatible)
    pub r2_access_key: Option<String>,

    /// R2 secret access key (S3-compatible)
    pub r2_secret_key: Option<String>,

    /// Public base URL objects are served from (e.g. an r2.dev domain)
    pub r2_public_url: Option<String>,
}

/// Resolved credentials for the remote photo host.
#[derive(Debug, Clone)]
pub struct R2Settings {
    pub bucket: String,
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub public_url: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_database_url() -> String {
    "sqlite://hvac_management.db".to_string()
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// In-memory store with photos on local disk under `upload_dir`.
    pub fn for_local(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            bind_addr: default_bind_addr(),
            database_url: default_database_url(),
            store_backend: StoreBackend::Memory,
            storage_backend: StorageBackend::Local,
            upload_dir: upload_dir.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            r2_bucket: None,
            r2_endpoint: None,
            r2_access_key: None,
            r2_secret_key: None,
            r2_public_url: None,
        }
    }

    /// Collect the R2 settings, naming the first missing variable.
    pub fn r2_settings(&self) -> Result<R2Settings, ConfigError> {
        fn required(value: &Option<String>, name: &'static str) -> Result<String, ConfigError> {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string)
                .ok_or(ConfigError::Missing(name))
        }

        Ok(R2Settings {
            bucket: required(&self.r2_bucket, "R2_BUCKET")?,
            endpoint: required(&self.r2_endpoint, "R2_ENDPOINT")?,
            access_key: required(&self.r2_access_key, "R2_ACCESS_KEY")?,
            secret_key: required(&self.r2_secret_key, "R2_SECRET_KEY")?,
            public_url: required(&self.r2_public_url, "R2_PUBLIC_URL")?,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set when STORAGE_BACKEND=r2")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_r2_settings_report_missing_variable() {
        let mut config = AppConfig::for_local("uploads");
        config.r2_bucket = Some("photos".to_string());
        config.r2_endpoint = Some("https://example.r2.cloudflarestorage.com".to_string());

        let err = config.r2_settings().unwrap_err();
        assert_eq!(err.to_string(), "R2_ACCESS_KEY must be set when STORAGE_BACKEND=r2");
    }

    #[test]
    fn test_local_defaults() {
        let config = AppConfig::for_local("/tmp/photos");
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.storage_backend, StorageBackend::Local);
    }
}
