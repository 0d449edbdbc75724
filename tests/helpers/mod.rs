//! Test helper utilities: an in-process server and multipart request builders

use hvac_jobs::app_state::AppState;
use hvac_jobs::config::AppConfig;
use hvac_jobs::db::{InMemoryJobRepository, JobRepository};
use hvac_jobs::models::job::Job;
use hvac_jobs::routes;
use hvac_jobs::services::storage::LocalDiskStorage;
use hvac_jobs::services::uploader::PhotoUploader;
use reqwest::multipart;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use crate::fixtures::JobFixture;

/// A running server on an ephemeral port with local photo storage.
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub upload_dir: TempDir,
    pub jobs: Arc<dyn JobRepository>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Spawn the full router backed by the in-memory store.
pub async fn spawn_app() -> TestServer {
    let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");
    let config = AppConfig::for_local(upload_dir.path());

    let storage = LocalDiskStorage::open(upload_dir.path())
        .await
        .expect("Failed to open local storage");
    let uploader = PhotoUploader::new(Arc::new(storage), config.max_upload_bytes);
    let jobs: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::new());

    let state = AppState::new(jobs.clone(), uploader);
    let app = routes::router(state, &config, None);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server error");
    });

    TestServer {
        base_url: format!("http://{addr}"),
        client: reqwest::Client::new(),
        upload_dir,
        jobs,
    }
}

/// POST /create_job as a browser form would.
pub async fn create_job(server: &TestServer, fixture: &JobFixture) -> Job {
    let mut fields = vec![
        ("customer_name", fixture.customer_name),
        ("technician_name", fixture.technician_name),
        ("job_type", fixture.job_type),
    ];
    if let Some(date) = fixture.scheduled_date {
        fields.push(("scheduled_date", date));
    }

    let response = server
        .client
        .post(server.url("/create_job"))
        .form(&fields)
        .send()
        .await
        .expect("create_job request failed");

    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    response.json::<Job>().await.expect("Invalid job JSON")
}

/// Multipart form for POST /upload.
pub fn upload_form(
    job_id: &str,
    photo_type: &str,
    file_name: &str,
    data: Vec<u8>,
    notes: Option<&str>,
) -> multipart::Form {
    // Send file names verbatim so the server sees what a client really sent.
    let mut form = multipart::Form::new()
        .percent_encode_noop()
        .text("job_id", job_id.to_string())
        .text("photo_type", photo_type.to_string())
        .part(
            "file",
            multipart::Part::bytes(data).file_name(file_name.to_string()),
        );
    if let Some(n) = notes {
        form = form.text("notes", n.to_string());
    }
    form
}

/// POST a multipart form and return the raw response.
pub async fn post_multipart(
    server: &TestServer,
    path: &str,
    form: multipart::Form,
) -> reqwest::Response {
    server
        .client
        .post(server.url(path))
        .multipart(form)
        .send()
        .await
        .expect("multipart request failed")
}

/// Names of every file written to the upload directory.
pub fn stored_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read upload dir")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
