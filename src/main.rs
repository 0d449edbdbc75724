use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use hvac_jobs::app_state::AppState;
use hvac_jobs::config::AppConfig;
use hvac_jobs::services::{storage, uploader::PhotoUploader};
use hvac_jobs::{db, routes};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing hvac-jobs server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!("hvac_jobs_created_total", "Total service jobs created");
    metrics::describe_counter!("hvac_jobs_completed_total", "Total service jobs completed");
    metrics::describe_counter!(
        "hvac_photos_uploaded_total",
        "Photos stored, labelled by slot"
    );
    metrics::describe_counter!(
        "hvac_uploads_rejected_total",
        "Photo uploads rejected, labelled by reason"
    );
    metrics::describe_histogram!("hvac_photo_upload_bytes", "Size of stored photos in bytes");

    // Open the job store and run migrations
    let jobs = db::open_repository(&config)
        .await
        .expect("Failed to open job store");

    // Initialize photo storage
    let photo_storage = storage::from_config(&config)
        .await
        .expect("Failed to initialize photo storage");
    let uploader = PhotoUploader::new(photo_storage, config.max_upload_bytes);

    // Create shared application state
    let state = AppState::new(jobs, uploader);
    let app = routes::router(state, &config, Some(prometheus_handle));

    tracing::info!("Starting hvac-jobs on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
