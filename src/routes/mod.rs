use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::config::{AppConfig, StorageBackend};

pub mod dashboard;
pub mod health;
pub mod jobs;
pub mod metrics;
pub mod uploads;

/// Room for multipart boundaries and the small text fields around a photo.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Assemble the HTTP surface. `/metrics` is mounted only when a recorder
/// handle is supplied.
pub fn router(
    state: AppState,
    config: &AppConfig,
    prometheus: Option<Arc<PrometheusHandle>>,
) -> Router {
    // Oversized bodies surface as multipart errors and map to a JSON 413.
    let body_limit = config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;
    let perform_limit = 2 * config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    let mut app = Router::new()
        .route("/", get(jobs::home))
        .route("/create_job", get(jobs::create_job_form).post(jobs::create_job))
        .route(
            "/perform_job",
            get(jobs::perform_job_form)
                .post(uploads::perform_job)
                .layer(DefaultBodyLimit::max(perform_limit)),
        )
        .route(
            "/perform_job/{job_id}",
            get(jobs::show_job)
                .post(uploads::perform_job_by_id)
                .layer(DefaultBodyLimit::max(perform_limit)),
        )
        .route("/upload", post(uploads::upload_photo))
        .route("/complete_job", post(uploads::complete_job))
        .route("/view_jobs", get(jobs::view_jobs))
        .route("/job_details/{job_id}", get(jobs::job_details))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/health", get(health::health_check))
        .with_state(state);

    if config.storage_backend == StorageBackend::Local {
        app = app.nest_service("/uploads", ServeDir::new(&config.upload_dir));
    }

    if let Some(handle) = prometheus {
        app = app.route(
            "/metrics",
            get(metrics::prometheus_metrics).with_state(handle),
        );
    }

    app.layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
