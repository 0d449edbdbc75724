use axum::extract::rejection::QueryRejection;
use axum::extract::{FromRequest, Path, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::response::Html;
use axum::{Form, Json};

use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::models::job::{Job, JobFilter, JobStatus, NewJob};
use crate::models::views::JobDetails;

/// GET /: Jobs still waiting to be performed.
pub async fn home(State(state): State<AppState>) -> AppResult<Json<Vec<Job>>> {
    let jobs = state
        .workflow
        .list_jobs(JobFilter::with_status(JobStatus::Scheduled))
        .await?;
    Ok(Json(jobs))
}

/// GET /create_job: Job registration form.
pub async fn create_job_form() -> Html<&'static str> {
    Html(include_str!("../../static/create_job.html"))
}

/// POST /create_job: Register a job from a form post or a JSON body.
pub async fn create_job(
    State(state): State<AppState>,
    request: Request,
) -> AppResult<(StatusCode, Json<Job>)> {
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    let new_job = if is_json {
        Json::<NewJob>::from_request(request, &())
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?
            .0
    } else {
        Form::<NewJob>::from_request(request, &())
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?
            .0
    };

    let job = state.workflow.create_job(new_job).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /perform_job: Photo upload form.
pub async fn perform_job_form() -> Html<&'static str> {
    Html(include_str!("../../static/perform_job.html"))
}

/// GET /perform_job/{job_id}: The job about to be performed.
pub async fn show_job(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> AppResult<Json<Job>> {
    Ok(Json(state.workflow.get_job(job_id).await?))
}

/// GET /view_jobs: Every job, optionally filtered by `?status=`.
pub async fn view_jobs(
    State(state): State<AppState>,
    filter: Result<Query<JobFilter>, QueryRejection>,
) -> AppResult<Json<Vec<Job>>> {
    let Query(filter) = filter.map_err(|e| AppError::Validation(e.body_text()))?;
    Ok(Json(state.workflow.list_jobs(filter).await?))
}

/// GET /job_details/{job_id}: One job with resolved photo URLs.
pub async fn job_details(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> AppResult<Json<JobDetails>> {
    let job = state.workflow.get_job(job_id).await?;
    Ok(Json(JobDetails::new(job)))
}
