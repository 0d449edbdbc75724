use axum::extract::State;
use axum::Json;

use crate::app_state::AppState;
use crate::error::AppResult;
use crate::models::dashboard::DashboardStats;
use crate::services::reporting;

/// GET /dashboard: Job totals and per-technician counts.
pub async fn dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardStats>> {
    let stats = reporting::dashboard_stats(state.jobs.as_ref()).await?;
    Ok(Json(stats))
}
