use crate::db::{JobRepository, StoreError};
use crate::models::dashboard::DashboardStats;
use crate::models::job::{JobFilter, JobStatus};

/// Recompute dashboard counts from the store. Nothing is cached.
pub async fn dashboard_stats(jobs: &dyn JobRepository) -> Result<DashboardStats, StoreError> {
    let total = jobs.count(JobFilter::all()).await?;
    let completed = jobs.count(JobFilter::with_status(JobStatus::Completed)).await?;
    let per_technician = jobs.count_by_technician().await?;

    Ok(DashboardStats {
        total,
        completed,
        pending: total.saturating_sub(completed),
        per_technician,
    })
}
