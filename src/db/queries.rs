use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::BTreeMap;

use crate::db::repository::{apply_patch, JobRepository, StoreError};
use crate::models::job::{Job, JobFilter, JobPatch, JobStatus, NewJob};

const JOB_COLUMNS: &str = "id, customer_name, technician_name, job_type, job_status, \
     scheduled_date, before_photo, after_photo, completion_time, notes, created_at";

/// Row shape of the `jobs` table.
#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    id: i64,
    customer_name: String,
    technician_name: String,
    job_type: String,
    job_status: String,
    scheduled_date: Option<String>,
    before_photo: Option<String>,
    after_photo: Option<String>,
    completion_time: Option<DateTime<Utc>>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let job_status = row.job_status.parse::<JobStatus>().map_err(|_| {
            StoreError::Corrupt(format!("job {} has unknown status '{}'", row.id, row.job_status))
        })?;

        Ok(Job {
            id: row.id,
            customer_name: row.customer_name,
            technician_name: row.technician_name,
            job_type: row.job_type,
            job_status,
            scheduled_date: row.scheduled_date,
            before_photo: row.before_photo,
            after_photo: row.after_photo,
            completion_time: row.completion_time,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

/// SQLite-backed job store.
#[derive(Debug, Clone)]
pub struct SqliteJobRepository {
    pool: SqlitePool,
}

impl SqliteJobRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepository for SqliteJobRepository {
    async fn create(&self, new_job: NewJob) -> Result<Job, StoreError> {
        let new_job = new_job.validated()?;

        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            INSERT INTO jobs (customer_name, technician_name, job_type, job_status, scheduled_date, created_at)
            VALUES (?1, ?2, ?3, 'scheduled', ?4, ?5)
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(&new_job.customer_name)
        .bind(&new_job.technician_name)
        .bind(&new_job.job_type)
        .bind(&new_job.scheduled_date)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn get(&self, id: i64) -> Result<Job, StoreError> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(StoreError::NotFound(id))?.try_into()
    }

    async fn list(&self, filter: JobFilter) -> Result<Vec<Job>, StoreError> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM jobs
            WHERE (?1 IS NULL OR job_status = ?1)
            ORDER BY id ASC
            "#
        ))
        .bind(filter.status.map(|s| s.to_string()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Job::try_from).collect()
    }

    async fn count(&self, filter: JobFilter) -> Result<u64, StoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE (?1 IS NULL OR job_status = ?1)")
                .bind(filter.status.map(|s| s.to_string()))
                .fetch_one(&self.pool)
                .await?;

        Ok(count as u64)
    }

    async fn count_by_technician(&self) -> Result<BTreeMap<String, u64>, StoreError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT technician_name, COUNT(*)
            FROM jobs
            GROUP BY technician_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(technician, count)| (technician, count as u64))
            .collect())
    }

    async fn update(&self, id: i64, patch: JobPatch) -> Result<Job, StoreError> {
        let mut job = self.get(id).await?;
        let read_status = job.job_status;
        apply_patch(&mut job, patch)?;

        // The status guard turns a concurrent completion into a zero-row
        // update instead of a second write.
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET job_status = ?1,
                before_photo = ?2,
                after_photo = ?3,
                completion_time = ?4,
                notes = ?5
            WHERE id = ?6 AND job_status = ?7
            "#,
        )
        .bind(job.job_status.to_string())
        .bind(&job.before_photo)
        .bind(&job.after_photo)
        .bind(job.completion_time)
        .bind(&job.notes)
        .bind(id)
        .bind(read_status.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyCompleted(id));
        }

        Ok(job)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
