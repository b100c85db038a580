// [libs/infra/db/src/repositories/job_repository.rs]
/*!
 * MODULE: JOB STATUS REPOSITORY
 * LAYER: INFRASTRUCTURE ADAPTER (L3)
 * RESPONSIBILITY: JOB LIFECYCLE PERSISTENCE WITH OPTIMISTIC STATE GUARDS
 *
 * Every transition is an `UPDATE ... WHERE status = $expected` statement.
 * Zero rows affected means the state already moved under us — the caller
 * surfaces `DbError::Conflict` rather than silently succeeding.
 */

use crate::client::DbClient;
use crate::errors::DbError;
use libsql::{params, Row};
use syncd_domain_models::job::{JobFilters, JobStatus, JobStatusRecord, JobType};
use tracing::{info, instrument, warn};

pub struct JobRepository {
    client: DbClient,
}

impl JobRepository {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, metadata))]
    pub async fn create(
        &self,
        job_name: &str,
        job_type: JobType,
        priority: u8,
        metadata: serde_json::Value,
    ) -> Result<JobStatusRecord, DbError> {
        let connection = self.client.get_connection()?;
        let id = uuid::Uuid::new_v4().to_string();
        let metadata_json = serde_json::to_string(&metadata).map_err(|e| DbError::Mapping(e.to_string()))?;
        connection
            .execute(
                "INSERT INTO job_status_records (id, job_name, job_type, status, priority, metadata)
                 VALUES (?1, ?2, ?3, 'pending', ?4, ?5)",
                params![id.clone(), job_name, job_type.as_str(), priority, metadata_json],
            )
            .await?;
        self.find_by_id(&id).await?.ok_or(DbError::NotFound)
    }

    const SELECT_COLUMNS: &'static str = "id, job_name, job_type, status, progress_percentage, priority, \
         started_at, completed_at, created_at, updated_at, error_text, metadata, cancel_requested";

    pub async fn find_by_id(&self, id: &str) -> Result<Option<JobStatusRecord>, DbError> {
        let connection = self.client.get_connection()?;
        let sql = format!("SELECT {} FROM job_status_records WHERE id = ?1", Self::SELECT_COLUMNS);
        let mut rows = connection.query(&sql, params![id]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Self::map_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list(&self, filters: &JobFilters) -> Result<Vec<JobStatusRecord>, DbError> {
        let connection = self.client.get_connection()?;
        let mut sql = format!("SELECT {} FROM job_status_records WHERE 1=1", Self::SELECT_COLUMNS);
        let mut bound: Vec<libsql::Value> = Vec::new();

        if let Some(status) = filters.status {
            bound.push(status.as_str().into());
            sql.push_str(&format!(" AND status = ?{}", bound.len()));
        }
        if let Some(job_type) = filters.job_type {
            bound.push(job_type.as_str().into());
            sql.push_str(&format!(" AND job_type = ?{}", bound.len()));
        }
        if let Some(priority) = filters.priority {
            bound.push((priority as i64).into());
            sql.push_str(&format!(" AND priority = ?{}", bound.len()));
        }
        if let Some(start) = filters.start_date {
            bound.push(start.to_rfc3339().into());
            sql.push_str(&format!(" AND created_at >= ?{}", bound.len()));
        }
        if let Some(end) = filters.end_date {
            bound.push(end.to_rfc3339().into());
            sql.push_str(&format!(" AND created_at <= ?{}", bound.len()));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut rows = connection.query(&sql, bound).await?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(Self::map_row(&row)?);
        }
        Ok(records)
    }

    #[instrument(skip(self))]
    pub async fn start(&self, id: &str) -> Result<(), DbError> {
        self.guarded_transition(
            id,
            "pending",
            "UPDATE job_status_records SET status = 'running', started_at = CURRENT_TIMESTAMP, \
             updated_at = CURRENT_TIMESTAMP WHERE id = ?1 AND status = 'pending'",
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn pause(&self, id: &str) -> Result<(), DbError> {
        self.guarded_transition(
            id,
            "running",
            "UPDATE job_status_records SET status = 'paused', updated_at = CURRENT_TIMESTAMP \
             WHERE id = ?1 AND status = 'running'",
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn resume(&self, id: &str) -> Result<(), DbError> {
        self.guarded_transition(
            id,
            "paused",
            "UPDATE job_status_records SET status = 'running', updated_at = CURRENT_TIMESTAMP \
             WHERE id = ?1 AND status = 'paused'",
        )
        .await
    }

    #[instrument(skip(self, error_text))]
    pub async fn complete(&self, id: &str, error_text: Option<&str>) -> Result<(), DbError> {
        let connection = self.client.get_connection()?;
        let status = if error_text.is_some() { "failed" } else { "completed" };
        let updated = connection
            .execute(
                "UPDATE job_status_records SET status = ?2, completed_at = CURRENT_TIMESTAMP,
                 progress_percentage = 100, error_text = ?3, updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?1 AND status = 'running'",
                params![id, status, error_text],
            )
            .await?;
        if updated == 0 {
            warn!(job_id = id, "job completion rejected: not in running state");
            return Err(DbError::Conflict("job is not running".into()));
        }
        info!(job_id = id, status, "job completed");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, id: &str) -> Result<(), DbError> {
        let connection = self.client.get_connection()?;
        let updated = connection
            .execute(
                "UPDATE job_status_records SET status = 'cancelled', completed_at = CURRENT_TIMESTAMP,
                 updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?1 AND status IN ('pending', 'running', 'paused')",
                params![id],
            )
            .await?;
        if updated == 0 {
            return Err(DbError::Conflict("job is already in a terminal state".into()));
        }
        Ok(())
    }

    /// Sets the cooperative cancellation flag without forcing the status
    /// transition; the engine observes it between records and calls
    /// `cancel` itself once it has unwound.
    pub async fn request_cancel(&self, id: &str) -> Result<(), DbError> {
        let connection = self.client.get_connection()?;
        let updated = connection
            .execute(
                "UPDATE job_status_records SET cancel_requested = 1, updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?1 AND status IN ('pending', 'running', 'paused')",
                params![id],
            )
            .await?;
        if updated == 0 {
            return Err(DbError::Conflict("job is already in a terminal state".into()));
        }
        Ok(())
    }

    /// Cheap poll for the cooperative cancellation flag; called between
    /// records/combinations by long-running sync work, not on every row.
    pub async fn is_cancel_requested(&self, id: &str) -> Result<bool, DbError> {
        let connection = self.client.get_connection()?;
        let mut rows = connection.query("SELECT cancel_requested FROM job_status_records WHERE id = ?1", params![id]).await?;
        match rows.next().await? {
            Some(row) => Ok(row.get::<i64>(0)? != 0),
            None => Ok(false),
        }
    }

    pub async fn update_progress(&self, id: &str, progress_percentage: u8) -> Result<(), DbError> {
        let connection = self.client.get_connection()?;
        connection
            .execute(
                "UPDATE job_status_records SET progress_percentage = ?2, updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?1",
                params![id, progress_percentage],
            )
            .await?;
        Ok(())
    }

    /// Future-scheduling only; does not reach into already-running work.
    #[instrument(skip(self))]
    pub async fn update_priority(&self, id: &str, priority: u8) -> Result<(), DbError> {
        let connection = self.client.get_connection()?;
        let updated = connection
            .execute(
                "UPDATE job_status_records SET priority = ?2, updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?1 AND status NOT IN ('completed', 'failed', 'cancelled')",
                params![id, priority],
            )
            .await?;
        if updated == 0 {
            return Err(DbError::Conflict("job is in a terminal state".into()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), DbError> {
        let connection = self.client.get_connection()?;
        let deleted = connection
            .execute(
                "DELETE FROM job_status_records WHERE id = ?1 AND status IN ('completed', 'failed', 'cancelled')",
                params![id],
            )
            .await?;
        if deleted == 0 {
            return Err(DbError::Conflict("job is not in a terminal state".into()));
        }
        Ok(())
    }

    /// Number of live (non-deleted) jobs per type currently `pending` or
    /// `running`, used by `trigger()` to enforce a schedule's
    /// `max_concurrency`.
    pub async fn count_active_for_type(&self, job_type: JobType) -> Result<u32, DbError> {
        let connection = self.client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT COUNT(*) FROM job_status_records WHERE job_type = ?1 AND status IN ('pending', 'running')",
                params![job_type.as_str()],
            )
            .await?;
        let count: i64 = rows.next().await?.map(|row| row.get(0)).transpose()?.unwrap_or(0);
        Ok(count as u32)
    }

    pub async fn queue_status(&self) -> Result<syncd_domain_models::job::QueueStatus, DbError> {
        let connection = self.client.get_connection()?;
        let mut rows = connection
            .query("SELECT status, COUNT(*) FROM job_status_records GROUP BY status", ())
            .await?;
        let mut status = syncd_domain_models::job::QueueStatus {
            waiting: 0,
            active: 0,
            completed: 0,
            failed: 0,
            delayed: 0,
            paused: 0,
        };
        while let Some(row) = rows.next().await? {
            let label: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            match label.as_str() {
                "pending" => status.waiting = count as u64,
                "running" => status.active = count as u64,
                "completed" => status.completed = count as u64,
                "failed" => status.failed = count as u64,
                "paused" => status.paused = count as u64,
                _ => {}
            }
        }
        Ok(status)
    }

    async fn guarded_transition(&self, id: &str, expected_status: &str, sql: &str) -> Result<(), DbError> {
        let connection = self.client.get_connection()?;
        let updated = connection.execute(sql, params![id]).await?;
        if updated == 0 {
            warn!(job_id = id, expected_status, "state transition rejected");
            return Err(DbError::Conflict(format!("job is not in '{expected_status}' state")));
        }
        Ok(())
    }

    fn map_row(row: &Row) -> Result<JobStatusRecord, DbError> {
        let status_raw: String = row.get(3)?;
        let status: JobStatus = status_raw.parse().map_err(DbError::Mapping)?;
        let job_type_raw: String = row.get(2)?;
        let job_type: JobType = job_type_raw.parse().map_err(DbError::Mapping)?;
        let metadata_raw: Option<String> = row.get(11)?;
        let metadata = metadata_raw
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or(serde_json::Value::Null);

        Ok(JobStatusRecord {
            id: row.get(0)?,
            job_name: row.get(1)?,
            job_type,
            status,
            progress_percentage: row.get::<i64>(4)? as u8,
            priority: row.get::<i64>(5)? as u8,
            started_at: row.get(6)?,
            completed_at: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
            error_text: row.get(10)?,
            metadata,
            cancel_requested: row.get::<i64>(12)? != 0,
        })
    }
}
