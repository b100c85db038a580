// [libs/infra/db/src/repositories/sync_log_repository.rs]
//! Per-sync-run bookkeeping, one row per resource sync invocation.

use crate::client::DbClient;
use crate::errors::DbError;
use libsql::{params, Row};
use syncd_domain_models::sync::{SyncJobLog, SyncStatus};
use tracing::instrument;

pub struct SyncLogRepository {
    client: DbClient,
}

impl SyncLogRepository {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn start(&self, job_name: &str, resource: &str) -> Result<String, DbError> {
        let connection = self.client.get_connection()?;
        let id = uuid::Uuid::new_v4().to_string();
        connection
            .execute(
                "INSERT INTO sync_job_logs (id, job_name, resource, started_at, status)
                 VALUES (?1, ?2, ?3, CURRENT_TIMESTAMP, 'running')",
                params![id.clone(), job_name, resource],
            )
            .await?;
        Ok(id)
    }

    #[instrument(skip(self, error_text))]
    pub async fn finish(
        &self,
        id: &str,
        status: SyncStatus,
        error_text: Option<&str>,
        duration_ms: u64,
        records_processed: u32,
        records_failed: u32,
    ) -> Result<(), DbError> {
        let connection = self.client.get_connection()?;
        connection
            .execute(
                "UPDATE sync_job_logs SET finished_at = CURRENT_TIMESTAMP, status = ?2, error_text = ?3,
                 duration_ms = ?4, records_processed = ?5, records_failed = ?6 WHERE id = ?1",
                params![id, status_label(status), error_text, duration_ms as i64, records_processed, records_failed],
            )
            .await?;
        Ok(())
    }

    pub async fn list_for_resource(&self, resource: &str, limit: u32) -> Result<Vec<SyncJobLog>, DbError> {
        let connection = self.client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, job_name, resource, started_at, finished_at, status, error_text, duration_ms,
                 records_processed, records_failed FROM sync_job_logs
                 WHERE resource = ?1 ORDER BY started_at DESC LIMIT ?2",
                params![resource, limit as i64],
            )
            .await?;
        let mut logs = Vec::new();
        while let Some(row) = rows.next().await? {
            logs.push(Self::map_row(&row)?);
        }
        Ok(logs)
    }

    fn map_row(row: &Row) -> Result<SyncJobLog, DbError> {
        let status_raw: String = row.get(5)?;
        Ok(SyncJobLog {
            id: row.get(0)?,
            job_name: row.get(1)?,
            resource: row.get(2)?,
            started_at: row.get(3)?,
            finished_at: row.get(4)?,
            status: parse_status(&status_raw)?,
            error_text: row.get(6)?,
            duration_ms: row.get::<i64>(7)? as u64,
            records_processed: row.get::<i64>(8)? as u32,
            records_failed: row.get::<i64>(9)? as u32,
        })
    }
}

fn status_label(status: SyncStatus) -> &'static str {
    match status {
        SyncStatus::Pending => "pending",
        SyncStatus::Running => "running",
        SyncStatus::Partial => "partial",
        SyncStatus::Success => "success",
        SyncStatus::Failed => "failed",
        SyncStatus::Cancelled => "cancelled",
        SyncStatus::Paused => "paused",
    }
}

fn parse_status(raw: &str) -> Result<SyncStatus, DbError> {
    match raw {
        "pending" => Ok(SyncStatus::Pending),
        "running" => Ok(SyncStatus::Running),
        "partial" => Ok(SyncStatus::Partial),
        "success" => Ok(SyncStatus::Success),
        "failed" => Ok(SyncStatus::Failed),
        "cancelled" => Ok(SyncStatus::Cancelled),
        "paused" => Ok(SyncStatus::Paused),
        other => Err(DbError::Mapping(format!("unknown sync status: {other}"))),
    }
}
