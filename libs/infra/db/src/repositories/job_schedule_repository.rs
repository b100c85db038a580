// [libs/infra/db/src/repositories/job_schedule_repository.rs]
//! Per-job-type schedule configuration consulted by the scheduler tick.

use crate::client::DbClient;
use crate::errors::DbError;
use libsql::{params, Row};
use syncd_domain_models::job::{JobSchedule, JobType};

pub struct JobScheduleRepository {
    client: DbClient,
}

impl JobScheduleRepository {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }

    pub async fn upsert(&self, schedule: &JobSchedule) -> Result<(), DbError> {
        let connection = self.client.get_connection()?;
        connection
            .execute(
                "INSERT INTO job_schedules (job_type, enabled, cron_expression, priority, max_concurrency,
                 timeout_minutes, retry_attempts) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(job_type) DO UPDATE SET
                    enabled = excluded.enabled,
                    cron_expression = excluded.cron_expression,
                    priority = excluded.priority,
                    max_concurrency = excluded.max_concurrency,
                    timeout_minutes = excluded.timeout_minutes,
                    retry_attempts = excluded.retry_attempts",
                params![
                    schedule.job_type.as_str(),
                    schedule.enabled as i64,
                    schedule.cron_expression.clone(),
                    schedule.priority,
                    schedule.max_concurrency,
                    schedule.timeout_minutes,
                    schedule.retry_attempts,
                ],
            )
            .await?;
        Ok(())
    }

    pub async fn list_enabled(&self) -> Result<Vec<JobSchedule>, DbError> {
        let connection = self.client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT job_type, enabled, cron_expression, priority, max_concurrency, timeout_minutes,
                 retry_attempts FROM job_schedules WHERE enabled = 1",
                (),
            )
            .await?;
        let mut schedules = Vec::new();
        while let Some(row) = rows.next().await? {
            schedules.push(Self::map_row(&row)?);
        }
        Ok(schedules)
    }

    pub async fn find_by_type(&self, job_type: JobType) -> Result<Option<JobSchedule>, DbError> {
        let connection = self.client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT job_type, enabled, cron_expression, priority, max_concurrency, timeout_minutes,
                 retry_attempts FROM job_schedules WHERE job_type = ?1",
                params![job_type.as_str()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Self::map_row(&row)?)),
            None => Ok(None),
        }
    }

    fn map_row(row: &Row) -> Result<JobSchedule, DbError> {
        let job_type_raw: String = row.get(0)?;
        Ok(JobSchedule {
            job_type: job_type_raw.parse().map_err(DbError::Mapping)?,
            enabled: row.get::<i64>(1)? != 0,
            cron_expression: row.get(2)?,
            priority: row.get::<i64>(3)? as u8,
            max_concurrency: row.get::<i64>(4)? as u32,
            timeout_minutes: row.get::<i64>(5)? as u32,
            retry_attempts: row.get::<i64>(6)? as u32,
        })
    }
}
