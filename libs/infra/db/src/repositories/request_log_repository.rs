// [libs/infra/db/src/repositories/request_log_repository.rs]
/*!
 * MODULE: REQUEST LOG REPOSITORY
 * LAYER: INFRASTRUCTURE ADAPTER (L3)
 * RESPONSIBILITY: REQUEST AUDIT TRAIL AND THE DURABLE CLIENT-IP MIRROR
 *
 * `client_ip_stats` is a best-effort durable mirror of the in-process rate
 * counter, not the source of truth for admission decisions — it exists so
 * `/monitoring/ip-stats` survives a restart, nothing more.
 */

use crate::client::DbClient;
use crate::errors::DbError;
use libsql::{params, Row};
use syncd_domain_models::request_log::{ClientIpStat, RequestLogEntry};
use tracing::instrument;

pub struct RequestLogRepository {
    client: DbClient,
}

impl RequestLogRepository {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn record(
        &self,
        ip: &str,
        method: &str,
        endpoint: &str,
        status_code: u16,
        latency_ms: u64,
        user_agent: Option<&str>,
    ) -> Result<(), DbError> {
        let connection = self.client.get_connection()?;
        let id = uuid::Uuid::new_v4().to_string();
        connection
            .execute(
                "INSERT INTO request_log_entries (id, ip, method, endpoint, status_code, latency_ms, user_agent)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![id, ip, method, endpoint, status_code, latency_ms as i64, user_agent],
            )
            .await?;

        let is_error = status_code >= 400;
        connection
            .execute(
                "INSERT INTO client_ip_stats (ip, request_count, error_count, last_request_at, blocked)
                 VALUES (?1, 1, ?2, CURRENT_TIMESTAMP, 0)
                 ON CONFLICT(ip) DO UPDATE SET
                    request_count = request_count + 1,
                    error_count = error_count + excluded.error_count,
                    last_request_at = CURRENT_TIMESTAMP",
                params![ip, is_error as i64],
            )
            .await?;
        Ok(())
    }

    pub async fn mark_blocked(&self, ip: &str, blocked: bool) -> Result<(), DbError> {
        let connection = self.client.get_connection()?;
        connection
            .execute(
                "INSERT INTO client_ip_stats (ip, blocked, last_request_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
                 ON CONFLICT(ip) DO UPDATE SET blocked = excluded.blocked",
                params![ip, blocked as i64],
            )
            .await?;
        Ok(())
    }

    pub async fn list_stats(&self, limit: u32) -> Result<Vec<ClientIpStat>, DbError> {
        let connection = self.client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT ip, request_count, error_count, last_request_at, blocked
                 FROM client_ip_stats ORDER BY last_request_at DESC LIMIT ?1",
                params![limit as i64],
            )
            .await?;
        let mut stats = Vec::new();
        while let Some(row) = rows.next().await? {
            stats.push(Self::map_stat_row(&row)?);
        }
        Ok(stats)
    }

    pub async fn list_recent(&self, limit: u32) -> Result<Vec<RequestLogEntry>, DbError> {
        let connection = self.client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, ip, method, endpoint, status_code, latency_ms, user_agent, received_at
                 FROM request_log_entries ORDER BY received_at DESC LIMIT ?1",
                params![limit as i64],
            )
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(Self::map_entry_row(&row)?);
        }
        Ok(entries)
    }

    fn map_stat_row(row: &Row) -> Result<ClientIpStat, DbError> {
        Ok(ClientIpStat {
            ip: row.get(0)?,
            request_count: row.get::<i64>(1)? as u64,
            error_count: row.get::<i64>(2)? as u64,
            last_request_at: row.get(3)?,
            blocked: row.get::<i64>(4)? != 0,
        })
    }

    fn map_entry_row(row: &Row) -> Result<RequestLogEntry, DbError> {
        Ok(RequestLogEntry {
            id: row.get(0)?,
            ip: row.get(1)?,
            method: row.get(2)?,
            endpoint: row.get(3)?,
            status_code: row.get::<i64>(4)? as u16,
            latency_ms: row.get::<i64>(5)? as u64,
            user_agent: row.get(6)?,
            received_at: row.get(7)?,
        })
    }
}
