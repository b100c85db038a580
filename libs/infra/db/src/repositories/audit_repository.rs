// [libs/infra/db/src/repositories/audit_repository.rs]
//! Append-only audit trail writer and reader.

use crate::client::DbClient;
use crate::errors::DbError;
use libsql::{params, Row};
use syncd_domain_models::audit::{redact_detail, AuditLogEntry};
use tracing::instrument;

pub struct AuditRepository {
    client: DbClient,
}

#[derive(Debug, Clone, Default)]
pub struct AuditFilters {
    pub user_id: Option<String>,
    pub resource: Option<String>,
    pub action: Option<String>,
    pub limit: u32,
}

impl AuditRepository {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, detail))]
    pub async fn record(
        &self,
        user_id: Option<&str>,
        action: &str,
        resource: &str,
        resource_id: Option<&str>,
        detail: serde_json::Value,
        ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<(), DbError> {
        let connection = self.client.get_connection()?;
        let id = uuid::Uuid::new_v4().to_string();
        let redacted = redact_detail(detail);
        let detail_json = serde_json::to_string(&redacted).map_err(|e| DbError::Mapping(e.to_string()))?;
        connection
            .execute(
                "INSERT INTO audit_log_entries (id, user_id, action, resource, resource_id, detail, ip, user_agent)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![id, user_id, action, resource, resource_id, detail_json, ip, user_agent],
            )
            .await?;
        Ok(())
    }

    pub async fn list(&self, filters: &AuditFilters) -> Result<Vec<AuditLogEntry>, DbError> {
        let connection = self.client.get_connection()?;
        let mut sql = String::from(
            "SELECT id, user_id, action, resource, resource_id, detail, ip, user_agent, created_at
             FROM audit_log_entries WHERE 1=1",
        );
        let mut bound: Vec<libsql::Value> = Vec::new();

        if let Some(user_id) = &filters.user_id {
            bound.push(user_id.clone().into());
            sql.push_str(&format!(" AND user_id = ?{}", bound.len()));
        }
        if let Some(resource) = &filters.resource {
            bound.push(resource.clone().into());
            sql.push_str(&format!(" AND resource = ?{}", bound.len()));
        }
        if let Some(action) = &filters.action {
            bound.push(action.clone().into());
            sql.push_str(&format!(" AND action = ?{}", bound.len()));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let limit = if filters.limit == 0 { 100 } else { filters.limit };
        bound.push((limit as i64).into());
        sql.push_str(&format!(" LIMIT ?{}", bound.len()));

        let mut rows = connection.query(&sql, bound).await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(Self::map_row(&row)?);
        }
        Ok(entries)
    }

    fn map_row(row: &Row) -> Result<AuditLogEntry, DbError> {
        let detail_raw: String = row.get(5)?;
        let detail = serde_json::from_str(&detail_raw).unwrap_or(serde_json::Value::Null);
        Ok(AuditLogEntry {
            id: row.get(0)?,
            user_id: row.get(1)?,
            action: row.get(2)?,
            resource: row.get(3)?,
            resource_id: row.get(4)?,
            detail,
            ip: row.get(6)?,
            user_agent: row.get(7)?,
            created_at: row.get(8)?,
        })
    }
}
