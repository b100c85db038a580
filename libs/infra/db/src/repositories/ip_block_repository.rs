// [libs/infra/db/src/repositories/ip_block_repository.rs]
//! IP block rule CRUD and the single lookup the admission middleware needs.

use crate::client::DbClient;
use crate::errors::DbError;
use libsql::{params, Row};
use syncd_domain_models::ip_block::IpBlockRule;
use tracing::instrument;

pub struct IpBlockRepository {
    client: DbClient,
}

impl IpBlockRepository {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        ip_address: &str,
        reason: &str,
        blocked_by: &str,
        expires_at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<IpBlockRule, DbError> {
        let connection = self.client.get_connection()?;
        let id = uuid::Uuid::new_v4().to_string();
        connection
            .execute(
                "INSERT INTO ip_block_rules (id, ip_address, reason, blocked_by, expires_at, enabled)
                 VALUES (?1, ?2, ?3, ?4, ?5, 1)
                 ON CONFLICT(ip_address) DO UPDATE SET
                    reason = excluded.reason,
                    blocked_by = excluded.blocked_by,
                    blocked_at = CURRENT_TIMESTAMP,
                    expires_at = excluded.expires_at,
                    enabled = 1",
                params![id, ip_address, reason, blocked_by, expires_at],
            )
            .await?;
        self.find_by_ip(ip_address).await?.ok_or(DbError::NotFound)
    }

    const SELECT_COLUMNS: &'static str = "id, ip_address, reason, blocked_by, blocked_at, expires_at, enabled";

    pub async fn find_by_ip(&self, ip_address: &str) -> Result<Option<IpBlockRule>, DbError> {
        let connection = self.client.get_connection()?;
        let sql = format!("SELECT {} FROM ip_block_rules WHERE ip_address = ?1", Self::SELECT_COLUMNS);
        let mut rows = connection.query(&sql, params![ip_address]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Self::map_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list(&self) -> Result<Vec<IpBlockRule>, DbError> {
        let connection = self.client.get_connection()?;
        let sql = format!("SELECT {} FROM ip_block_rules ORDER BY blocked_at DESC", Self::SELECT_COLUMNS);
        let mut rows = connection.query(&sql, ()).await?;
        let mut rules = Vec::new();
        while let Some(row) = rows.next().await? {
            rules.push(Self::map_row(&row)?);
        }
        Ok(rules)
    }

    pub async fn set_enabled(&self, id: &str, enabled: bool) -> Result<(), DbError> {
        let connection = self.client.get_connection()?;
        let updated = connection
            .execute("UPDATE ip_block_rules SET enabled = ?2 WHERE id = ?1", params![id, enabled as i64])
            .await?;
        if updated == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), DbError> {
        let connection = self.client.get_connection()?;
        let deleted = connection.execute("DELETE FROM ip_block_rules WHERE id = ?1", params![id]).await?;
        if deleted == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    fn map_row(row: &Row) -> Result<IpBlockRule, DbError> {
        Ok(IpBlockRule {
            id: row.get(0)?,
            ip_address: row.get(1)?,
            reason: row.get(2)?,
            blocked_by: row.get(3)?,
            blocked_at: row.get(4)?,
            expires_at: row.get(5)?,
            enabled: row.get::<i64>(6)? != 0,
        })
    }
}
