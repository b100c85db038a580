// [libs/infra/db/src/repositories/rate_limit_repository.rs]
//! Rate limit rule CRUD. Enforcement itself lives in the admission
//! middleware; this repository only manages the rule table.

use crate::client::DbClient;
use crate::errors::DbError;
use libsql::{params, Row};
use syncd_domain_models::rate_limit::{HttpMethodPattern, RateLimitRule};
use tracing::instrument;

pub struct RateLimitRuleRepository {
    client: DbClient,
}

impl RateLimitRuleRepository {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        endpoint_pattern: &str,
        method: HttpMethodPattern,
        limit_count: u32,
        window_seconds: u32,
    ) -> Result<RateLimitRule, DbError> {
        let connection = self.client.get_connection()?;
        let id = uuid::Uuid::new_v4().to_string();
        connection
            .execute(
                "INSERT INTO rate_limit_rules (id, endpoint_pattern, method, limit_count, window_seconds, enabled)
                 VALUES (?1, ?2, ?3, ?4, ?5, 1)",
                params![id.clone(), endpoint_pattern, method.as_str(), limit_count, window_seconds],
            )
            .await?;
        self.find_by_id(&id).await?.ok_or(DbError::NotFound)
    }

    const SELECT_COLUMNS: &'static str =
        "id, endpoint_pattern, method, limit_count, window_seconds, enabled, created_at, updated_at";

    pub async fn find_by_id(&self, id: &str) -> Result<Option<RateLimitRule>, DbError> {
        let connection = self.client.get_connection()?;
        let sql = format!("SELECT {} FROM rate_limit_rules WHERE id = ?1", Self::SELECT_COLUMNS);
        let mut rows = connection.query(&sql, params![id]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Self::map_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list(&self) -> Result<Vec<RateLimitRule>, DbError> {
        let connection = self.client.get_connection()?;
        let sql = format!("SELECT {} FROM rate_limit_rules ORDER BY created_at ASC", Self::SELECT_COLUMNS);
        let mut rows = connection.query(&sql, ()).await?;
        let mut rules = Vec::new();
        while let Some(row) = rows.next().await? {
            rules.push(Self::map_row(&row)?);
        }
        Ok(rules)
    }

    pub async fn list_enabled(&self) -> Result<Vec<RateLimitRule>, DbError> {
        let connection = self.client.get_connection()?;
        let sql = format!("SELECT {} FROM rate_limit_rules WHERE enabled = 1", Self::SELECT_COLUMNS);
        let mut rows = connection.query(&sql, ()).await?;
        let mut rules = Vec::new();
        while let Some(row) = rows.next().await? {
            rules.push(Self::map_row(&row)?);
        }
        Ok(rules)
    }

    pub async fn update(
        &self,
        id: &str,
        limit_count: u32,
        window_seconds: u32,
        enabled: bool,
    ) -> Result<(), DbError> {
        let connection = self.client.get_connection()?;
        let updated = connection
            .execute(
                "UPDATE rate_limit_rules SET limit_count = ?2, window_seconds = ?3, enabled = ?4,
                 updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
                params![id, limit_count, window_seconds, enabled as i64],
            )
            .await?;
        if updated == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    /// Returns the deleted rule so the caller can purge its live in-memory
    /// counters for the same `(pattern, method)` key.
    pub async fn delete(&self, id: &str) -> Result<RateLimitRule, DbError> {
        let rule = self.find_by_id(id).await?.ok_or(DbError::NotFound)?;
        let connection = self.client.get_connection()?;
        connection.execute("DELETE FROM rate_limit_rules WHERE id = ?1", params![id]).await?;
        Ok(rule)
    }

    fn map_row(row: &Row) -> Result<RateLimitRule, DbError> {
        let method_label: String = row.get(2)?;
        let method: HttpMethodPattern = method_label.parse().map_err(DbError::Mapping)?;
        Ok(RateLimitRule {
            id: row.get(0)?,
            endpoint_pattern: row.get(1)?,
            method,
            limit_count: row.get::<i64>(3)? as u32,
            window_seconds: row.get::<i64>(4)? as u32,
            enabled: row.get::<i64>(5)? != 0,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}
