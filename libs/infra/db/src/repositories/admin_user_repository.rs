// [libs/infra/db/src/repositories/admin_user_repository.rs]
/*!
 * MODULE: ADMIN USER REPOSITORY
 * LAYER: INFRASTRUCTURE ADAPTER (L3)
 * RESPONSIBILITY: OPERATOR ACCOUNT PERSISTENCE AND REFRESH TOKEN ROTATION
 */

use crate::client::DbClient;
use crate::errors::DbError;
use libsql::{params, Row};
use std::collections::HashSet;
use syncd_domain_models::admin_user::{AdminRole, AdminUser};
use tracing::instrument;

pub struct AdminUserRepository {
    client: DbClient,
}

impl AdminUserRepository {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, password_hash))]
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        role: AdminRole,
    ) -> Result<AdminUser, DbError> {
        let connection = self.client.get_connection()?;
        let id = uuid::Uuid::new_v4().to_string();
        connection
            .execute(
                "INSERT INTO admin_users (id, email, password_hash, first_name, last_name, role, active)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1)",
                params![id.clone(), email, password_hash, first_name, last_name, role.to_string()],
            )
            .await?;
        self.find_by_id(&id).await?.ok_or(DbError::NotFound)
    }

    const SELECT_COLUMNS: &'static str = "id, email, password_hash, first_name, last_name, role, permissions, \
         active, last_login_at, current_refresh_token_id, created_at, updated_at";

    pub async fn find_by_email(&self, email: &str) -> Result<Option<AdminUser>, DbError> {
        let connection = self.client.get_connection()?;
        let sql = format!("SELECT {} FROM admin_users WHERE email = ?1", Self::SELECT_COLUMNS);
        let mut rows = connection.query(&sql, params![email]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Self::map_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<AdminUser>, DbError> {
        let connection = self.client.get_connection()?;
        let sql = format!("SELECT {} FROM admin_users WHERE id = ?1", Self::SELECT_COLUMNS);
        let mut rows = connection.query(&sql, params![id]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Self::map_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list(&self) -> Result<Vec<AdminUser>, DbError> {
        let connection = self.client.get_connection()?;
        let sql = format!("SELECT {} FROM admin_users ORDER BY created_at ASC", Self::SELECT_COLUMNS);
        let mut rows = connection.query(&sql, ()).await?;
        let mut users = Vec::new();
        while let Some(row) = rows.next().await? {
            users.push(Self::map_row(&row)?);
        }
        Ok(users)
    }

    /// Persists the new refresh token id, or clears it with `None` on logout.
    /// Refresh rotation compares the incoming token's `jti` against this
    /// column; a mismatch means the token was already rotated or revoked.
    #[instrument(skip(self))]
    pub async fn set_refresh_token_id(&self, user_id: &str, refresh_token_id: Option<&str>) -> Result<(), DbError> {
        let connection = self.client.get_connection()?;
        let updated = connection
            .execute(
                "UPDATE admin_users SET current_refresh_token_id = ?2, updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
                params![user_id, refresh_token_id],
            )
            .await?;
        if updated == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    pub async fn record_login(&self, user_id: &str) -> Result<(), DbError> {
        let connection = self.client.get_connection()?;
        connection
            .execute(
                "UPDATE admin_users SET last_login_at = CURRENT_TIMESTAMP WHERE id = ?1",
                params![user_id],
            )
            .await?;
        Ok(())
    }

    pub async fn set_active(&self, user_id: &str, active: bool) -> Result<(), DbError> {
        let connection = self.client.get_connection()?;
        let updated = connection
            .execute(
                "UPDATE admin_users SET active = ?2, updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
                params![user_id, active as i64],
            )
            .await?;
        if updated == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    pub async fn update_password_hash(&self, user_id: &str, password_hash: &str) -> Result<(), DbError> {
        let connection = self.client.get_connection()?;
        let updated = connection
            .execute(
                "UPDATE admin_users SET password_hash = ?2, updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
                params![user_id, password_hash],
            )
            .await?;
        if updated == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    pub async fn update_role(&self, user_id: &str, role: AdminRole, permissions: &HashSet<String>) -> Result<(), DbError> {
        let connection = self.client.get_connection()?;
        let serialized = permissions.iter().cloned().collect::<Vec<_>>().join(",");
        let updated = connection
            .execute(
                "UPDATE admin_users SET role = ?2, permissions = ?3, updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
                params![user_id, role.to_string(), serialized],
            )
            .await?;
        if updated == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    /// Count of active `super_admin` accounts, used to guard the invariant
    /// that at least one must always remain (block the deactivation,
    /// role-change, or deletion that would drop this to zero).
    pub async fn count_active_super_admins(&self) -> Result<i64, DbError> {
        let connection = self.client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT COUNT(*) FROM admin_users WHERE role = ?1 AND active = 1",
                params![AdminRole::SuperAdmin.to_string()],
            )
            .await?;
        let row = rows.next().await?.ok_or(DbError::NotFound)?;
        Ok(row.get(0)?)
    }

    pub async fn delete(&self, user_id: &str) -> Result<(), DbError> {
        let connection = self.client.get_connection()?;
        let deleted = connection
            .execute("DELETE FROM admin_users WHERE id = ?1", params![user_id])
            .await?;
        if deleted == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    fn map_row(row: &Row) -> Result<AdminUser, DbError> {
        let role_label: String = row.get(5)?;
        let role: AdminRole = role_label.parse().map_err(DbError::Mapping)?;
        let permissions_raw: Option<String> = row.get(6)?;
        let permissions: HashSet<String> = permissions_raw
            .map(|raw| raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        Ok(AdminUser {
            id: row.get(0)?,
            email: row.get(1)?,
            password_hash: row.get(2)?,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            role,
            permissions,
            active: row.get::<i64>(7)? != 0,
            last_login_at: row.get(8)?,
            current_refresh_token_id: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }
}
