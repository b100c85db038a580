// [apps/gateway/src/services/user_service.rs]
/*!
 * MODULE: ADMIN USER MANAGEMENT
 * LAYER: APPLICATION SERVICE (L4)
 * RESPONSIBILITY: OPERATOR CRUD WITH THE SUPER-ADMIN INVARIANT
 *
 * `≥ 1 active super_admin always exists` cannot be expressed as a single
 * `UPDATE ... WHERE` guard the way job transitions are, since the
 * violating condition spans every row, not one. This module reads the
 * live count before any deactivation, role change, or delete that could
 * drop it to zero and rejects the call with `ConflictError` rather than
 * let it through and reconcile after the fact.
 */

use std::collections::HashSet;

use serde_json::Value;
use syncd_domain_models::admin_user::{AdminRole, AdminUser};
use tracing::instrument;

use crate::errors::ApiError;
use crate::services::auth_service::{enforce_password_policy, hash_password};
use crate::state::AppState;

pub struct UserService<'a> {
    pub state: &'a AppState,
}

impl<'a> UserService<'a> {
    #[instrument(skip(self, password))]
    pub async fn create(
        &self,
        actor_id: &str,
        email: &str,
        password: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        role: AdminRole,
    ) -> Result<AdminUser, ApiError> {
        if self.state.admin_users.find_by_email(email).await?.is_some() {
            return Err(ApiError::Conflict(format!("an account already exists for {email}")));
        }
        enforce_password_policy(password)?;
        let password_hash = hash_password(password, self.state.config.bcrypt_cost)?;

        let user = self.state.admin_users.create(email, &password_hash, first_name, last_name, role).await?;
        self.audit(actor_id, "create", &user.id, serde_json::json!({ "email": email, "role": role.to_string() })).await;
        Ok(user)
    }

    pub async fn list(&self) -> Result<Vec<AdminUser>, ApiError> {
        self.state.admin_users.list().await.map_err(Into::into)
    }

    pub async fn find(&self, user_id: &str) -> Result<AdminUser, ApiError> {
        self.state.admin_users.find_by_id(user_id).await?.ok_or_else(|| ApiError::NotFound(format!("no admin user {user_id}")))
    }

    /// Rejects a role change away from `super_admin` that would leave the
    /// system with none.
    #[instrument(skip(self))]
    pub async fn update_role(&self, actor_id: &str, user_id: &str, role: AdminRole, permissions: HashSet<String>) -> Result<(), ApiError> {
        let user = self.find(user_id).await?;
        if user.role == AdminRole::SuperAdmin && role != AdminRole::SuperAdmin {
            self.guard_super_admin_invariant().await?;
        }

        self.state.admin_users.update_role(user_id, role, &permissions).await?;
        self.audit(actor_id, "update_role", user_id, serde_json::json!({ "role": role.to_string() })).await;
        Ok(())
    }

    /// Rejects deactivating the last active `super_admin`.
    #[instrument(skip(self))]
    pub async fn set_active(&self, actor_id: &str, user_id: &str, active: bool) -> Result<(), ApiError> {
        let user = self.find(user_id).await?;
        if !active && user.role == AdminRole::SuperAdmin && user.active {
            self.guard_super_admin_invariant().await?;
        }

        self.state.admin_users.set_active(user_id, active).await?;
        self.audit(actor_id, if active { "activate" } else { "deactivate" }, user_id, Value::Null).await;
        Ok(())
    }

    /// Rejects deleting the last active `super_admin`.
    #[instrument(skip(self))]
    pub async fn delete(&self, actor_id: &str, user_id: &str) -> Result<(), ApiError> {
        let user = self.find(user_id).await?;
        if user.role == AdminRole::SuperAdmin && user.active {
            self.guard_super_admin_invariant().await?;
        }

        self.state.admin_users.delete(user_id).await?;
        self.audit(actor_id, "delete", user_id, Value::Null).await;
        Ok(())
    }

    #[instrument(skip(self, new_password))]
    pub async fn change_password(&self, user_id: &str, current_password: &str, new_password: &str) -> Result<(), ApiError> {
        let user = self.find(user_id).await?;
        let matches = crate::services::auth_service::verify_password(current_password, &user.password_hash)?;
        if !matches {
            return Err(ApiError::Auth("current password is incorrect".to_string()));
        }
        enforce_password_policy(new_password)?;
        let password_hash = hash_password(new_password, self.state.config.bcrypt_cost)?;
        self.state.admin_users.update_password_hash(user_id, &password_hash).await?;
        self.audit(&user.id, "change_password", &user.id, Value::Null).await;
        Ok(())
    }

    /// The count only ever needs to exceed 1 here: the caller is about to
    /// remove exactly one active super_admin, so "at least 2 today" is the
    /// same test as "at least 1 after".
    async fn guard_super_admin_invariant(&self) -> Result<(), ApiError> {
        let active_super_admins = self.state.admin_users.count_active_super_admins().await?;
        if active_super_admins <= 1 {
            return Err(ApiError::Conflict("at least one active super_admin must always exist".to_string()));
        }
        Ok(())
    }

    async fn audit(&self, actor_id: &str, action: &str, resource_id: &str, detail: Value) {
        if let Err(error) = self.state.audit_log.record(Some(actor_id), action, "admin_user", Some(resource_id), detail, None, None).await {
            tracing::error!(%error, "failed to write audit log entry");
        }
    }
}
