// [apps/gateway/src/routes/users.rs]
//! Admin user CRUD, stats, permissions, and audit log listing.

use std::collections::HashSet;

use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::{Extension, Json};
use serde::Deserialize;
use syncd_db::AuditFilters;
use syncd_domain_models::admin_user::AdminRole;

use crate::errors::ApiError;
use crate::middleware::auth_guard::{require_permission, OperatorIdentity};
use crate::routes::response::{ok, ok_message};
use crate::services::user_service::UserService;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    email: String,
    password: String,
    #[serde(rename = "firstName")]
    first_name: Option<String>,
    #[serde(rename = "lastName")]
    last_name: Option<String>,
    role: AdminRole,
}

pub async fn list(State(state): State<AppState>, Extension(identity): Extension<OperatorIdentity>) -> Result<Response, ApiError> {
    require_permission(&identity, "read:users")?;
    let users = UserService { state: &state }.list().await?;
    Ok(ok(users))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<OperatorIdentity>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Response, ApiError> {
    require_permission(&identity, "create:users")?;
    let user = UserService { state: &state }
        .create(&identity.user_id, &request.email, &request.password, request.first_name.as_deref(), request.last_name.as_deref(), request.role)
        .await?;
    Ok(ok(user))
}

pub async fn find(State(state): State<AppState>, Extension(identity): Extension<OperatorIdentity>, Path(user_id): Path<String>) -> Result<Response, ApiError> {
    require_permission(&identity, "read:users")?;
    let user = UserService { state: &state }.find(&user_id).await?;
    Ok(ok(user))
}

#[derive(Deserialize)]
pub struct UpdateRoleRequest {
    role: AdminRole,
    #[serde(default)]
    permissions: HashSet<String>,
}

pub async fn update_role(
    State(state): State<AppState>,
    Extension(identity): Extension<OperatorIdentity>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Response, ApiError> {
    require_permission(&identity, "update:users")?;
    UserService { state: &state }.update_role(&identity.user_id, &user_id, request.role, request.permissions).await?;
    Ok(ok_message("role updated"))
}

#[derive(Deserialize)]
pub struct SetActiveRequest {
    active: bool,
}

pub async fn set_active(
    State(state): State<AppState>,
    Extension(identity): Extension<OperatorIdentity>,
    Path(user_id): Path<String>,
    Json(request): Json<SetActiveRequest>,
) -> Result<Response, ApiError> {
    require_permission(&identity, "update:users")?;
    UserService { state: &state }.set_active(&identity.user_id, &user_id, request.active).await?;
    Ok(ok_message(if request.active { "user activated" } else { "user deactivated" }))
}

pub async fn delete(State(state): State<AppState>, Extension(identity): Extension<OperatorIdentity>, Path(user_id): Path<String>) -> Result<Response, ApiError> {
    require_permission(&identity, "delete:users")?;
    UserService { state: &state }.delete(&identity.user_id, &user_id).await?;
    Ok(ok_message("user deleted"))
}

pub async fn permissions(State(state): State<AppState>, Extension(identity): Extension<OperatorIdentity>, Path(user_id): Path<String>) -> Result<Response, ApiError> {
    require_permission(&identity, "read:users")?;
    let user = UserService { state: &state }.find(&user_id).await?;
    Ok(ok(user.effective_permissions()))
}

pub async fn stats(State(state): State<AppState>, Extension(identity): Extension<OperatorIdentity>) -> Result<Response, ApiError> {
    require_permission(&identity, "read:users")?;
    let users = UserService { state: &state }.list().await?;
    let active = users.iter().filter(|u| u.active).count();
    let by_role = |role: AdminRole| users.iter().filter(|u| u.role == role).count();
    Ok(ok(serde_json::json!({
        "total": users.len(),
        "active": active,
        "inactive": users.len() - active,
        "byRole": {
            "super_admin": by_role(AdminRole::SuperAdmin),
            "admin": by_role(AdminRole::Admin),
            "editor": by_role(AdminRole::Editor),
            "viewer": by_role(AdminRole::Viewer),
        },
    })))
}

#[derive(Deserialize)]
pub struct AuditLogQuery {
    #[serde(rename = "userId")]
    user_id: Option<String>,
    action: Option<String>,
    limit: Option<u32>,
}

pub async fn audit_logs(State(state): State<AppState>, Extension(identity): Extension<OperatorIdentity>, Query(query): Query<AuditLogQuery>) -> Result<Response, ApiError> {
    require_permission(&identity, "read:users")?;
    let filters = AuditFilters { user_id: query.user_id, resource: Some("admin_user".to_string()), action: query.action, limit: query.limit.unwrap_or(100) };
    let entries = state.audit_log.list(&filters).await?;
    Ok(ok(entries))
}
