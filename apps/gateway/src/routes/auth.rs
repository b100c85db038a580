// [apps/gateway/src/routes/auth.rs]
//! Login, refresh rotation, password change, and the public password
//! policy endpoint. Only these four routes are reachable without a bearer
//! token — see `routes::build_router`.

use axum::extract::State;
use axum::response::Response;
use axum::{Extension, Json};
use serde::Deserialize;
use syncd_domain_models::admin_user::password_requirements as list_password_requirements;

use crate::errors::ApiError;
use crate::middleware::auth_guard::OperatorIdentity;
use crate::routes::response::{ok, ok_message};
use crate::services::auth_service::{issue_tokens, revoke_refresh_token, rotate_refresh_token, verify_password};
use crate::services::user_service::UserService;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<Response, ApiError> {
    let user = state
        .admin_users
        .find_by_email(&request.email)
        .await?
        .ok_or_else(|| ApiError::Auth("invalid email or password".to_string()))?;

    if !user.active {
        return Err(ApiError::Auth("account is disabled".to_string()));
    }
    if !verify_password(&request.password, &user.password_hash)? {
        return Err(ApiError::Auth("invalid email or password".to_string()));
    }

    let tokens = issue_tokens(&state, &user).await?;
    state.admin_users.record_login(&user.id).await?;
    let _ = state
        .audit_log
        .record(Some(&user.id), "login", "admin_user", Some(&user.id), serde_json::Value::Null, None, None)
        .await;

    Ok(ok(serde_json::json!({
        "accessToken": tokens.access_token,
        "refreshToken": tokens.refresh_token,
        "expiresIn": tokens.access_token_expires_in,
        "user": { "id": user.id, "email": user.email, "role": user.role },
    })))
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    #[serde(rename = "refreshToken")]
    refresh_token: String,
}

pub async fn refresh(State(state): State<AppState>, Json(request): Json<RefreshRequest>) -> Result<Response, ApiError> {
    let (user, tokens) = rotate_refresh_token(&state, &request.refresh_token).await?;
    Ok(ok(serde_json::json!({
        "accessToken": tokens.access_token,
        "refreshToken": tokens.refresh_token,
        "expiresIn": tokens.access_token_expires_in,
        "user": { "id": user.id, "email": user.email, "role": user.role },
    })))
}

pub async fn logout(State(state): State<AppState>, Extension(identity): Extension<OperatorIdentity>) -> Result<Response, ApiError> {
    revoke_refresh_token(&state, &identity.user_id).await?;
    Ok(ok_message("logged out"))
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(rename = "currentPassword")]
    current_password: String,
    #[serde(rename = "newPassword")]
    new_password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(identity): Extension<OperatorIdentity>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Response, ApiError> {
    UserService { state: &state }.change_password(&identity.user_id, &request.current_password, &request.new_password).await?;
    Ok(ok_message("password changed"))
}

pub async fn password_requirements() -> Response {
    ok(list_password_requirements())
}
