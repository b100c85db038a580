// [apps/gateway/src/services/auth_service.rs]
/*!
 * MODULE: AUTH SUBSTRATE
 * LAYER: APPLICATION SERVICE (L4)
 * RESPONSIBILITY: PASSWORD HASHING, TOKEN ISSUANCE, REFRESH ROTATION
 *
 * Access tokens are stateless HS256 JWTs; refresh tokens are also JWTs but
 * carry a `jti` that must match `admin_users.current_refresh_token_id`, so
 * a single refresh token can be revoked by overwriting that column without
 * needing a server-side token blacklist.
 */

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use syncd_domain_models::admin_user::{validate_password, AdminRole, AdminUser, PasswordPolicyError};

use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub email: String,
    pub role: AdminRole,
    pub permissions: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    pub sub: String,
    pub jti: String,
    pub token_type: String,
    pub exp: i64,
    pub iat: i64,
}

pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires_in: i64,
}

fn validation() -> Validation {
    Validation::new(Algorithm::HS256)
}

/// Hashes a plaintext password at the configured bcrypt cost.
pub fn hash_password(password: &str, cost: u32) -> Result<String, ApiError> {
    bcrypt::hash(password, cost).map_err(|error| ApiError::Internal(format!("failed to hash password: {error}")))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    bcrypt::verify(password, hash).map_err(|error| ApiError::Internal(format!("failed to verify password: {error}")))
}

/// Enforces the password policy, translating every violation into one
/// readable validation message.
pub fn enforce_password_policy(password: &str) -> Result<(), ApiError> {
    validate_password(password).map_err(|violations| {
        let joined = violations.iter().map(PasswordPolicyError::message).collect::<Vec<_>>().join("; ");
        ApiError::Validation(joined)
    })
}

/// Issues a fresh access/refresh pair and persists the refresh token's
/// `jti` as the user's currently-honored token, invalidating any prior one.
pub async fn issue_tokens(state: &AppState, user: &AdminUser) -> Result<IssuedTokens, ApiError> {
    let now = Utc::now();
    let access_expires_at = now + ChronoDuration::from_std(state.config.access_token_ttl).unwrap_or_default();
    let refresh_expires_at = now + ChronoDuration::from_std(state.config.refresh_token_ttl).unwrap_or_default();
    let jti = uuid::Uuid::new_v4().to_string();

    let access_claims = AccessTokenClaims {
        sub: user.id.clone(),
        email: user.email.clone(),
        role: user.role,
        permissions: user.effective_permissions().into_iter().collect(),
        exp: access_expires_at.timestamp(),
        iat: now.timestamp(),
    };
    let refresh_claims = RefreshTokenClaims {
        sub: user.id.clone(),
        jti: jti.clone(),
        token_type: "refresh".to_string(),
        exp: refresh_expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let access_token = encode(&Header::new(Algorithm::HS256), &access_claims, &state.jwt_keys.encoding)
        .map_err(|error| ApiError::Internal(format!("failed to sign access token: {error}")))?;
    let refresh_token = encode(&Header::new(Algorithm::HS256), &refresh_claims, &state.jwt_keys.encoding)
        .map_err(|error| ApiError::Internal(format!("failed to sign refresh token: {error}")))?;

    state.admin_users.set_refresh_token_id(&user.id, Some(&jti)).await?;

    Ok(IssuedTokens {
        access_token,
        refresh_token,
        access_token_expires_in: state.config.access_token_ttl.as_secs() as i64,
    })
}

pub fn decode_access_token(state: &AppState, token: &str) -> Result<AccessTokenClaims, ApiError> {
    let data: TokenData<AccessTokenClaims> = decode(token, &state.jwt_keys.decoding, &validation())
        .map_err(|error| ApiError::Auth(format!("invalid access token: {error}")))?;
    Ok(data.claims)
}

fn decode_refresh_token(state: &AppState, token: &str) -> Result<RefreshTokenClaims, ApiError> {
    let data: TokenData<RefreshTokenClaims> = decode(token, &state.jwt_keys.decoding, &validation())
        .map_err(|error| ApiError::Auth(format!("invalid refresh token: {error}")))?;
    if data.claims.token_type != "refresh" {
        return Err(ApiError::Auth("token is not a refresh token".to_string()));
    }
    Ok(data.claims)
}

/// Validates the refresh token against the stored `jti`, then rotates it:
/// the old token can never be replayed, since a new `jti` is committed in
/// the same call that issues the next pair.
pub async fn rotate_refresh_token(state: &AppState, refresh_token: &str) -> Result<(AdminUser, IssuedTokens), ApiError> {
    let claims = decode_refresh_token(state, refresh_token)?;
    let user = state
        .admin_users
        .find_by_id(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::Auth("user no longer exists".to_string()))?;

    if !user.active {
        return Err(ApiError::Auth("account is disabled".to_string()));
    }

    match &user.current_refresh_token_id {
        Some(current_jti) if *current_jti == claims.jti => {}
        _ => return Err(ApiError::Auth("refresh token has been revoked or already rotated".to_string())),
    }

    let tokens = issue_tokens(state, &user).await?;
    Ok((user, tokens))
}

pub async fn revoke_refresh_token(state: &AppState, user_id: &str) -> Result<(), ApiError> {
    state.admin_users.set_refresh_token_id(user_id, None).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hash = hash_password("Correct-Horse1!", 4).expect("hash");
        assert!(verify_password("Correct-Horse1!", &hash).expect("verify"));
        assert!(!verify_password("wrong", &hash).expect("verify"));
    }

    #[test]
    fn rejects_weak_password() {
        assert!(enforce_password_policy("short").is_err());
    }

    #[test]
    fn accepts_policy_compliant_password() {
        assert!(enforce_password_policy("Correct-Horse1!").is_ok());
    }
}
