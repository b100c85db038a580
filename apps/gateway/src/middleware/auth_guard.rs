// [apps/gateway/src/middleware/auth_guard.rs]
/*!
 * MODULE: AUTHENTICATION GUARD
 * LAYER: APPLICATION MIDDLEWARE (L4)
 * RESPONSIBILITY: BEARER TOKEN VALIDATION AND OPERATOR IDENTITY INJECTION
 *
 * Unlike the dual worker-token/JWT scheme this pattern descends from, this
 * surface has exactly one caller type (an authenticated admin operator), so
 * the guard only ever decodes and verifies a signed access token.
 */

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::errors::ApiError;
use crate::services::auth_service::{decode_access_token, AccessTokenClaims};
use crate::state::AppState;

/// The authenticated operator behind the current request, injected into
/// request extensions by [`auth_guard`]. Handlers pull it out with
/// `Extension<OperatorIdentity>`.
#[derive(Debug, Clone)]
pub struct OperatorIdentity {
    pub user_id: String,
    pub email: String,
    pub permissions: Vec<String>,
}

impl OperatorIdentity {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|held| held == permission || held == "*")
    }
}

impl From<AccessTokenClaims> for OperatorIdentity {
    fn from(claims: AccessTokenClaims) -> Self {
        Self { user_id: claims.sub, email: claims.email, permissions: claims.permissions }
    }
}

pub async fn auth_guard(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Auth("missing authorization header".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Auth("authorization header must use the Bearer scheme".to_string()))?;

    let claims = decode_access_token(&state, token)?;
    req.extensions_mut().insert(OperatorIdentity::from(claims));

    Ok(next.run(req).await)
}

/// Returns a [`ApiError::Forbidden`] unless the identity carries `permission`.
/// Called at the top of handlers whose permission requirement is narrower
/// than "any authenticated operator".
pub fn require_permission(identity: &OperatorIdentity, permission: &str) -> Result<(), ApiError> {
    if identity.has_permission(permission) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!("missing required permission: {permission}")))
    }
}
