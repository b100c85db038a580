// [apps/gateway/src/errors.rs]
/*!
 * MODULE: API ERROR TAXONOMY
 * LAYER: APPLICATION (L4)
 * RESPONSIBILITY: SINGLE FAILURE ENUM AND ITS WIRE MAPPING
 *
 * Every handler returns `Result<T, ApiError>`. The `IntoResponse` impl is
 * the one place that decides a Rust error becomes a given HTTP status and
 * `{success, error: {kind, message, details}}` envelope.
 */

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use syncd_db::DbError;
use syncd_http_client::UpstreamError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("rate limit exceeded, retry after {retry_after_seconds}s")]
    RateLimited {
        retry_after_seconds: u64,
        limit: u32,
        reset_at: i64,
    },

    #[error("upstream provider error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("storage error: {0}")]
    Storage(#[from] DbError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "ValidationError",
            ApiError::Auth(_) => "AuthError",
            ApiError::Forbidden(_) => "ForbiddenError",
            ApiError::NotFound(_) => "NotFoundError",
            ApiError::Conflict(_) => "ConflictError",
            ApiError::RateLimited { .. } => "RateLimitError",
            ApiError::Upstream(_) => "UpstreamError",
            ApiError::Storage(_) => "StorageError",
            ApiError::Internal(_) => "InternalError",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Storage(DbError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Storage(DbError::Conflict(_)) => StatusCode::CONFLICT,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            ApiError::RateLimited { retry_after_seconds, limit, reset_at } => Some(serde_json::json!({
                "retry_after_seconds": retry_after_seconds,
                "limit": limit,
                "reset_at": reset_at,
            })),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    kind: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        let details = self.details();
        let message = self.to_string();

        if let ApiError::Storage(ref db_error) = self {
            tracing::error!(error = %db_error, "storage error surfaced to client");
        }

        let mut response = (status, Json(ErrorBody { success: false, error: ErrorDetail { kind, message, details } })).into_response();

        if let ApiError::RateLimited { retry_after_seconds, .. } = self {
            response.headers_mut().insert("Retry-After", retry_after_seconds.into());
        }
        response
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
