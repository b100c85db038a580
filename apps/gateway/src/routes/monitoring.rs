// [apps/gateway/src/routes/monitoring.rs]
//! Rate-limit rule CRUD, IP block rule CRUD, and a request-log analytics
//! rollup.

use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::{Extension, Json};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use syncd_domain_models::rate_limit::HttpMethodPattern;

use crate::errors::ApiError;
use crate::middleware::auth_guard::{require_permission, OperatorIdentity};
use crate::routes::response::{ok, ok_message};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateRateLimitRuleRequest {
    #[serde(rename = "endpointPattern")]
    endpoint_pattern: String,
    method: HttpMethodPattern,
    #[serde(rename = "limitCount")]
    limit_count: u32,
    #[serde(rename = "windowSeconds")]
    window_seconds: u32,
}

pub async fn list_rate_limit_rules(State(state): State<AppState>, Extension(identity): Extension<OperatorIdentity>) -> Result<Response, ApiError> {
    require_permission(&identity, "manage:rate-limits")?;
    Ok(ok(state.rate_limit_rules.list().await?))
}

pub async fn create_rate_limit_rule(
    State(state): State<AppState>,
    Extension(identity): Extension<OperatorIdentity>,
    Json(request): Json<CreateRateLimitRuleRequest>,
) -> Result<Response, ApiError> {
    require_permission(&identity, "manage:rate-limits")?;
    if request.limit_count == 0 || request.window_seconds == 0 {
        return Err(ApiError::Validation("limitCount and windowSeconds must be positive".to_string()));
    }
    let rule = state.rate_limit_rules.create(&request.endpoint_pattern, request.method, request.limit_count, request.window_seconds).await?;
    Ok(ok(rule))
}

#[derive(Deserialize)]
pub struct UpdateRateLimitRuleRequest {
    #[serde(rename = "limitCount")]
    limit_count: u32,
    #[serde(rename = "windowSeconds")]
    window_seconds: u32,
    enabled: bool,
}

pub async fn update_rate_limit_rule(
    State(state): State<AppState>,
    Extension(identity): Extension<OperatorIdentity>,
    Path(id): Path<String>,
    Json(request): Json<UpdateRateLimitRuleRequest>,
) -> Result<Response, ApiError> {
    require_permission(&identity, "manage:rate-limits")?;
    state.rate_limit_rules.update(&id, request.limit_count, request.window_seconds, request.enabled).await?;
    Ok(ok_message("rate limit rule updated"))
}

/// Deletes the rule and purges its live in-process counters so a
/// re-created rule with the same endpoint/method starts with a clean
/// window instead of inheriting stale counts.
pub async fn delete_rate_limit_rule(State(state): State<AppState>, Extension(identity): Extension<OperatorIdentity>, Path(id): Path<String>) -> Result<Response, ApiError> {
    require_permission(&identity, "manage:rate-limits")?;
    let deleted = state.rate_limit_rules.delete(&id).await?;
    state.rate_limiter.purge_rule(&deleted.id);
    Ok(ok_message("rate limit rule deleted"))
}

#[derive(Deserialize)]
pub struct CreateIpBlockRequest {
    #[serde(rename = "ipAddress")]
    ip_address: String,
    reason: String,
    #[serde(rename = "expiresAt")]
    expires_at: Option<DateTime<Utc>>,
}

pub async fn list_ip_blocks(State(state): State<AppState>, Extension(identity): Extension<OperatorIdentity>) -> Result<Response, ApiError> {
    require_permission(&identity, "manage:ip-blocking")?;
    Ok(ok(state.ip_blocks.list().await?))
}

pub async fn create_ip_block(
    State(state): State<AppState>,
    Extension(identity): Extension<OperatorIdentity>,
    Json(request): Json<CreateIpBlockRequest>,
) -> Result<Response, ApiError> {
    require_permission(&identity, "manage:ip-blocking")?;
    let rule = state.ip_blocks.create(&request.ip_address, &request.reason, &identity.email, request.expires_at).await?;
    let _ = state
        .audit_log
        .record(Some(&identity.user_id), "block_ip", "ip_block_rule", Some(&rule.id), serde_json::json!({ "ip": rule.ip_address }), None, None)
        .await;
    Ok(ok(rule))
}

pub async fn delete_ip_block(State(state): State<AppState>, Extension(identity): Extension<OperatorIdentity>, Path(id): Path<String>) -> Result<Response, ApiError> {
    require_permission(&identity, "manage:ip-blocking")?;
    state.ip_blocks.delete(&id).await?;
    Ok(ok_message("ip block rule deleted"))
}

#[derive(Deserialize)]
pub struct AnalyticsQuery {
    #[serde(rename = "timeRange", default = "default_time_range")]
    time_range: String,
}

fn default_time_range() -> String {
    "24h".to_string()
}

fn window_for(time_range: &str) -> Duration {
    match time_range {
        "1h" => Duration::hours(1),
        "7d" => Duration::days(7),
        "30d" => Duration::days(30),
        _ => Duration::hours(24),
    }
}

/// Aggregates over the most recent request log entries kept in memory by
/// the repository layer; there is no time-bucketed index, so the window
/// is applied in-process over a bounded recent slice.
pub async fn analytics(State(state): State<AppState>, Extension(identity): Extension<OperatorIdentity>, Query(query): Query<AnalyticsQuery>) -> Result<Response, ApiError> {
    require_permission(&identity, "read:analytics")?;
    let window = window_for(&query.time_range);
    let cutoff = Utc::now() - window;

    let recent = state.request_log.list_recent(5000).await?;
    let windowed: Vec<_> = recent.into_iter().filter(|entry| entry.received_at >= cutoff).collect();

    let total_requests = windowed.len();
    let error_requests = windowed.iter().filter(|e| e.status_code >= 400).count();
    let blocked_requests = windowed.iter().filter(|e| e.status_code == 403 || e.status_code == 429).count();
    let average_latency_ms = if total_requests == 0 {
        0.0
    } else {
        windowed.iter().map(|e| e.latency_ms as f64).sum::<f64>() / total_requests as f64
    };

    let stats = state.ip_blocks.list().await?;

    Ok(ok(serde_json::json!({
        "timeRange": query.time_range,
        "totalRequests": total_requests,
        "errorRequests": error_requests,
        "blockedRequests": blocked_requests,
        "averageLatencyMs": average_latency_ms,
        "activeIpBlockRules": stats.iter().filter(|r| r.is_active(Utc::now())).count(),
    })))
}
