// [apps/gateway/src/middleware/admission.rs]
/*!
 * MODULE: REQUEST ADMISSION PIPELINE
 * LAYER: APPLICATION MIDDLEWARE (L4)
 * RESPONSIBILITY: IP BLOCK → RATE LIMIT → HANDLER → REQUEST LOG, IN ORDER
 *
 * Every step before the handler can short-circuit the request; the log
 * emission step always runs, even on a short-circuit, so a blocked or
 * throttled request is never invisible to `/monitoring`. Storage failures
 * in steps 1-2 fail the pipeline open rather than deny traffic, since an
 * unavailable rule store should degrade availability, not correctness.
 */

use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use std::net::SocketAddr;
use syncd_domain_models::request_log::normalize_ip;
use syncd_domain_models::rate_limit::select_most_specific;

use crate::state::AppState;

fn client_ip(req: &Request) -> String {
    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim);

    let from_connect_info = req.extensions().get::<ConnectInfo<SocketAddr>>().map(|info| info.0.ip().to_string());

    normalize_ip(forwarded.or(from_connect_info.as_deref()))
}

pub async fn admission_pipeline(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let user_agent = req.headers().get(axum::http::header::USER_AGENT).and_then(|value| value.to_str().ok()).map(str::to_string);
    let ip = client_ip(&req);
    let now = Utc::now();

    if let Ok(Some(rule)) = state.ip_blocks.find_by_ip(&ip).await {
        if rule.is_active(now) {
            let response = axum::Json(serde_json::json!({
                "success": false,
                "error": {
                    "kind": "ForbiddenError",
                    "reason": rule.reason,
                    "expires_at": rule.expires_at,
                }
            }));
            let response = (axum::http::StatusCode::FORBIDDEN, response).into_response();
            emit_log(&state, &ip, &method, &path, response.status().as_u16(), started_at, user_agent.as_deref());
            return response;
        }
    }

    if let Ok(rules) = state.rate_limit_rules.list_enabled().await {
        if let Some(rule) = select_most_specific(&rules, &path, &method) {
            let decision = state.rate_limiter.check_and_increment(&ip, rule, now);

            if !decision.allowed {
                let retry_after_seconds = (decision.reset_at - now).num_seconds().max(0) as u64;
                let response = axum::Json(serde_json::json!({
                    "success": false,
                    "error": { "kind": "RateLimitError", "retry_after_seconds": retry_after_seconds }
                }));
                let mut response = (axum::http::StatusCode::TOO_MANY_REQUESTS, response).into_response();
                insert_rate_limit_headers(&mut response, decision.limit, decision.remaining, decision.reset_at.timestamp());
                response.headers_mut().insert("Retry-After", HeaderValue::from(retry_after_seconds));
                emit_log(&state, &ip, &method, &path, response.status().as_u16(), started_at, user_agent.as_deref());
                return response;
            }

            let mut response = next.run(req).await;
            insert_rate_limit_headers(&mut response, decision.limit, decision.remaining, decision.reset_at.timestamp());
            emit_log(&state, &ip, &method, &path, response.status().as_u16(), started_at, user_agent.as_deref());
            return response;
        }
    }

    let response = next.run(req).await;
    emit_log(&state, &ip, &method, &path, response.status().as_u16(), started_at, user_agent.as_deref());
    response
}

fn insert_rate_limit_headers(response: &mut Response, limit: u32, remaining: u32, reset_at: i64) {
    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Limit", HeaderValue::from(limit));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(remaining));
    headers.insert("X-RateLimit-Reset", HeaderValue::from(reset_at.max(0) as u64));
}

/// Fires the log write off the request's own future; ordering with respect
/// to the response the client sees is unspecified, so this is deliberately
/// not awaited inline.
fn emit_log(state: &AppState, ip: &str, method: &str, path: &str, status_code: u16, started_at: Instant, user_agent: Option<&str>) {
    let repository = state.request_log.clone();
    let ip = ip.to_string();
    let method = method.to_string();
    let path = path.to_string();
    let user_agent = user_agent.map(str::to_string);
    let latency_ms = started_at.elapsed().as_millis() as u64;

    tokio::spawn(async move {
        if let Err(error) = repository.record(&ip, &method, &path, status_code, latency_ms, user_agent.as_deref()).await {
            tracing::error!(%error, "failed to persist request log entry");
        }
    });
}
