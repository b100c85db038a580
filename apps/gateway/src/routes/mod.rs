// [apps/gateway/src/routes/mod.rs]
/*!
 * MODULE: ADMIN CONTROL SURFACE ROUTING
 * LAYER: APPLICATION ADAPTER (L4)
 * RESPONSIBILITY: ROUTE TABLE AND MIDDLEWARE LAYERING
 *
 * Three public routes (login, refresh, password requirements) skip the
 * auth guard entirely; everything else sits behind it. The admission
 * pipeline wraps the whole router, including the public routes, so IP
 * blocking and rate limiting apply before a token is ever checked.
 */

pub mod auth;
pub mod cache;
pub mod job_control;
pub mod monitoring;
pub mod response;
pub mod summary;
pub mod sync;
pub mod users;

use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::admission::admission_pipeline;
use crate::middleware::auth_guard::auth_guard;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    let public = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/password-requirements", get(auth::password_requirements));

    let protected = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/change-password", post(auth::change_password))
        .route("/users", get(users::list).post(users::create))
        .route("/users/stats", get(users::stats))
        .route("/users/audit-logs", get(users::audit_logs))
        .route("/users/:id", get(users::find).put(users::update_role).delete(users::delete))
        .route("/users/:id/active", put(users::set_active))
        .route("/users/:id/permissions", get(users::permissions))
        .route("/summary", get(summary::summary))
        .route("/sync-logs", get(sync::sync_logs))
        .route("/sync/prayer/prewarm", post(sync::prewarm))
        .route("/sync/prayer/times", post(sync::prayer_times))
        .route("/sync/:module", post(sync::trigger))
        .route("/monitoring/api/rate-limits", get(monitoring::list_rate_limit_rules).post(monitoring::create_rate_limit_rule))
        .route("/monitoring/api/rate-limits/:id", put(monitoring::update_rate_limit_rule).delete(monitoring::delete_rate_limit_rule))
        .route("/monitoring/api/ip-blocking", get(monitoring::list_ip_blocks).post(monitoring::create_ip_block))
        .route("/monitoring/api/ip-blocking/:id", axum::routing::delete(monitoring::delete_ip_block))
        .route("/monitoring/api/analytics", get(monitoring::analytics))
        .route("/job-control/jobs", get(job_control::list).post(job_control::trigger))
        .route("/job-control/jobs/bulk", post(job_control::bulk))
        .route("/job-control/jobs/:id", get(job_control::find).put(job_control::patch).delete(job_control::delete))
        .route("/job-control/schedules", get(job_control::list_schedules))
        .route("/job-control/schedules/:jobType", put(job_control::update_schedule))
        .route("/job-control/queue-status", get(job_control::queue_status))
        .route("/cache/clear", post(cache::clear))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest(
            "/admin",
            public.merge(protected).layer(middleware::from_fn_with_state(state.clone(), admission_pipeline)),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Convenience wrapper used by `main.rs` to serve the router with
/// client-address extraction enabled (needed by the admission pipeline's
/// `ConnectInfo` fallback).
pub async fn serve(router: Router, port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "gateway listening");
    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>()).await
}
