// [apps/gateway/tests/admission_pipeline.rs]
//! Drives the admission middleware directly over a minimal router so the
//! IP-block-before-rate-limit ordering and header contract are exercised
//! without needing a real TCP listener.

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::middleware;
use axum::routing::get;
use axum::Router;
use syncd_db::DbClient;
use syncd_domain_models::rate_limit::HttpMethodPattern;
use syncd_gateway::middleware::admission::admission_pipeline;
use syncd_gateway::{AppConfig, AppState};
use tower::ServiceExt;

async fn test_state() -> AppState {
    let db = DbClient::connect(":memory:", None).await.expect("connect in-memory db");
    let config = AppConfig {
        database_url: ":memory:".to_string(),
        database_auth_token: None,
        listen_port: 0,
        jwt_signing_secret: "test-signing-secret-not-for-production".to_string(),
        access_token_ttl: Duration::from_secs(900),
        refresh_token_ttl: Duration::from_secs(7 * 24 * 60 * 60),
        bcrypt_cost: 4,
        bulk_chunk_size: 500,
        sync_gating_interval: Duration::from_secs(24 * 60 * 60),
        prayer_max_concurrency: 2,
        prayer_politeness_delay: (Duration::from_millis(1), Duration::from_millis(2)),
        prayer_retry_max_attempts: 1,
        prayer_retry_backoff_ms: 0,
        quran_translation_fallbacks: vec![],
        quran_api_base: "https://example.invalid".to_string(),
        hadith_api_base: "https://example.invalid".to_string(),
        prayer_api_base: "https://example.invalid".to_string(),
        gold_price_api_base: "https://example.invalid".to_string(),
        reciter_api_base: "https://example.invalid".to_string(),
    };
    AppState::new(config, db)
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/probe", get(|| async { "ok" }))
        .layer(middleware::from_fn_with_state(state.clone(), admission_pipeline))
        .with_state(state)
}

fn request_from(ip: &str) -> Request<Body> {
    let mut req = Request::builder().uri("/probe").body(Body::empty()).unwrap();
    let socket: SocketAddr = format!("{ip}:12345").parse().unwrap();
    req.extensions_mut().insert(ConnectInfo(socket));
    req
}

#[tokio::test]
async fn blocked_ip_never_reaches_the_handler_even_under_a_permissive_rate_limit() {
    let state = test_state().await;
    state.ip_blocks.create("203.0.113.7", "abuse", "tester", None).await.unwrap();

    let app = router(state);
    let response = app.oneshot(request_from("203.0.113.7")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn rate_limit_admits_up_to_the_configured_count_then_429s() {
    let state = test_state().await;
    state.rate_limit_rules.create("/probe", HttpMethodPattern::All, 2, 60).await.unwrap();

    let app = router(state);

    let first = app.clone().oneshot(request_from("198.51.100.9")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.headers().get("x-ratelimit-remaining").unwrap(), "1");

    let second = app.clone().oneshot(request_from("198.51.100.9")).await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(second.headers().get("x-ratelimit-remaining").unwrap(), "0");

    let third = app.oneshot(request_from("198.51.100.9")).await.unwrap();
    assert_eq!(third.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn requests_without_a_matching_rule_pass_through_unthrottled() {
    let state = test_state().await;
    let app = router(state);
    let response = app.oneshot(request_from("198.51.100.20")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
