// [apps/gateway/tests/auth_and_accounts.rs]
//! End-to-end coverage for the auth substrate and the super-admin
//! invariant, driven against an in-memory `libsql` database so no real
//! network or filesystem state is touched.

use std::time::Duration;

use syncd_db::DbClient;
use syncd_domain_models::admin_user::AdminRole;
use syncd_gateway::services::auth_service::{hash_password, issue_tokens, rotate_refresh_token};
use syncd_gateway::services::user_service::UserService;
use syncd_gateway::{AppConfig, AppState};

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

#[tokio::test]
async fn refresh_token_rotates_and_revokes_the_prior_one() {
    let state = test_state().await;
    let hash = hash_password("Correct-Horse1!", state.config.bcrypt_cost).unwrap();
    let user = state.admin_users.create("owner@example.test", &hash, None, None, AdminRole::SuperAdmin).await.unwrap();

    let first = issue_tokens(&state, &user).await.unwrap();
    let (_, second) = rotate_refresh_token(&state, &first.refresh_token).await.unwrap();

    // The old refresh token's jti no longer matches the stored one.
    let replay = rotate_refresh_token(&state, &first.refresh_token).await;
    assert!(replay.is_err(), "a rotated-away refresh token must not be honored again");

    // The new one still works.
    assert!(rotate_refresh_token(&state, &second.refresh_token).await.is_ok());
}

#[tokio::test]
async fn super_admin_invariant_blocks_deleting_the_last_one() {
    let state = test_state().await;
    let hash = hash_password("Correct-Horse1!", state.config.bcrypt_cost).unwrap();
    let user = state.admin_users.create("owner@example.test", &hash, None, None, AdminRole::SuperAdmin).await.unwrap();

    let service = UserService { state: &state };
    let result = service.delete(&user.id, &user.id).await;
    assert!(result.is_err(), "deleting the last active super_admin must be rejected");

    // Demotion is blocked the same way.
    let result = service.update_role(&user.id, &user.id, AdminRole::Admin, Default::default()).await;
    assert!(result.is_err(), "demoting the last active super_admin must be rejected");

    // Deactivation is blocked the same way.
    let result = service.set_active(&user.id, &user.id, false).await;
    assert!(result.is_err(), "deactivating the last active super_admin must be rejected");
}

#[tokio::test]
async fn super_admin_invariant_allows_the_change_once_a_second_exists() {
    let state = test_state().await;
    let hash = hash_password("Correct-Horse1!", state.config.bcrypt_cost).unwrap();
    let first = state.admin_users.create("owner@example.test", &hash, None, None, AdminRole::SuperAdmin).await.unwrap();
    let second = state.admin_users.create("deputy@example.test", &hash, None, None, AdminRole::SuperAdmin).await.unwrap();

    let service = UserService { state: &state };
    assert!(service.update_role(&first.id, &second.id, AdminRole::Admin, Default::default()).await.is_ok());

    // Now only `first` is an active super_admin; demoting it must fail again.
    assert!(service.update_role(&first.id, &first.id, AdminRole::Admin, Default::default()).await.is_err());
}

#[tokio::test]
async fn create_rejects_duplicate_email() {
    let state = test_state().await;
    let service = UserService { state: &state };
    let created = service.create("actor", "dup@example.test", "Correct-Horse1!", None, None, AdminRole::Editor).await;
    assert!(created.is_ok());

    let duplicate = service.create("actor", "dup@example.test", "Another-Horse2!", None, None, AdminRole::Viewer).await;
    assert!(duplicate.is_err(), "a second account with the same email must be rejected");
}

#[tokio::test]
async fn create_rejects_weak_password() {
    let state = test_state().await;
    let service = UserService { state: &state };
    let result = service.create("actor", "weak@example.test", "short", None, None, AdminRole::Viewer).await;
    assert!(result.is_err());
}
