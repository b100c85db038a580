// [apps/gateway/tests/job_control.rs]
//! Job lifecycle coverage: pause/resume/cancel transitions and the
//! cooperative-cancellation path for a job already running.

use std::time::Duration;

use syncd_db::DbClient;
use syncd_domain_models::job::{JobFilters, JobStatus, JobType};
use syncd_gateway::services::job_control::{BulkOp, JobControl};
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
async fn pause_then_resume_round_trips_through_pending() {
    let state = test_state().await;
    // No schedule row exists yet, so `trigger` treats max_concurrency as 1
    // and dispatches immediately; pause a job still in `pending` by
    // creating it directly through the repository instead, so the
    // transition under test starts from a known, stable state.
    let job = state.jobs.create("quran", JobType::Quran, 5, serde_json::Value::Null).await.unwrap();

    let control = JobControl { state: &state };
    control.pause(&job.id).await.unwrap();
    let record = state.jobs.find_by_id(&job.id).await.unwrap().unwrap();
    assert_eq!(record.status, JobStatus::Paused);

    control.resume(&job.id).await.unwrap();
    let record = state.jobs.find_by_id(&job.id).await.unwrap().unwrap();
    assert_eq!(record.status, JobStatus::Pending);
}

#[tokio::test]
async fn cancel_from_pending_is_immediate() {
    let state = test_state().await;
    let job = state.jobs.create("quran", JobType::Quran, 5, serde_json::Value::Null).await.unwrap();

    let control = JobControl { state: &state };
    control.cancel(&job.id).await.unwrap();

    let record = state.jobs.find_by_id(&job.id).await.unwrap().unwrap();
    assert_eq!(record.status, JobStatus::Cancelled);
    assert!(record.status.is_terminal());
}

#[tokio::test]
async fn cancel_from_running_sets_cooperative_flag_not_terminal_state() {
    let state = test_state().await;
    let job = state.jobs.create("quran", JobType::Quran, 5, serde_json::Value::Null).await.unwrap();
    state.jobs.start(&job.id).await.unwrap();

    let control = JobControl { state: &state };
    control.cancel(&job.id).await.unwrap();

    // The row is still `running`: only the cooperative flag moved. The
    // transition to `cancelled` happens when the spawned worker itself
    // unwinds and calls `complete`/`cancel`, not synchronously here.
    let record = state.jobs.find_by_id(&job.id).await.unwrap().unwrap();
    assert_eq!(record.status, JobStatus::Running);
}

#[tokio::test]
async fn update_priority_rejects_out_of_range_values() {
    let state = test_state().await;
    let job = state.jobs.create("quran", JobType::Quran, 5, serde_json::Value::Null).await.unwrap();

    let control = JobControl { state: &state };
    assert!(control.update_priority(&job.id, 0).await.is_err());
    assert!(control.update_priority(&job.id, 11).await.is_err());
    assert!(control.update_priority(&job.id, 7).await.is_ok());
}

#[tokio::test]
async fn bulk_reports_per_job_outcome_without_aborting_on_failure() {
    let state = test_state().await;
    let job = state.jobs.create("quran", JobType::Quran, 5, serde_json::Value::Null).await.unwrap();

    let control = JobControl { state: &state };
    let outcomes = control.bulk(BulkOp::Pause, &[job.id.clone(), "does-not-exist".to_string()]).await;

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].success);
    assert!(!outcomes[1].success);
    assert!(outcomes[1].error.is_some());
}

#[tokio::test]
async fn list_applies_filters_and_pagination() {
    let state = test_state().await;
    for _ in 0..3 {
        state.jobs.create("quran", JobType::Quran, 5, serde_json::Value::Null).await.unwrap();
    }
    state.jobs.create("hadith", JobType::Hadith, 5, serde_json::Value::Null).await.unwrap();

    let control = JobControl { state: &state };
    let filters = JobFilters { job_type: Some(JobType::Quran), ..Default::default() };
    let page = control.list(&filters, 2, 0).await.unwrap();

    assert_eq!(page.total, 3);
    assert_eq!(page.jobs.len(), 2);
    assert!(page.has_more);
}
