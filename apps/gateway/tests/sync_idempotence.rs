// [apps/gateway/tests/sync_idempotence.rs]
//! Exercises the generic sync engine's gating behavior directly with a
//! stub fetcher/mapper/upserter, so no real upstream HTTP call is made.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use syncd_db::{DbClient, DbError, JobRepository, SyncLogRepository, UpsertOutcome};
use syncd_domain_models::sync::SyncOptions;
use syncd_gateway::services::sync::engine::{Mapper, SyncEngine, UpstreamFetcher, Upserter};
use syncd_http_client::{UpstreamClient, UpstreamError};

struct StubFetcher {
    calls: Arc<AtomicUsize>,
}

impl UpstreamFetcher for StubFetcher {
    fn fetch<'a>(&'a self, _upstream: &'a UpstreamClient, _options: &'a SyncOptions) -> BoxFuture<'a, Result<Vec<serde_json::Value>, UpstreamError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        async { Ok(vec![serde_json::json!({ "id": 1 }), serde_json::json!({ "id": 2 })]) }.boxed()
    }
}

struct StubMapper;

impl Mapper for StubMapper {
    type Record = i64;

    fn map(&self, raw: &serde_json::Value) -> Result<i64, String> {
        raw.get("id").and_then(|v| v.as_i64()).ok_or_else(|| "missing id".to_string())
    }
}

struct StubUpserter {
    writes: Arc<AtomicUsize>,
}

impl Upserter<i64> for StubUpserter {
    fn upsert<'a>(&'a self, records: &'a [i64]) -> BoxFuture<'a, Result<Vec<Result<UpsertOutcome, DbError>>, DbError>> {
        self.writes.fetch_add(records.len(), Ordering::SeqCst);
        async { Ok(records.iter().map(|_| Ok(UpsertOutcome::Inserted)).collect()) }.boxed()
    }
}

#[tokio::test]
async fn first_run_inserts_second_run_within_window_short_circuits() {
    let db = DbClient::connect(":memory:", None).await.unwrap();
    let sync_log = SyncLogRepository::new(db.clone());
    let jobs = JobRepository::new(db.clone());
    let upstream = UpstreamClient::new();
    let fetch_calls = Arc::new(AtomicUsize::new(0));
    let write_calls = Arc::new(AtomicUsize::new(0));

    let engine = SyncEngine { sync_log: &sync_log, jobs: &jobs, upstream: &upstream, gating_interval: Duration::from_secs(86400), chunk_size: 500 };
    let fetcher = StubFetcher { calls: fetch_calls.clone() };
    let mapper = StubMapper;
    let upserter = StubUpserter { writes: write_calls.clone() };

    let first = engine.run("test-job", "test-resource", SyncOptions::default(), &fetcher, &mapper, &upserter, None, None).await;
    assert!(first.success);
    assert_eq!(first.records_inserted, 2);
    assert_eq!(first.records_updated, 0);
    assert_eq!(fetch_calls.load(Ordering::SeqCst), 1);
    assert_eq!(write_calls.load(Ordering::SeqCst), 2);

    let second = engine.run("test-job", "test-resource", SyncOptions::default(), &fetcher, &mapper, &upserter, None, None).await;
    assert!(second.success);
    assert_eq!(second.records_processed, 0, "second run inside the gating window must short-circuit with no work");
    assert_eq!(fetch_calls.load(Ordering::SeqCst), 1, "short-circuited run must not call upstream again");

    let forced = SyncOptions { force: true, ..Default::default() };
    let third = engine.run("test-job", "test-resource", forced, &fetcher, &mapper, &upserter, None, None).await;
    assert!(third.success);
    assert_eq!(third.records_inserted, 2, "force=true must bypass the gate and re-run the sync");
    assert_eq!(fetch_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn mapping_failures_are_counted_without_aborting_the_batch() {
    let db = DbClient::connect(":memory:", None).await.unwrap();
    let sync_log = SyncLogRepository::new(db.clone());
    let jobs = JobRepository::new(db.clone());
    let upstream = UpstreamClient::new();

    struct PartiallyBadFetcher;
    impl UpstreamFetcher for PartiallyBadFetcher {
        fn fetch<'a>(&'a self, _upstream: &'a UpstreamClient, _options: &'a SyncOptions) -> BoxFuture<'a, Result<Vec<serde_json::Value>, UpstreamError>> {
            async { Ok(vec![serde_json::json!({ "id": 1 }), serde_json::json!({ "no_id": true })]) }.boxed()
        }
    }

    let engine = SyncEngine { sync_log: &sync_log, jobs: &jobs, upstream: &upstream, gating_interval: Duration::from_secs(86400), chunk_size: 500 };
    let write_calls = Arc::new(AtomicUsize::new(0));
    let upserter = StubUpserter { writes: write_calls.clone() };

    let result = engine.run("test-job", "partial-resource", SyncOptions::default(), &PartiallyBadFetcher, &StubMapper, &upserter, None, None).await;

    assert_eq!(result.records_processed, 2);
    assert_eq!(result.records_failed, 1);
    assert_eq!(result.records_inserted, 1);
    assert_eq!(write_calls.load(Ordering::SeqCst), 1);
}
