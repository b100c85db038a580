// [apps/gateway/src/services/sync/zakat.rs]
/*!
 * MODULE: ZAKAT NISAB REFRESH
 * LAYER: APPLICATION SERVICE (L4)
 * RESPONSIBILITY: RECOMPUTES THE LIVE NISAB THRESHOLD FROM THE GOLD PRICE
 *
 * Zakat has no upstream of its own: its "sync" target is the nisab
 * threshold derived from the most recently synced gold price, so the
 * fetch step here is a local read rather than a network call. It still
 * goes through the shared driver so gating and job logging behave
 * identically to every other domain.
 */

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use syncd_db::{DbError, UpsertOutcome};
use syncd_domain_models::sync::{SyncOptions, SyncResult};
use syncd_http_client::{UpstreamClient, UpstreamError};

use crate::errors::ApiError;
use crate::state::AppState;

use super::engine::{Mapper, SyncEngine, UpstreamFetcher, Upserter};

/// Grams of gold traditionally used as the Nisab threshold (87.48g, the
/// widely cited Hanafi gold Nisab).
pub const NISAB_GOLD_GRAMS: f64 = 87.48;
const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_KARAT: u8 = 24;

struct NisabSnapshot {
    threshold: f64,
}

struct NisabFetcher<'a> {
    state: &'a AppState,
}

impl UpstreamFetcher for NisabFetcher<'_> {
    fn fetch<'a>(&'a self, _upstream: &'a UpstreamClient, _options: &'a SyncOptions) -> BoxFuture<'a, Result<Vec<Value>, UpstreamError>> {
        async move {
            let price = self
                .state
                .finance
                .latest_price(DEFAULT_CURRENCY, DEFAULT_KARAT)
                .await
                .map_err(|error| UpstreamError::Protocol { status: 502, body: error.to_string() })?
                .ok_or_else(|| UpstreamError::Protocol { status: 502, body: "no gold price on file yet".to_string() })?;

            Ok(vec![serde_json::json!({ "nisab_threshold": price.price_per_gram * NISAB_GOLD_GRAMS })])
        }
        .boxed()
    }
}

struct NisabMapper;

impl Mapper for NisabMapper {
    type Record = NisabSnapshot;

    fn map(&self, raw: &Value) -> Result<NisabSnapshot, String> {
        let threshold = raw.get("nisab_threshold").and_then(Value::as_f64).ok_or("missing nisab_threshold")?;
        Ok(NisabSnapshot { threshold })
    }
}

struct NisabUpserter;

impl Upserter<NisabSnapshot> for NisabUpserter {
    fn upsert<'a>(&'a self, records: &'a [NisabSnapshot]) -> BoxFuture<'a, Result<Vec<Result<UpsertOutcome, DbError>>, DbError>> {
        async move {
            for snapshot in records {
                tracing::info!(nisab_threshold = snapshot.threshold, "refreshed zakat nisab threshold");
            }
            Ok(records.iter().map(|_| Ok(UpsertOutcome::Updated)).collect())
        }
        .boxed()
    }
}

pub async fn sync(state: &AppState, options: SyncOptions, job_id: Option<&str>) -> Result<SyncResult, ApiError> {
    let engine = SyncEngine {
        sync_log: &state.sync_log,
        jobs: &state.jobs,
        upstream: &state.upstream,
        gating_interval: state.config.sync_gating_interval,
        chunk_size: state.config.bulk_chunk_size,
    };

    let result = engine.run("zakat-sync", "zakat-nisab", options, &NisabFetcher { state }, &NisabMapper, &NisabUpserter, None, job_id).await;

    Ok(result)
}
