// [apps/gateway/src/services/sync/finance.rs]
/*!
 * MODULE: FINANCE AND AUDIO SYNC
 * LAYER: APPLICATION SERVICE (L4)
 * RESPONSIBILITY: GOLD PRICES (`finance`/`gold-price`) AND RECITERS (`audio`)
 *
 * Both entities live in the same repository; they are split into two
 * public functions here because spec.md's `/sync/{module}` route treats
 * `finance` (gold price) and `audio` (reciter catalog) as separate
 * trigger targets even though they share storage.
 */

use chrono::Utc;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use syncd_db::{DbError, UpsertOutcome};
use syncd_domain_models::content::{GoldPrice, Reciter};
use syncd_domain_models::sync::{SyncOptions, SyncResult};
use syncd_http_client::{RetryPolicy, Timeouts, UpstreamClient, UpstreamError};

use crate::errors::ApiError;
use crate::state::AppState;

use super::engine::{Mapper, SyncEngine, UpstreamFetcher, Upserter};

const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_KARAT: u8 = 24;

struct GoldPriceFetcher<'a> {
    api_base: &'a str,
}

impl UpstreamFetcher for GoldPriceFetcher<'_> {
    fn fetch<'a>(&'a self, upstream: &'a UpstreamClient, _options: &'a SyncOptions) -> BoxFuture<'a, Result<Vec<Value>, UpstreamError>> {
        async move {
            let url = format!("{}/latest?currency={DEFAULT_CURRENCY}", self.api_base);
            let response: Value = upstream.get_json(&url, Timeouts::SYNC, &RetryPolicy::standard()).await?;
            Ok(vec![response])
        }
        .boxed()
    }
}

struct GoldPriceMapper;

impl Mapper for GoldPriceMapper {
    type Record = GoldPrice;

    fn map(&self, raw: &Value) -> Result<GoldPrice, String> {
        let price_per_ounce = raw.get("metals").and_then(|m| m.get("gold")).and_then(Value::as_f64).ok_or("missing gold price")?;
        const GRAMS_PER_TROY_OUNCE: f64 = 31.1035;
        Ok(GoldPrice {
            date: Utc::now().date_naive(),
            currency: DEFAULT_CURRENCY.to_string(),
            karat: DEFAULT_KARAT,
            price_per_gram: price_per_ounce / GRAMS_PER_TROY_OUNCE,
            last_synced_at: Utc::now(),
        })
    }
}

struct GoldPriceUpserter<'a> {
    state: &'a AppState,
}

impl Upserter<GoldPrice> for GoldPriceUpserter<'_> {
    fn upsert<'a>(&'a self, records: &'a [GoldPrice]) -> BoxFuture<'a, Result<Vec<Result<UpsertOutcome, DbError>>, DbError>> {
        async move { self.state.finance.upsert_gold_prices(records).await }.boxed()
    }
}

pub async fn sync_gold_price(state: &AppState, options: SyncOptions, job_id: Option<&str>) -> Result<SyncResult, ApiError> {
    let engine = SyncEngine {
        sync_log: &state.sync_log,
        jobs: &state.jobs,
        upstream: &state.upstream,
        gating_interval: state.config.sync_gating_interval,
        chunk_size: state.config.bulk_chunk_size,
    };

    let result = engine
        .run("finance-sync", "gold-price", options, &GoldPriceFetcher { api_base: &state.config.gold_price_api_base }, &GoldPriceMapper, &GoldPriceUpserter { state }, None, job_id)
        .await;

    Ok(result)
}

struct ReciterFetcher<'a> {
    api_base: &'a str,
}

impl UpstreamFetcher for ReciterFetcher<'_> {
    fn fetch<'a>(&'a self, upstream: &'a UpstreamClient, _options: &'a SyncOptions) -> BoxFuture<'a, Result<Vec<Value>, UpstreamError>> {
        async move {
            #[derive(serde::Deserialize)]
            struct RecitersResponse {
                reciters: Vec<Value>,
            }
            let url = format!("{}/resources/recitations?language=en", self.api_base);
            let response: RecitersResponse = upstream.get_json(&url, Timeouts::SYNC, &RetryPolicy::standard()).await?;
            Ok(response.reciters)
        }
        .boxed()
    }
}

struct ReciterMapper;

impl Mapper for ReciterMapper {
    type Record = Reciter;

    fn map(&self, raw: &Value) -> Result<Reciter, String> {
        Ok(Reciter {
            reciter_id: raw.get("id").and_then(Value::as_u64).ok_or("missing reciter id")? as u32,
            name: raw.get("reciter_name").and_then(Value::as_str).unwrap_or_default().to_string(),
            style: raw.get("style").and_then(Value::as_str).map(str::to_string),
            language: raw.get("translated_name").and_then(|t| t.get("language_name")).and_then(Value::as_str).map(str::to_string),
            last_synced_at: Utc::now(),
        })
    }
}

struct ReciterUpserter<'a> {
    state: &'a AppState,
}

impl Upserter<Reciter> for ReciterUpserter<'_> {
    fn upsert<'a>(&'a self, records: &'a [Reciter]) -> BoxFuture<'a, Result<Vec<Result<UpsertOutcome, DbError>>, DbError>> {
        async move { self.state.finance.upsert_reciters(records).await }.boxed()
    }
}

pub async fn sync_audio(state: &AppState, options: SyncOptions, job_id: Option<&str>) -> Result<SyncResult, ApiError> {
    let engine = SyncEngine {
        sync_log: &state.sync_log,
        jobs: &state.jobs,
        upstream: &state.upstream,
        gating_interval: state.config.sync_gating_interval,
        chunk_size: state.config.bulk_chunk_size,
    };

    let result = engine
        .run("audio-sync", "reciters", options, &ReciterFetcher { api_base: &state.config.reciter_api_base }, &ReciterMapper, &ReciterUpserter { state }, None, job_id)
        .await;

    Ok(result)
}
