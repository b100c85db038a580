// [apps/gateway/src/services/sync/hadith.rs]
/*!
 * MODULE: HADITH SYNC
 * LAYER: APPLICATION SERVICE (L4)
 * RESPONSIBILITY: COLLECTIONS, THEN PER-COLLECTION BOOKS, THEN HADITHS
 *
 * Unlike the Quran's fixed 114-chapter shape, the collection set itself is
 * upstream-defined, so the collection slugs are discovered once up front
 * and threaded into the book and hadith fetch steps.
 */

use chrono::Utc;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Deserialize;
use serde_json::Value;
use syncd_db::{DbError, UpsertOutcome};
use syncd_domain_models::content::{Hadith, HadithBook, HadithCollection};
use syncd_domain_models::sync::{SyncOptions, SyncResult};
use syncd_http_client::{RetryPolicy, Timeouts, UpstreamClient, UpstreamError};

use crate::errors::ApiError;
use crate::state::AppState;

use super::engine::{Mapper, SyncEngine, UpstreamFetcher, Upserter};

#[derive(Deserialize)]
struct CollectionsResponse {
    data: Vec<Value>,
}

#[derive(Deserialize)]
struct BooksResponse {
    data: Vec<Value>,
}

#[derive(Deserialize)]
struct HadithsResponse {
    data: Vec<Value>,
}

async fn fetch_collection_slugs(upstream: &UpstreamClient, api_base: &str) -> Result<Vec<String>, UpstreamError> {
    let url = format!("{api_base}/collections");
    let response: CollectionsResponse = upstream.get_json(&url, Timeouts::SYNC, &RetryPolicy::standard()).await?;
    Ok(response.data.iter().filter_map(|entry| entry.get("name").and_then(Value::as_str).map(str::to_string)).collect())
}

struct CollectionFetcher<'a> {
    api_base: &'a str,
}

impl UpstreamFetcher for CollectionFetcher<'_> {
    fn fetch<'a>(&'a self, upstream: &'a UpstreamClient, _options: &'a SyncOptions) -> BoxFuture<'a, Result<Vec<Value>, UpstreamError>> {
        async move {
            let url = format!("{}/collections", self.api_base);
            let response: CollectionsResponse = upstream.get_json(&url, Timeouts::SYNC, &RetryPolicy::standard()).await?;
            Ok(response.data)
        }
        .boxed()
    }
}

struct CollectionMapper;

impl Mapper for CollectionMapper {
    type Record = HadithCollection;

    fn map(&self, raw: &Value) -> Result<HadithCollection, String> {
        Ok(HadithCollection {
            slug: raw.get("name").and_then(Value::as_str).ok_or("missing collection slug")?.to_string(),
            name_arabic: raw.get("arabic").and_then(|v| v.get("title")).and_then(Value::as_str).unwrap_or_default().to_string(),
            name_english: raw.get("english").and_then(|v| v.get("title")).and_then(Value::as_str).unwrap_or_default().to_string(),
            total_hadiths: raw.get("totalHadith").and_then(Value::as_u64).unwrap_or_default() as u32,
            last_synced_at: Utc::now(),
        })
    }
}

struct CollectionUpserter<'a> {
    state: &'a AppState,
}

impl Upserter<HadithCollection> for CollectionUpserter<'_> {
    fn upsert<'a>(&'a self, records: &'a [HadithCollection]) -> BoxFuture<'a, Result<Vec<Result<UpsertOutcome, DbError>>, DbError>> {
        async move { self.state.hadith.upsert_collections(records).await }.boxed()
    }
}

struct BookFetcher<'a> {
    api_base: &'a str,
    slugs: &'a [String],
}

impl UpstreamFetcher for BookFetcher<'_> {
    fn fetch<'a>(&'a self, upstream: &'a UpstreamClient, _options: &'a SyncOptions) -> BoxFuture<'a, Result<Vec<Value>, UpstreamError>> {
        async move {
            let mut all = Vec::new();
            for slug in self.slugs {
                let url = format!("{}/collections/{slug}/books", self.api_base);
                let response: BooksResponse = upstream.get_json(&url, Timeouts::SYNC, &RetryPolicy::standard()).await?;
                for mut book in response.data {
                    if let Value::Object(ref mut map) = book {
                        map.insert("collection_slug".to_string(), Value::from(slug.clone()));
                    }
                    all.push(book);
                }
            }
            Ok(all)
        }
        .boxed()
    }
}

struct BookMapper;

impl Mapper for BookMapper {
    type Record = HadithBook;

    fn map(&self, raw: &Value) -> Result<HadithBook, String> {
        Ok(HadithBook {
            collection_slug: raw.get("collection_slug").and_then(Value::as_str).ok_or("missing collection_slug")?.to_string(),
            book_number: raw.get("bookNumber").and_then(Value::as_str).and_then(|s| s.parse().ok()).ok_or("missing bookNumber")?,
            name_arabic: raw.get("book").and_then(|v| v.as_array()).and_then(|arr| arr.first()).and_then(|v| v.get("name")).and_then(Value::as_str).unwrap_or_default().to_string(),
            name_english: raw.get("book").and_then(|v| v.as_array()).and_then(|arr| arr.get(1)).and_then(|v| v.get("name")).and_then(Value::as_str).unwrap_or_default().to_string(),
            last_synced_at: Utc::now(),
        })
    }
}

struct BookUpserter<'a> {
    state: &'a AppState,
}

impl Upserter<HadithBook> for BookUpserter<'_> {
    fn upsert<'a>(&'a self, records: &'a [HadithBook]) -> BoxFuture<'a, Result<Vec<Result<UpsertOutcome, DbError>>, DbError>> {
        async move { self.state.hadith.upsert_books(records).await }.boxed()
    }
}

struct HadithFetcher<'a> {
    api_base: &'a str,
    slugs: &'a [String],
}

impl UpstreamFetcher for HadithFetcher<'_> {
    fn fetch<'a>(&'a self, upstream: &'a UpstreamClient, _options: &'a SyncOptions) -> BoxFuture<'a, Result<Vec<Value>, UpstreamError>> {
        async move {
            let mut all = Vec::new();
            for slug in self.slugs {
                let url = format!("{}/collections/{slug}/hadiths", self.api_base);
                let response: HadithsResponse = upstream.get_json(&url, Timeouts::SYNC, &RetryPolicy::standard()).await?;
                for mut hadith in response.data {
                    if let Value::Object(ref mut map) = hadith {
                        map.insert("collection_slug".to_string(), Value::from(slug.clone()));
                    }
                    all.push(hadith);
                }
            }
            Ok(all)
        }
        .boxed()
    }
}

struct HadithMapper;

impl Mapper for HadithMapper {
    type Record = Hadith;

    fn map(&self, raw: &Value) -> Result<Hadith, String> {
        Ok(Hadith {
            collection_slug: raw.get("collection_slug").and_then(Value::as_str).ok_or("missing collection_slug")?.to_string(),
            book_number: raw.get("bookNumber").and_then(Value::as_str).and_then(|s| s.parse().ok()).ok_or("missing bookNumber")?,
            hadith_number: raw.get("hadithNumber").and_then(Value::as_str).and_then(|s| s.parse().ok()).ok_or("missing hadithNumber")?,
            text_arabic: raw.get("hadith").and_then(|v| v.as_array()).and_then(|arr| arr.first()).and_then(|v| v.get("body")).and_then(Value::as_str).unwrap_or_default().to_string(),
            text_english: raw.get("hadith").and_then(|v| v.as_array()).and_then(|arr| arr.get(1)).and_then(|v| v.get("body")).and_then(Value::as_str).map(str::to_string),
            grade: raw.get("hadith").and_then(|v| v.as_array()).and_then(|arr| arr.get(1)).and_then(|v| v.get("grades")).and_then(|v| v.as_array()).and_then(|arr| arr.first()).and_then(|v| v.get("grade")).and_then(Value::as_str).map(str::to_string),
            last_synced_at: Utc::now(),
        })
    }
}

struct HadithUpserter<'a> {
    state: &'a AppState,
}

impl Upserter<Hadith> for HadithUpserter<'_> {
    fn upsert<'a>(&'a self, records: &'a [Hadith]) -> BoxFuture<'a, Result<Vec<Result<UpsertOutcome, DbError>>, DbError>> {
        async move { self.state.hadith.upsert_hadiths(records).await }.boxed()
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

    let collection_result = engine
        .run("hadith-sync", "hadith-collections", options.clone(), &CollectionFetcher { api_base: &state.config.hadith_api_base }, &CollectionMapper, &CollectionUpserter { state }, None, job_id)
        .await;
    if collection_result.cancelled {
        return Ok(super::merge_results("hadith", &[collection_result]));
    }

    let slugs = fetch_collection_slugs(&state.upstream, &state.config.hadith_api_base).await.unwrap_or_default();

    let book_result = engine
        .run("hadith-sync", "hadith-books", options.clone(), &BookFetcher { api_base: &state.config.hadith_api_base, slugs: &slugs }, &BookMapper, &BookUpserter { state }, None, job_id)
        .await;
    if book_result.cancelled {
        return Ok(super::merge_results("hadith", &[collection_result, book_result]));
    }

    let hadith_result = engine
        .run("hadith-sync", "hadiths", options, &HadithFetcher { api_base: &state.config.hadith_api_base, slugs: &slugs }, &HadithMapper, &HadithUpserter { state }, None, job_id)
        .await;

    Ok(super::merge_results("hadith", &[collection_result, book_result, hadith_result]))
}
