// [apps/gateway/src/services/sync/quran.rs]
/*!
 * MODULE: QURAN SYNC
 * LAYER: APPLICATION SERVICE (L4)
 * RESPONSIBILITY: CHAPTERS, PER-CHAPTER VERSES, AND TRANSLATIONS
 *
 * The Quran has a fixed 114-chapter structure, so per-chapter verse and
 * translation pagination iterates a known chapter range rather than
 * discovering it from the upstream or the local store.
 */

use chrono::Utc;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Deserialize;
use serde_json::Value;
use syncd_db::{DbError, UpsertOutcome};
use syncd_domain_models::content::{QuranChapter, QuranTranslation, QuranVerse};
use syncd_domain_models::sync::SyncOptions;
use syncd_http_client::{RetryPolicy, Timeouts, UpstreamClient, UpstreamError};

use crate::errors::ApiError;
use crate::state::AppState;

use super::engine::{Mapper, SyncEngine, UpstreamFetcher, Upserter};

const CHAPTER_COUNT: u16 = 114;

struct ChapterFetcher<'a> {
    api_base: &'a str,
}

impl UpstreamFetcher for ChapterFetcher<'_> {
    fn fetch<'a>(&'a self, upstream: &'a UpstreamClient, _options: &'a SyncOptions) -> BoxFuture<'a, Result<Vec<Value>, UpstreamError>> {
        async move {
            #[derive(Deserialize)]
            struct ChaptersResponse {
                chapters: Vec<Value>,
            }
            let url = format!("{}/chapters?language=en", self.api_base);
            let response: ChaptersResponse = upstream.get_json(&url, Timeouts::SYNC, &RetryPolicy::standard()).await?;
            Ok(response.chapters)
        }
        .boxed()
    }
}

struct ChapterMapper;

impl Mapper for ChapterMapper {
    type Record = QuranChapter;

    fn map(&self, raw: &Value) -> Result<QuranChapter, String> {
        Ok(QuranChapter {
            chapter_number: raw.get("id").and_then(Value::as_u64).ok_or("missing chapter id")? as u16,
            name_arabic: raw.get("name_arabic").and_then(Value::as_str).unwrap_or_default().to_string(),
            name_simple: raw.get("name_simple").and_then(Value::as_str).unwrap_or_default().to_string(),
            name_english: raw.get("translated_name").and_then(|t| t.get("name")).and_then(Value::as_str).unwrap_or_default().to_string(),
            verses_count: raw.get("verses_count").and_then(Value::as_u64).unwrap_or_default() as u16,
            revelation_place: raw.get("revelation_place").and_then(Value::as_str).unwrap_or_default().to_string(),
            last_synced_at: Utc::now(),
        })
    }
}

struct ChapterUpserter<'a> {
    state: &'a AppState,
}

impl Upserter<QuranChapter> for ChapterUpserter<'_> {
    fn upsert<'a>(&'a self, records: &'a [QuranChapter]) -> BoxFuture<'a, Result<Vec<Result<UpsertOutcome, DbError>>, DbError>> {
        async move { self.state.quran.upsert_chapters(records).await }.boxed()
    }
}

struct VerseFetcher<'a> {
    api_base: &'a str,
}

impl UpstreamFetcher for VerseFetcher<'_> {
    fn fetch<'a>(&'a self, upstream: &'a UpstreamClient, _options: &'a SyncOptions) -> BoxFuture<'a, Result<Vec<Value>, UpstreamError>> {
        async move {
            #[derive(Deserialize)]
            struct VersesResponse {
                verses: Vec<Value>,
            }
            let mut all = Vec::new();
            for chapter_number in 1..=CHAPTER_COUNT {
                let url = format!("{}/verses/by_chapter/{chapter_number}?fields=text_uthmani,juz_number,page_number", self.api_base);
                let response: VersesResponse = upstream.get_json(&url, Timeouts::SYNC, &RetryPolicy::standard()).await?;
                for mut verse in response.verses {
                    if let Value::Object(ref mut map) = verse {
                        map.insert("chapter_number".to_string(), Value::from(chapter_number));
                    }
                    all.push(verse);
                }
            }
            Ok(all)
        }
        .boxed()
    }
}

struct VerseMapper;

impl Mapper for VerseMapper {
    type Record = QuranVerse;

    fn map(&self, raw: &Value) -> Result<QuranVerse, String> {
        Ok(QuranVerse {
            chapter_number: raw.get("chapter_number").and_then(Value::as_u64).ok_or("missing chapter_number")? as u16,
            verse_number: raw.get("verse_number").and_then(Value::as_u64).ok_or("missing verse_number")? as u16,
            text_arabic: raw.get("text_uthmani").and_then(Value::as_str).unwrap_or_default().to_string(),
            juz_number: raw.get("juz_number").and_then(Value::as_u64).unwrap_or_default() as u16,
            page_number: raw.get("page_number").and_then(Value::as_u64).unwrap_or_default() as u16,
            last_synced_at: Utc::now(),
        })
    }
}

struct VerseUpserter<'a> {
    state: &'a AppState,
}

impl Upserter<QuranVerse> for VerseUpserter<'_> {
    fn upsert<'a>(&'a self, records: &'a [QuranVerse]) -> BoxFuture<'a, Result<Vec<Result<UpsertOutcome, DbError>>, DbError>> {
        async move { self.state.quran.upsert_verses(records).await }.boxed()
    }
}

struct TranslationFetcher<'a> {
    api_base: &'a str,
    resource_id: u32,
}

impl UpstreamFetcher for TranslationFetcher<'_> {
    fn fetch<'a>(&'a self, upstream: &'a UpstreamClient, _options: &'a SyncOptions) -> BoxFuture<'a, Result<Vec<Value>, UpstreamError>> {
        async move {
            #[derive(Deserialize)]
            struct TranslationsResponse {
                translations: Vec<Value>,
            }
            let url = format!("{}/quran/translations/{}", self.api_base, self.resource_id);
            let response: TranslationsResponse = upstream.get_json(&url, Timeouts::SYNC, &RetryPolicy::standard()).await?;
            Ok(response.translations)
        }
        .boxed()
    }
}

struct TranslationMapper {
    resource_id: u32,
}

impl Mapper for TranslationMapper {
    type Record = QuranTranslation;

    fn map(&self, raw: &Value) -> Result<QuranTranslation, String> {
        let verse_key = raw.get("verse_key").and_then(Value::as_str).ok_or("missing verse_key")?;
        let (chapter_raw, verse_raw) = verse_key.split_once(':').ok_or("malformed verse_key")?;
        Ok(QuranTranslation {
            chapter_number: chapter_raw.parse().map_err(|_| "invalid chapter in verse_key")?,
            verse_number: verse_raw.parse().map_err(|_| "invalid verse in verse_key")?,
            resource_id: self.resource_id,
            language_code: raw.get("language_code").and_then(Value::as_str).unwrap_or("en").to_string(),
            text: raw.get("text").and_then(Value::as_str).unwrap_or_default().to_string(),
            last_synced_at: Utc::now(),
        })
    }
}

struct TranslationUpserter<'a> {
    state: &'a AppState,
}

impl Upserter<QuranTranslation> for TranslationUpserter<'_> {
    fn upsert<'a>(&'a self, records: &'a [QuranTranslation]) -> BoxFuture<'a, Result<Vec<Result<UpsertOutcome, DbError>>, DbError>> {
        async move { self.state.quran.upsert_translations(records).await }.boxed()
    }
}

/// Parses `QURAN_TRANSLATION_FALLBACKS` entries of the form
/// `resourceId:languageCode` into placeholder translation rows, used only
/// when the translations fetch fails with a 5xx.
fn build_translation_fallback(state: &AppState, resource_id: u32) -> Option<Vec<QuranTranslation>> {
    let entries: Vec<QuranTranslation> = state
        .config
        .quran_translation_fallbacks
        .iter()
        .filter_map(|entry| {
            let (id_raw, language_code) = entry.split_once(':')?;
            let entry_resource_id: u32 = id_raw.parse().ok()?;
            if entry_resource_id != resource_id {
                return None;
            }
            Some(QuranTranslation {
                chapter_number: 1,
                verse_number: 1,
                resource_id,
                language_code: language_code.to_string(),
                text: "translation unavailable, upstream degraded".to_string(),
                last_synced_at: Utc::now(),
            })
        })
        .collect();

    if entries.is_empty() {
        None
    } else {
        Some(entries)
    }
}

pub async fn sync(state: &AppState, options: SyncOptions, job_id: Option<&str>) -> Result<syncd_domain_models::sync::SyncResult, ApiError> {
    let engine = SyncEngine {
        sync_log: &state.sync_log,
        jobs: &state.jobs,
        upstream: &state.upstream,
        gating_interval: state.config.sync_gating_interval,
        chunk_size: state.config.bulk_chunk_size,
    };

    let chapter_result = engine
        .run("quran-sync", "quran-chapters", options.clone(), &ChapterFetcher { api_base: &state.config.quran_api_base }, &ChapterMapper, &ChapterUpserter { state }, None, job_id)
        .await;
    if chapter_result.cancelled {
        return Ok(super::merge_results("quran", &[chapter_result]));
    }

    let verse_result = engine
        .run("quran-sync", "quran-verses", options.clone(), &VerseFetcher { api_base: &state.config.quran_api_base }, &VerseMapper, &VerseUpserter { state }, None, job_id)
        .await;
    if verse_result.cancelled {
        return Ok(super::merge_results("quran", &[chapter_result, verse_result]));
    }

    let default_resource_id: u32 = 131;
    let fallback = build_translation_fallback(state, default_resource_id);
    let translation_result = engine
        .run(
            "quran-sync",
            "quran-translations",
            options,
            &TranslationFetcher { api_base: &state.config.quran_api_base, resource_id: default_resource_id },
            &TranslationMapper { resource_id: default_resource_id },
            &TranslationUpserter { state },
            fallback,
            job_id,
        )
        .await;

    Ok(super::merge_results("quran", &[chapter_result, verse_result, translation_result]))
}
