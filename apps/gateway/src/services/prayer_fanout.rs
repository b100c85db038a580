// [apps/gateway/src/services/prayer_fanout.rs]
/*!
 * MODULE: PRAYER FAN-OUT PLANNER
 * LAYER: APPLICATION SERVICE (L4)
 * RESPONSIBILITY: CARTESIAN PRODUCT OVER LOCATIONS × METHODS × SCHOOLS × DAYS
 *
 * `prewarm` is the bulk entry point the scheduler and the `/sync/prayer`
 * route call; `sync_one` is the single-slice primitive both it and direct
 * operator calls use. Each worker serializes its own slices with a
 * politeness delay between upstream calls; workers themselves run
 * concurrently.
 */

use chrono::Utc;
use futures::future::BoxFuture;
use futures::FutureExt;
use rand::Rng;
use serde_json::Value;
use std::time::Duration;
use syncd_db::{DbError, UpsertOutcome};
use syncd_domain_models::prayer::{partition_locations, validate_prayer_request, PrayerLocation, PrayerMethod, PrayerSyncRequest, School};
use syncd_domain_models::sync::{SyncOptions, SyncResult};
use syncd_http_client::{RetryPolicy, Timeouts, UpstreamClient, UpstreamError};

use crate::errors::ApiError;
use crate::services::sync::engine::{Mapper, SyncEngine, UpstreamFetcher, Upserter};
use crate::services::sync::merge_results;
use crate::state::AppState;

struct SliceFetcher<'a> {
    api_base: &'a str,
    location: &'a PrayerLocation,
    method: &'a PrayerMethod,
    school: School,
    days: u16,
}

impl UpstreamFetcher for SliceFetcher<'_> {
    fn fetch<'a>(&'a self, upstream: &'a UpstreamClient, _options: &'a SyncOptions) -> BoxFuture<'a, Result<Vec<Value>, UpstreamError>> {
        async move {
            #[derive(serde::Deserialize)]
            struct CalendarResponse {
                data: Vec<Value>,
            }
            let url = format!(
                "{}/calendar?latitude={}&longitude={}&method={}&school={}&days={}",
                self.api_base,
                self.location.latitude,
                self.location.longitude,
                self.method.method_id,
                self.school.as_i32(),
                self.days,
            );
            let response: CalendarResponse = upstream.get_json(&url, Timeouts::SYNC, &RetryPolicy::standard()).await?;
            Ok(response.data)
        }
        .boxed()
    }
}

struct PrayerTimesMapper {
    location_id: i64,
    method_id: i64,
    school: School,
}

impl Mapper for PrayerTimesMapper {
    type Record = syncd_domain_models::prayer::PrayerTimes;

    fn map(&self, raw: &Value) -> Result<Self::Record, String> {
        let date_raw = raw.get("date").and_then(|d| d.get("gregorian")).and_then(|g| g.get("date")).and_then(Value::as_str).ok_or("missing date")?;
        let date = parse_aladhan_date(date_raw).ok_or("unparseable date")?;
        let timings = raw.get("timings").ok_or("missing timings")?;
        let extract = |key: &str| -> String { timings.get(key).and_then(Value::as_str).unwrap_or_default().split(' ').next().unwrap_or_default().to_string() };

        Ok(syncd_domain_models::prayer::PrayerTimes {
            location_id: self.location_id,
            date,
            method_id: self.method_id,
            school: self.school,
            fajr: extract("Fajr"),
            sunrise: extract("Sunrise"),
            dhuhr: extract("Dhuhr"),
            asr: extract("Asr"),
            maghrib: extract("Maghrib"),
            isha: extract("Isha"),
            last_synced_at: Utc::now(),
        })
    }
}

fn parse_aladhan_date(raw: &str) -> Option<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(raw, "%d-%m-%Y").ok()
}

struct PrayerTimesUpserter<'a> {
    state: &'a AppState,
}

impl Upserter<syncd_domain_models::prayer::PrayerTimes> for PrayerTimesUpserter<'_> {
    fn upsert<'a>(
        &'a self,
        records: &'a [syncd_domain_models::prayer::PrayerTimes],
    ) -> BoxFuture<'a, Result<Vec<Result<UpsertOutcome, DbError>>, DbError>> {
        async move { self.state.prayer.upsert_times(records).await }.boxed()
    }
}

pub struct PrayerFanoutPlanner<'a> {
    pub state: &'a AppState,
}

impl<'a> PrayerFanoutPlanner<'a> {
    /// Runs a single location × method × school slice through the shared
    /// sync driver.
    pub async fn sync_one(&self, location: &PrayerLocation, method: &PrayerMethod, school: School, days: u16, options: SyncOptions, job_id: Option<&str>) -> SyncResult {
        let engine = SyncEngine {
            sync_log: &self.state.sync_log,
            jobs: &self.state.jobs,
            upstream: &self.state.upstream,
            gating_interval: self.state.config.sync_gating_interval,
            chunk_size: self.state.config.bulk_chunk_size,
        };

        let resource = format!("prayer-times:{}:{}:{}", location.location_id, method.method_id, school.as_i32());
        let fetcher = SliceFetcher { api_base: &self.state.config.prayer_api_base, location, method, school, days };
        let mapper = PrayerTimesMapper { location_id: location.location_id, method_id: method.method_id, school };
        let upserter = PrayerTimesUpserter { state: self.state };

        engine.run("prayer-sync", &resource, options, &fetcher, &mapper, &upserter, None, job_id).await
    }

    /// Enumerates every location × method × school slice and runs them
    /// across `max_concurrency` workers, partitioned by `location_id %
    /// max_concurrency`. Slices within one worker run sequentially with a
    /// politeness delay between upstream calls. `job_id` is polled between
    /// combinations so a cancelled prewarm stops dispatching new slices
    /// rather than writing Prayer Times rows past the cancellation point.
    pub async fn prewarm(&self, days: u16, options: SyncOptions, job_id: Option<&str>) -> Result<SyncResult, ApiError> {
        let locations = self.state.prayer.list_locations().await?;
        let methods = self.state.prayer.list_methods().await?;

        if locations.is_empty() || methods.is_empty() {
            return Ok(SyncResult::empty_short_circuit("prayer-times"));
        }

        let location_ids: Vec<i64> = locations.iter().map(|l| l.location_id).collect();
        let partitions = partition_locations(&location_ids, self.state.config.prayer_max_concurrency);

        let mut handles = Vec::new();
        for partition in partitions {
            if partition.is_empty() {
                continue;
            }
            let state = self.state.clone();
            let locations = locations.clone();
            let methods = methods.clone();
            let options = options.clone();
            let politeness = self.state.config.prayer_politeness_delay;
            let job_id = job_id.map(str::to_string);

            handles.push(tokio::spawn(async move {
                let planner = PrayerFanoutPlanner { state: &state };
                let mut results = Vec::new();
                let mut first = true;
                let mut cancelled = false;

                'combinations: for location_id in partition {
                    let Some(location) = locations.iter().find(|l| l.location_id == location_id) else { continue };
                    for method in &methods {
                        for school in [School::Shafi, School::Hanafi] {
                            if let Some(id) = &job_id {
                                if state.jobs.is_cancel_requested(id).await.unwrap_or(false) {
                                    cancelled = true;
                                    break 'combinations;
                                }
                            }
                            if !first {
                                sleep_politely(politeness).await;
                            }
                            first = false;
                            results.push(planner.sync_one(location, method, school, days, options.clone(), job_id.as_deref()).await);
                        }
                    }
                }
                (results, cancelled)
            }));
        }

        let mut all_results = Vec::new();
        let mut worker_cancelled = false;
        for handle in handles {
            match handle.await {
                Ok((results, cancelled)) => {
                    all_results.extend(results);
                    worker_cancelled |= cancelled;
                }
                Err(error) => {
                    all_results.push(SyncResult::engine_failure("prayer-times", format!("fan-out worker panicked: {error}"), 0));
                }
            }
        }

        let mut merged = merge_results("prayer-times", &all_results);
        merged.cancelled |= worker_cancelled;
        Ok(merged)
    }

    /// Validates a caller-supplied request against the shared prayer
    /// validation rules before running it as a scoped prewarm.
    pub async fn sync_request(&self, request: PrayerSyncRequest, options: SyncOptions) -> Result<SyncResult, ApiError> {
        validate_prayer_request(&request).map_err(|error| ApiError::Validation(format!("{error:?}")))?;

        let locations = self.state.prayer.list_locations().await?;
        let methods = self.state.prayer.list_methods().await?;
        let method = methods
            .iter()
            .find(|m| m.method_id == request.method_id)
            .ok_or_else(|| ApiError::NotFound(format!("unknown prayer method id {}", request.method_id)))?;
        let schools = request.school.map(|s| vec![s]).unwrap_or_else(|| vec![School::Shafi, School::Hanafi]);

        let mut results = Vec::new();
        for location_id in &request.location_ids {
            let Some(location) = locations.iter().find(|l| l.location_id == *location_id) else {
                return Err(ApiError::NotFound(format!("unknown prayer location id {location_id}")));
            };
            for school in &schools {
                results.push(self.sync_one(location, method, *school, request.days, options.clone(), None).await);
            }
        }

        Ok(merge_results("prayer-times", &results))
    }
}

async fn sleep_politely(bounds: (Duration, Duration)) {
    let (min, max) = bounds;
    let min_ms = min.as_millis() as u64;
    let max_ms = max.as_millis().max(min.as_millis() + 1) as u64;
    let delay_ms = rand::thread_rng().gen_range(min_ms..max_ms);
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
}
