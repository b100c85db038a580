// [apps/gateway/src/services/sync/engine.rs]
/*!
 * MODULE: GENERIC SYNC ENGINE
 * LAYER: APPLICATION SERVICE (L4)
 * RESPONSIBILITY: GATING → FETCH → MAP → UPSERT → LOG, SHARED ACROSS DOMAINS
 *
 * Every domain module supplies an `UpstreamFetcher` and a `Mapper`; the
 * driver owns the parts that must behave identically everywhere (gating
 * window, chunked upserts, truncated error logging). Mapping is pure and
 * synchronous per spec.md's "pure, per-domain mapping function"; only
 * fetch and upsert touch the network or the database, so only those two
 * seams are boxed futures.
 */

use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::BoxFuture;
use syncd_db::{DbError, JobRepository, SyncLogRepository, UpsertOutcome};
use syncd_domain_models::sync::{truncate_errors, SyncOptions, SyncResult, SyncStatus};
use syncd_http_client::{UpstreamClient, UpstreamError};

const MAX_ERROR_TEXT_LEN: usize = 2000;

pub trait UpstreamFetcher {
    /// Pulls the raw upstream payload, already paginated if the resource
    /// requires it. Returns one JSON value per upstream record.
    fn fetch<'a>(
        &'a self,
        upstream: &'a UpstreamClient,
        options: &'a SyncOptions,
    ) -> BoxFuture<'a, Result<Vec<serde_json::Value>, UpstreamError>>;
}

pub trait Mapper {
    type Record;

    /// Projects one upstream record into local entity shape. Errors are
    /// collected by the engine, never propagated — a single bad record
    /// must not abort the batch.
    fn map(&self, raw: &serde_json::Value) -> Result<Self::Record, String>;
}

pub trait Upserter<T> {
    fn upsert<'a>(&'a self, records: &'a [T]) -> BoxFuture<'a, Result<Vec<Result<UpsertOutcome, DbError>>, DbError>>;
}

pub struct SyncEngine<'a> {
    pub sync_log: &'a SyncLogRepository,
    pub jobs: &'a JobRepository,
    pub upstream: &'a UpstreamClient,
    pub gating_interval: Duration,
    pub chunk_size: usize,
}

impl<'a> SyncEngine<'a> {
    /// Runs the full algorithm for one domain resource. `fallback_on_upstream_failure`
    /// is consulted only when the fetch step fails with an upstream 5xx; it
    /// is how the Quran translation mapper's placeholder-row fallback (spec.md
    /// §4.5 point 6) plugs into an otherwise domain-agnostic driver.
    ///
    /// `job_id` is `Some` when the run is driven by the job control plane;
    /// the engine polls the job's cooperative cancellation flag between
    /// upsert chunks and stops short with `SyncResult::cancelled` rather
    /// than writing the remaining records. Callers outside the job control
    /// plane (direct route handlers) pass `None` and always run to completion.
    pub async fn run<F, M, U>(
        &self,
        job_name: &str,
        resource: &str,
        options: SyncOptions,
        fetcher: &F,
        mapper: &M,
        upserter: &U,
        fallback_on_upstream_failure: Option<Vec<M::Record>>,
        job_id: Option<&str>,
    ) -> SyncResult
    where
        F: UpstreamFetcher,
        M: Mapper,
        U: Upserter<M::Record>,
    {
        if !options.force {
            if let Some(result) = self.check_gate(resource).await {
                return result;
            }
        }

        let started = Instant::now();
        let log_id = match self.sync_log.start(job_name, resource).await {
            Ok(id) => id,
            Err(error) => return SyncResult::engine_failure(resource, error.to_string(), started.elapsed().as_millis() as u64),
        };

        let raw_records = match fetcher.fetch(self.upstream, &options).await {
            Ok(records) => records,
            Err(error) => {
                return self.finalize_fetch_failure(&log_id, resource, error, mapper, upserter, fallback_on_upstream_failure, started).await;
            }
        };

        let mut mapped = Vec::with_capacity(raw_records.len());
        let mut errors = Vec::new();
        let mut records_failed: u32 = 0;

        for raw in &raw_records {
            match mapper.map(raw) {
                Ok(record) => mapped.push(record),
                Err(message) => {
                    records_failed += 1;
                    errors.push(message);
                }
            }
        }

        let mut records_inserted: u32 = 0;
        let mut records_updated: u32 = 0;
        let mut cancelled = false;

        if !options.dry_run {
            for chunk in mapped.chunks(self.chunk_size.max(1)) {
                if let Some(id) = job_id {
                    if self.jobs.is_cancel_requested(id).await.unwrap_or(false) {
                        cancelled = true;
                        break;
                    }
                }

                match upserter.upsert(chunk).await {
                    Ok(outcomes) => {
                        for outcome in outcomes {
                            match outcome {
                                Ok(UpsertOutcome::Inserted) => records_inserted += 1,
                                Ok(UpsertOutcome::Updated) | Ok(UpsertOutcome::RaceIgnored) => records_updated += 1,
                                Err(error) => {
                                    records_failed += 1;
                                    errors.push(error.to_string());
                                }
                            }
                        }
                    }
                    Err(error) => {
                        records_failed += chunk.len() as u32;
                        errors.push(error.to_string());
                    }
                }
            }
        } else {
            records_inserted = mapped.len() as u32;
        }

        let result = SyncResult {
            success: true,
            cancelled,
            resource: resource.to_string(),
            records_processed: raw_records.len() as u32,
            records_inserted,
            records_updated,
            records_failed,
            errors,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        self.write_log(&log_id, &result).await;
        result
    }

    async fn check_gate(&self, resource: &str) -> Option<SyncResult> {
        let recent = self.sync_log.list_for_resource(resource, 1).await.ok()?;
        let last = recent.first()?;
        let is_fresh = matches!(last.status, SyncStatus::Success | SyncStatus::Partial);
        let within_window = Utc::now() - last.started_at < chrono::Duration::from_std(self.gating_interval).unwrap_or_default();

        if is_fresh && within_window {
            Some(SyncResult::empty_short_circuit(resource))
        } else {
            None
        }
    }

    async fn finalize_fetch_failure<M, U>(
        &self,
        log_id: &str,
        resource: &str,
        error: UpstreamError,
        _mapper: &M,
        upserter: &U,
        fallback: Option<Vec<M::Record>>,
        started: Instant,
    ) -> SyncResult
    where
        M: Mapper,
        U: Upserter<M::Record>,
    {
        let is_server_error = matches!(&error, UpstreamError::Protocol { status, .. } if *status >= 500);

        if is_server_error {
            if let Some(fallback_records) = fallback {
                let outcomes = upserter.upsert(&fallback_records).await;
                let (records_inserted, records_updated, records_failed) = match &outcomes {
                    Ok(results) => {
                        let inserted = results.iter().filter(|r| matches!(r, Ok(UpsertOutcome::Inserted))).count() as u32;
                        let updated = results.iter().filter(|r| matches!(r, Ok(UpsertOutcome::Updated) | Ok(UpsertOutcome::RaceIgnored))).count() as u32;
                        let failed = results.iter().filter(|r| r.is_err()).count() as u32;
                        (inserted, updated, failed)
                    }
                    Err(_) => (0, 0, fallback_records.len() as u32),
                };
                let result = SyncResult {
                    success: true,
                    cancelled: false,
                    resource: resource.to_string(),
                    records_processed: fallback_records.len() as u32,
                    records_inserted,
                    records_updated,
                    records_failed: records_failed.max(1),
                    errors: vec![format!("upstream returned {error}; applied fallback placeholder rows")],
                    duration_ms: started.elapsed().as_millis() as u64,
                };
                self.write_log(log_id, &result).await;
                return result;
            }
        }

        let result = SyncResult::engine_failure(resource, error.to_string(), started.elapsed().as_millis() as u64);
        self.write_log(log_id, &result).await;
        result
    }

    async fn write_log(&self, log_id: &str, result: &SyncResult) {
        let error_text = if result.errors.is_empty() { None } else { Some(truncate_errors(&result.errors, MAX_ERROR_TEXT_LEN)) };
        if let Err(error) = self
            .sync_log
            .finish(log_id, result.derived_status(), error_text.as_deref(), result.duration_ms, result.records_processed, result.records_failed)
            .await
        {
            tracing::error!(%error, "failed to finalize sync job log");
        }
    }
}
