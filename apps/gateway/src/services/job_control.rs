// [apps/gateway/src/services/job_control.rs]
/*!
 * MODULE: JOB CONTROL PLANE
 * LAYER: APPLICATION SERVICE (L4)
 * RESPONSIBILITY: JOB LIFECYCLE STATE MACHINE, SCHEDULE CONFIG, QUEUE SUMMARY
 *
 * Every mutating operation here is a thin wrapper over a single
 * `JobRepository` call that already enforces its own
 * `UPDATE ... WHERE status = $expected` guard; this module's job is
 * dispatch (which sync function a `JobType` actually runs) and reporting
 * per-job outcomes for bulk operations without aborting on first failure.
 */

use serde::{Deserialize, Serialize};
use serde_json::Value;
use syncd_db::DbError;
use syncd_domain_models::job::{JobFilters, JobSchedule, JobStatusRecord, JobType, QueueStatus};
use syncd_domain_models::sync::SyncOptions;
use tracing::{error, info, instrument, warn};

use crate::errors::ApiError;
use crate::services::prayer_fanout::PrayerFanoutPlanner;
use crate::services::sync::{finance, hadith, quran, zakat};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkOp {
    Pause,
    Resume,
    Cancel,
    Delete,
}

impl std::str::FromStr for BulkOp {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pause" => Ok(BulkOp::Pause),
            "resume" => Ok(BulkOp::Resume),
            "cancel" => Ok(BulkOp::Cancel),
            "delete" => Ok(BulkOp::Delete),
            other => Err(format!("unknown bulk operation: {other}")),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BulkOutcome {
    pub job_id: String,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JobListPage {
    pub jobs: Vec<JobStatusRecord>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchedulePatch {
    pub enabled: Option<bool>,
    pub cron_expression: Option<Option<String>>,
    pub priority: Option<u8>,
    pub max_concurrency: Option<u32>,
    pub timeout_minutes: Option<u32>,
    pub retry_attempts: Option<u32>,
}

pub struct JobControl<'a> {
    pub state: &'a AppState,
}

impl<'a> JobControl<'a> {
    /// Creates a pending job row and, if the job type's schedule has a
    /// free concurrency slot, runs it immediately; otherwise the row stays
    /// `pending` until a caller (typically the scheduler tick) revisits it.
    #[instrument(skip(self, payload))]
    pub async fn trigger(&self, job_type: JobType, payload: Value) -> Result<String, ApiError> {
        let schedule = self.state.job_schedules.find_by_type(job_type).await?;
        let max_concurrency = schedule.as_ref().map(|s| s.max_concurrency).unwrap_or(1);
        let priority = schedule.as_ref().map(|s| s.priority).unwrap_or(5);

        let job = self.state.jobs.create(job_type.as_str(), job_type, priority, payload).await?;

        let active = self.state.jobs.count_active_for_type(job_type).await?;
        if active > max_concurrency {
            info!(job_id = %job.id, job_type = job_type.as_str(), "job queued: concurrency slot saturated");
            return Ok(job.id);
        }

        self.run_job(job.id.clone(), job_type).await;
        Ok(job.id)
    }

    /// Starts a pending job's work on a detached task. The task owns the
    /// full start -> dispatch -> complete/fail sequence so `trigger`
    /// returns as soon as the row is admitted to run.
    async fn run_job(&self, job_id: String, job_type: JobType) {
        if let Err(error) = self.state.jobs.start(&job_id).await {
            warn!(job_id, %error, "job failed to start");
            return;
        }

        let state = self.state.clone();
        tokio::spawn(async move {
            let options = SyncOptions::default();
            let outcome = dispatch(&state, job_type, options, &job_id).await;

            let cancelled = matches!(&outcome, Ok(result) if result.cancelled);
            if cancelled {
                if let Err(error) = state.jobs.cancel(&job_id).await {
                    error!(job_id, %error, "job cancellation write failed");
                }
                return;
            }

            let error_text = match &outcome {
                Ok(result) if result.success => None,
                Ok(result) => Some(result.errors.join("; ")),
                Err(error) => Some(error.to_string()),
            };

            if let Err(error) = state.jobs.complete(&job_id, error_text.as_deref()).await {
                error!(job_id, %error, "job completion write failed");
            }
        });
    }

    pub async fn pause(&self, job_id: &str) -> Result<(), ApiError> {
        self.state.jobs.pause(job_id).await.map_err(Into::into)
    }

    pub async fn resume(&self, job_id: &str) -> Result<(), ApiError> {
        self.state.jobs.resume(job_id).await.map_err(Into::into)
    }

    /// Cancel is immediate from `pending` (the repository's guard covers
    /// that transition directly); from `running` it only sets the
    /// cooperative flag the sync engine and fan-out planner poll between
    /// records, and the spawned task itself calls `complete`/`cancel` once
    /// it unwinds.
    pub async fn cancel(&self, job_id: &str) -> Result<(), ApiError> {
        match self.state.jobs.cancel(job_id).await {
            Ok(()) => Ok(()),
            Err(DbError::Conflict(_)) => self.state.jobs.request_cancel(job_id).await.map_err(Into::into),
            Err(error) => Err(error.into()),
        }
    }

    pub async fn update_priority(&self, job_id: &str, priority: u8) -> Result<(), ApiError> {
        if !(1..=10).contains(&priority) {
            return Err(ApiError::Validation("priority must be between 1 and 10".into()));
        }
        self.state.jobs.update_priority(job_id, priority).await.map_err(Into::into)
    }

    pub async fn delete(&self, job_id: &str) -> Result<(), ApiError> {
        self.state.jobs.delete(job_id).await.map_err(Into::into)
    }

    pub async fn list(&self, filters: &JobFilters, limit: usize, offset: usize) -> Result<JobListPage, ApiError> {
        let mut jobs = self.state.jobs.list(filters).await?;
        let total = jobs.len();
        let page: Vec<JobStatusRecord> = jobs.drain(..).skip(offset).take(limit).collect();
        let has_more = offset + page.len() < total;
        Ok(JobListPage { jobs: page, total, limit, offset, has_more })
    }

    /// Applies `op` to every job id independently; one job's failure never
    /// prevents the rest from being attempted.
    pub async fn bulk(&self, op: BulkOp, job_ids: &[String]) -> Vec<BulkOutcome> {
        let mut outcomes = Vec::with_capacity(job_ids.len());
        for job_id in job_ids {
            let result = match op {
                BulkOp::Pause => self.pause(job_id).await,
                BulkOp::Resume => self.resume(job_id).await,
                BulkOp::Cancel => self.cancel(job_id).await,
                BulkOp::Delete => self.delete(job_id).await,
            };
            outcomes.push(BulkOutcome {
                job_id: job_id.clone(),
                success: result.is_ok(),
                error: result.err().map(|e| e.to_string()),
            });
        }
        outcomes
    }

    pub async fn list_schedules(&self) -> Result<Vec<JobSchedule>, ApiError> {
        let mut schedules = Vec::with_capacity(JobType::all().len());
        for job_type in JobType::all() {
            if let Some(schedule) = self.state.job_schedules.find_by_type(job_type).await? {
                schedules.push(schedule);
            }
        }
        Ok(schedules)
    }

    pub async fn update_schedule(&self, job_type: JobType, patch: SchedulePatch) -> Result<JobSchedule, ApiError> {
        let mut schedule = self
            .state
            .job_schedules
            .find_by_type(job_type)
            .await?
            .unwrap_or(JobSchedule {
                job_type,
                enabled: false,
                cron_expression: None,
                priority: 5,
                max_concurrency: 1,
                timeout_minutes: 30,
                retry_attempts: 0,
            });

        if let Some(enabled) = patch.enabled {
            schedule.enabled = enabled;
        }
        if let Some(cron_expression) = patch.cron_expression {
            schedule.cron_expression = cron_expression;
        }
        if let Some(priority) = patch.priority {
            schedule.priority = priority;
        }
        if let Some(max_concurrency) = patch.max_concurrency {
            schedule.max_concurrency = max_concurrency;
        }
        if let Some(timeout_minutes) = patch.timeout_minutes {
            schedule.timeout_minutes = timeout_minutes;
        }
        if let Some(retry_attempts) = patch.retry_attempts {
            schedule.retry_attempts = retry_attempts;
        }

        self.state.job_schedules.upsert(&schedule).await?;
        Ok(schedule)
    }

    pub async fn toggle_schedule(&self, job_type: JobType, enabled: bool) -> Result<JobSchedule, ApiError> {
        self.update_schedule(job_type, SchedulePatch { enabled: Some(enabled), ..Default::default() }).await
    }

    pub async fn queue_status(&self) -> Result<QueueStatus, ApiError> {
        self.state.jobs.queue_status().await.map_err(Into::into)
    }
}

/// Routes a job type to its concrete sync implementation. `prayer` and
/// `zakat` take the local read-only/no-op paths already wired into their
/// respective modules; the rest call the upstream-backed engine passes.
/// `job_id` is threaded through so each path can poll the job's
/// cooperative cancellation flag while it runs.
async fn dispatch(state: &AppState, job_type: JobType, options: SyncOptions, job_id: &str) -> Result<syncd_domain_models::sync::SyncResult, ApiError> {
    match job_type {
        JobType::Quran => quran::sync(state, options, Some(job_id)).await,
        JobType::Hadith => hadith::sync(state, options, Some(job_id)).await,
        JobType::Audio => finance::sync_audio(state, options, Some(job_id)).await,
        JobType::Finance => finance::sync_gold_price(state, options, Some(job_id)).await,
        JobType::Zakat => zakat::sync(state, options, Some(job_id)).await,
        JobType::Prayer => {
            let planner = PrayerFanoutPlanner { state };
            planner.prewarm(30, options, Some(job_id)).await
        }
    }
}
