// [apps/gateway/src/routes/job_control.rs]
//! Job queue inspection and control: list/trigger/pause/resume/cancel/
//! delete, bulk operations, schedule configuration, and queue status.

use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::Value;
use syncd_domain_models::job::{JobFilters, JobStatus, JobType};

use crate::errors::ApiError;
use crate::middleware::auth_guard::{require_permission, OperatorIdentity};
use crate::routes::response::{ok, ok_message};
use crate::services::job_control::{BulkOp, JobControl, SchedulePatch};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListJobsQuery {
    status: Option<JobStatus>,
    #[serde(rename = "jobType")]
    job_type: Option<JobType>,
    priority: Option<u8>,
    limit: Option<usize>,
    offset: Option<usize>,
}

pub async fn list(State(state): State<AppState>, Extension(identity): Extension<OperatorIdentity>, Query(query): Query<ListJobsQuery>) -> Result<Response, ApiError> {
    require_permission(&identity, "manage:jobs")?;
    let filters = JobFilters { status: query.status, job_type: query.job_type, priority: query.priority, start_date: None, end_date: None };
    let page = JobControl { state: &state }.list(&filters, query.limit.unwrap_or(50), query.offset.unwrap_or(0)).await?;
    Ok(ok(page))
}

#[derive(Deserialize)]
pub struct TriggerJobRequest {
    #[serde(rename = "jobType")]
    job_type: JobType,
    #[serde(default)]
    payload: Value,
}

pub async fn trigger(
    State(state): State<AppState>,
    Extension(identity): Extension<OperatorIdentity>,
    Json(request): Json<TriggerJobRequest>,
) -> Result<Response, ApiError> {
    require_permission(&identity, "manage:jobs")?;
    let job_id = JobControl { state: &state }.trigger(request.job_type, request.payload).await?;
    Ok(ok(serde_json::json!({ "jobId": job_id })))
}

pub async fn find(State(state): State<AppState>, Extension(identity): Extension<OperatorIdentity>, Path(job_id): Path<String>) -> Result<Response, ApiError> {
    require_permission(&identity, "manage:jobs")?;
    let job = state.jobs.find_by_id(&job_id).await?.ok_or_else(|| ApiError::NotFound(format!("no job {job_id}")))?;
    Ok(ok(job))
}

#[derive(Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum JobPatch {
    Pause,
    Resume,
    Cancel,
    UpdatePriority { priority: u8 },
}

pub async fn patch(
    State(state): State<AppState>,
    Extension(identity): Extension<OperatorIdentity>,
    Path(job_id): Path<String>,
    Json(request): Json<JobPatch>,
) -> Result<Response, ApiError> {
    require_permission(&identity, "manage:jobs")?;
    let control = JobControl { state: &state };
    match request {
        JobPatch::Pause => control.pause(&job_id).await?,
        JobPatch::Resume => control.resume(&job_id).await?,
        JobPatch::Cancel => control.cancel(&job_id).await?,
        JobPatch::UpdatePriority { priority } => control.update_priority(&job_id, priority).await?,
    }
    Ok(ok_message("job updated"))
}

pub async fn delete(State(state): State<AppState>, Extension(identity): Extension<OperatorIdentity>, Path(job_id): Path<String>) -> Result<Response, ApiError> {
    require_permission(&identity, "manage:jobs")?;
    JobControl { state: &state }.delete(&job_id).await?;
    Ok(ok_message("job deleted"))
}

#[derive(Deserialize)]
pub struct BulkRequest {
    op: String,
    #[serde(rename = "jobIds")]
    job_ids: Vec<String>,
}

pub async fn bulk(State(state): State<AppState>, Extension(identity): Extension<OperatorIdentity>, Json(request): Json<BulkRequest>) -> Result<Response, ApiError> {
    require_permission(&identity, "manage:jobs")?;
    let op: BulkOp = request.op.parse().map_err(ApiError::Validation)?;
    let outcomes = JobControl { state: &state }.bulk(op, &request.job_ids).await;
    Ok(ok(outcomes))
}

pub async fn list_schedules(State(state): State<AppState>, Extension(identity): Extension<OperatorIdentity>) -> Result<Response, ApiError> {
    require_permission(&identity, "manage:jobs")?;
    Ok(ok(JobControl { state: &state }.list_schedules().await?))
}

pub async fn update_schedule(
    State(state): State<AppState>,
    Extension(identity): Extension<OperatorIdentity>,
    Path(job_type): Path<JobType>,
    Json(patch): Json<SchedulePatch>,
) -> Result<Response, ApiError> {
    require_permission(&identity, "manage:jobs")?;
    let schedule = JobControl { state: &state }.update_schedule(job_type, patch).await?;
    Ok(ok(schedule))
}

pub async fn queue_status(State(state): State<AppState>, Extension(identity): Extension<OperatorIdentity>) -> Result<Response, ApiError> {
    require_permission(&identity, "manage:jobs")?;
    Ok(ok(JobControl { state: &state }.queue_status().await?))
}
