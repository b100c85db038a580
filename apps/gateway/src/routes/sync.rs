// [apps/gateway/src/routes/sync.rs]
//! Sync trigger endpoints and the prayer fan-out's two distinguished
//! surfaces (prewarm, single-slice). Generic `/sync/{module}` enqueues
//! through the job control plane so callers get a `jobId` back
//! immediately; the prayer-specific routes run synchronously since their
//! parameters (days, lat/lng/method/school) don't fit the generic
//! `SyncOptions` a queued job carries.

use axum::extract::{Query, State};
use axum::response::Response;
use axum::{Extension, Json};
use serde::Deserialize;
use syncd_domain_models::job::JobType;
use syncd_domain_models::prayer::{School, PrayerSyncRequest};
use syncd_domain_models::sync::SyncOptions;

use crate::errors::ApiError;
use crate::middleware::auth_guard::{require_permission, OperatorIdentity};
use crate::routes::response::ok;
use crate::services::job_control::JobControl;
use crate::services::prayer_fanout::PrayerFanoutPlanner;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SyncLogsQuery {
    resource: Option<String>,
    limit: Option<u32>,
}

pub async fn sync_logs(State(state): State<AppState>, Query(query): Query<SyncLogsQuery>) -> Result<Response, ApiError> {
    let resource = query.resource.as_deref().unwrap_or("quran-chapters");
    let logs = state.sync_log.list_for_resource(resource, query.limit.unwrap_or(50)).await?;
    Ok(ok(logs))
}

#[derive(Deserialize, Default)]
pub struct TriggerSyncRequest {
    #[serde(default)]
    force: bool,
    #[serde(default)]
    dry_run: bool,
}

pub async fn trigger(
    State(state): State<AppState>,
    Extension(identity): Extension<OperatorIdentity>,
    axum::extract::Path(module): axum::extract::Path<String>,
    body: Option<Json<TriggerSyncRequest>>,
) -> Result<Response, ApiError> {
    require_permission(&identity, "manage:sync")?;
    let job_type: JobType = module.parse().map_err(ApiError::Validation)?;
    let options = body.map(|Json(b)| b).unwrap_or_default();

    let job_id = JobControl { state: &state }
        .trigger(job_type, serde_json::json!({ "force": options.force, "dryRun": options.dry_run }))
        .await?;

    Ok(ok(serde_json::json!({ "jobId": job_id, "message": format!("{module} sync triggered") })))
}

#[derive(Deserialize)]
pub struct PrewarmQuery {
    days: Option<u16>,
}

pub async fn prewarm(State(state): State<AppState>, Extension(identity): Extension<OperatorIdentity>, Query(query): Query<PrewarmQuery>) -> Result<Response, ApiError> {
    require_permission(&identity, "manage:sync")?;
    let days = query.days.unwrap_or(30);
    if days == 0 || days > 365 {
        return Err(ApiError::Validation("days must be between 1 and 365".to_string()));
    }

    let result = PrayerFanoutPlanner { state: &state }.prewarm(days, SyncOptions::default(), None).await?;
    Ok(ok(result))
}

#[derive(Deserialize)]
pub struct PrayerTimesQuery {
    /// Comma-separated location ids, e.g. `?locationIds=1,2,3`.
    #[serde(rename = "locationIds")]
    location_ids: String,
    #[serde(rename = "methodId")]
    method_id: i64,
    school: Option<School>,
    days: Option<u16>,
    #[serde(default)]
    force: bool,
}

pub async fn prayer_times(
    State(state): State<AppState>,
    Extension(identity): Extension<OperatorIdentity>,
    Query(query): Query<PrayerTimesQuery>,
) -> Result<Response, ApiError> {
    require_permission(&identity, "manage:sync")?;
    let location_ids: Vec<i64> = query
        .location_ids
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i64>().map_err(|_| ApiError::Validation(format!("invalid location id: {s}"))))
        .collect::<Result<_, _>>()?;

    let request = PrayerSyncRequest { location_ids, method_id: query.method_id, school: query.school, days: query.days.unwrap_or(30) };
    let options = SyncOptions { force: query.force, ..Default::default() };

    let result = PrayerFanoutPlanner { state: &state }.sync_request(request, options).await?;
    Ok(ok(result))
}
