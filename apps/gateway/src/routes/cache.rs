// [apps/gateway/src/routes/cache.rs]
//! `POST /cache/clear` — invalidates every in-process read-through cache.
//! There is no job-control list cache today (`/job-control` always reads
//! straight from `job_status_records`), so this only drops the rate
//! limiter's counter map; it is kept as its own endpoint rather than
//! folded into rule deletion since operators also reach for it after an
//! unrelated config change they want felt immediately.

use axum::extract::State;
use axum::response::Response;
use axum::Extension;

use crate::errors::ApiError;
use crate::middleware::auth_guard::{require_permission, OperatorIdentity};
use crate::routes::response::ok_message;
use crate::state::AppState;

pub async fn clear(State(state): State<AppState>, Extension(identity): Extension<OperatorIdentity>) -> Result<Response, ApiError> {
    require_permission(&identity, "manage:jobs")?;
    state.rate_limiter.clear_all();
    Ok(ok_message("cache cleared"))
}
