// [apps/gateway/src/routes/summary.rs]
//! `GET /summary` — a single dashboard rollup over the pieces an operator
//! glances at first: the job queue, content catalog sizes, and recent
//! sync activity.

use axum::extract::State;
use axum::response::Response;

use crate::errors::ApiError;
use crate::routes::response::ok;
use crate::state::AppState;

pub async fn summary(State(state): State<AppState>) -> Result<Response, ApiError> {
    let queue_status = state.jobs.queue_status().await?;
    let chapter_count = state.quran.count_chapters().await?;
    let rate_limit_rules = state.rate_limit_rules.list().await?;
    let ip_block_rules = state.ip_blocks.list().await?;
    let quran_logs = state.sync_log.list_for_resource("quran-chapters", 1).await?;

    Ok(ok(serde_json::json!({
        "queueStatus": queue_status,
        "contentCatalog": { "quranChapters": chapter_count },
        "rateLimitRules": { "total": rate_limit_rules.len(), "enabled": rate_limit_rules.iter().filter(|r| r.enabled).count() },
        "ipBlockRules": { "total": ip_block_rules.len(), "enabled": ip_block_rules.iter().filter(|r| r.enabled).count() },
        "lastQuranSync": quran_logs.first(),
    })))
}
