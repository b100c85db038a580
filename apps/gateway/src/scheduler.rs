// [apps/gateway/src/scheduler.rs]
/*!
 * MODULE: CRON SCHEDULER
 * LAYER: APPLICATION SERVICE (L4)
 * RESPONSIBILITY: TICKS ENABLED JOB SCHEDULES AND TRIGGERS DUE JOB TYPES
 *
 * A one-minute tick granularity matches cron's own minute resolution; a
 * schedule is "due" the first tick whose minute falls on or after its
 * computed next-fire time, tracked per job type so a missed tick (e.g.
 * the process was down) fires at most once on recovery rather than
 * backfilling every minute that passed.
 */

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use cron::Schedule;
use syncd_domain_models::job::JobType;
use tracing::{error, info, warn};

use crate::services::job_control::JobControl;
use crate::state::AppState;

const TICK_INTERVAL: Duration = Duration::from_secs(60);

/// Runs forever, polling enabled schedules once a minute. Intended to be
/// spawned once at boot with `tokio::spawn`.
pub async fn run(state: AppState) {
    let mut next_fire: HashMap<JobType, chrono::DateTime<Utc>> = HashMap::new();
    let mut interval = tokio::time::interval(TICK_INTERVAL);

    loop {
        interval.tick().await;
        let now = Utc::now();

        let schedules = match state.job_schedules.list_enabled().await {
            Ok(schedules) => schedules,
            Err(error) => {
                error!(%error, "scheduler tick failed to load schedules");
                continue;
            }
        };

        for schedule in schedules {
            let Some(cron_expression) = &schedule.cron_expression else { continue };
            let parsed = match Schedule::from_str(&with_seconds_field(cron_expression)) {
                Ok(parsed) => parsed,
                Err(error) => {
                    warn!(job_type = schedule.job_type.as_str(), %error, "invalid cron expression, skipping");
                    continue;
                }
            };

            let due = match next_fire.get(&schedule.job_type) {
                Some(scheduled_for) => now >= *scheduled_for,
                None => parsed.after(&(now - chrono::Duration::minutes(1))).next().map(|t| now >= t).unwrap_or(false),
            };

            if due {
                info!(job_type = schedule.job_type.as_str(), "scheduler triggering due job");
                if let Err(error) = JobControl { state: &state }.trigger(schedule.job_type, serde_json::Value::Null).await {
                    error!(job_type = schedule.job_type.as_str(), %error, "scheduled trigger failed");
                }
            }

            if let Some(next) = parsed.after(&now).next() {
                next_fire.insert(schedule.job_type, next);
            }
        }
    }
}

/// The `cron` crate expects a leading seconds field; standard 5-field
/// POSIX cron expressions (the format job schedules are authored in) get
/// `0` prepended so every fire lands on the minute boundary.
fn with_seconds_field(expression: &str) -> String {
    format!("0 {expression}")
}
