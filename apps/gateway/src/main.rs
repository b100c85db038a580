// [apps/gateway/src/main.rs]
/*!
 * MODULE: GATEWAY ENTRY POINT
 * LAYER: APPLICATION (L4)
 * RESPONSIBILITY: BOOTSTRAP, SEEDING, AND PROCESS LIFECYCLE
 *
 * Bootstrap failure (missing secret, unreachable store, malformed
 * schedule table) exits non-zero before the listener ever binds, per the
 * exit-code contract operators script health checks against.
 */

use std::process::ExitCode;

use syncd_db::DbClient;
use syncd_domain_models::admin_user::AdminRole;
use syncd_domain_models::job::{JobSchedule, JobType};
use syncd_gateway::routes::{build_router, serve};
use syncd_gateway::services::auth_service::hash_password;
use syncd_gateway::{scheduler, AppConfig, AppState};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    syncd_telemetry::init_tracing("syncd-gateway");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "bootstrap failed: invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let db = match DbClient::connect(&config.database_url, config.database_auth_token.clone()).await {
        Ok(db) => db,
        Err(error) => {
            tracing::error!(%error, "bootstrap failed: database unreachable");
            return ExitCode::FAILURE;
        }
    };

    let port = config.listen_port;
    let bcrypt_cost = config.bcrypt_cost;
    let state = AppState::new(config, db);

    if let Err(error) = seed_default_super_admin(&state, bcrypt_cost).await {
        error!(%error, "bootstrap failed: could not seed default super admin");
        return ExitCode::FAILURE;
    }
    if let Err(error) = seed_job_schedules(&state).await {
        error!(%error, "bootstrap failed: could not seed job schedules");
        return ExitCode::FAILURE;
    }

    tokio::spawn(scheduler::run(state.clone()));

    let router = build_router(state);
    if let Err(error) = serve(router, port).await {
        error!(%error, "gateway terminated unexpectedly");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Creates the operator account an empty deployment needs to log in at
/// all. A no-op once at least one `super_admin` exists.
async fn seed_default_super_admin(state: &AppState, bcrypt_cost: u32) -> Result<(), String> {
    let existing = state.admin_users.count_active_super_admins().await.map_err(|e| e.to_string())?;
    if existing > 0 {
        return Ok(());
    }

    let email = std::env::var("DEFAULT_SUPER_ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.test".to_string());
    let password = std::env::var("DEFAULT_SUPER_ADMIN_PASSWORD").map_err(|_| {
        "no super_admin exists and DEFAULT_SUPER_ADMIN_PASSWORD is not set".to_string()
    })?;

    let password_hash = hash_password(&password, bcrypt_cost).map_err(|e| e.to_string())?;
    state
        .admin_users
        .create(&email, &password_hash, None, None, AdminRole::SuperAdmin)
        .await
        .map_err(|e| e.to_string())?;
    info!(email, "seeded default super_admin account");
    Ok(())
}

/// Ensures every job type has a schedule row, disabled by default, so
/// `/job-control/schedules` always has something to list and operators
/// opt into cron-driven sync rather than it running unannounced.
async fn seed_job_schedules(state: &AppState) -> Result<(), String> {
    for job_type in JobType::all() {
        if state.job_schedules.find_by_type(job_type).await.map_err(|e| e.to_string())?.is_some() {
            continue;
        }
        let schedule = JobSchedule {
            job_type,
            enabled: false,
            cron_expression: Some(default_cron_for(job_type).to_string()),
            priority: 5,
            max_concurrency: if job_type == JobType::Prayer { 2 } else { 1 },
            timeout_minutes: 30,
            retry_attempts: 0,
        };
        state.job_schedules.upsert(&schedule).await.map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn default_cron_for(job_type: JobType) -> &'static str {
    match job_type {
        JobType::Quran => "0 3 * * *",
        JobType::Hadith => "0 4 * * *",
        JobType::Audio => "0 5 * * *",
        JobType::Finance => "0 * * * *",
        JobType::Zakat => "30 5 * * *",
        JobType::Prayer => "0 2 * * *",
    }
}
