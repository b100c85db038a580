// [apps/gateway/src/state/mod.rs]
/*!
 * MODULE: APPLICATION STATE COMPOSITION ROOT
 * LAYER: APPLICATION (L4)
 * RESPONSIBILITY: ONE CLONEABLE HANDLE SHARED ACROSS EVERY AXUM HANDLER
 *
 * Every repository is pre-hydrated at boot rather than constructed lazily
 * per-request. `DbClient` itself is a cheap `Arc`-backed clone, so handing
 * each repository its own copy costs nothing and keeps each one free of
 * locking concerns beyond what the database layer already does.
 */

pub mod rate_limiter;

use std::sync::Arc;

use jsonwebtoken::{DecodingKey, EncodingKey};
use syncd_db::{
    AdminUserRepository, AuditRepository, FinanceRepository, HadithRepository, IpBlockRepository, JobRepository,
    JobScheduleRepository, PrayerRepository, QuranRepository, RateLimitRuleRepository, RequestLogRepository,
    SyncLogRepository, ZakatRepository,
};
use syncd_db::DbClient;
use syncd_http_client::UpstreamClient;

use crate::config::AppConfig;
use rate_limiter::RateLimiter;

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: Arc<EncodingKey>,
    pub decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbClient,
    pub upstream: Arc<UpstreamClient>,
    pub rate_limiter: Arc<RateLimiter>,
    pub jwt_keys: JwtKeys,

    pub admin_users: Arc<AdminUserRepository>,
    pub audit_log: Arc<AuditRepository>,
    pub finance: Arc<FinanceRepository>,
    pub hadith: Arc<HadithRepository>,
    pub ip_blocks: Arc<IpBlockRepository>,
    pub jobs: Arc<JobRepository>,
    pub job_schedules: Arc<JobScheduleRepository>,
    pub prayer: Arc<PrayerRepository>,
    pub quran: Arc<QuranRepository>,
    pub rate_limit_rules: Arc<RateLimitRuleRepository>,
    pub request_log: Arc<RequestLogRepository>,
    pub sync_log: Arc<SyncLogRepository>,
    pub zakat: Arc<ZakatRepository>,
}

impl AppState {
    pub fn new(config: AppConfig, db: DbClient) -> Self {
        let jwt_keys = JwtKeys::from_secret(&config.jwt_signing_secret);

        Self {
            admin_users: Arc::new(AdminUserRepository::new(db.clone())),
            audit_log: Arc::new(AuditRepository::new(db.clone())),
            finance: Arc::new(FinanceRepository::new(db.clone())),
            hadith: Arc::new(HadithRepository::new(db.clone())),
            ip_blocks: Arc::new(IpBlockRepository::new(db.clone())),
            jobs: Arc::new(JobRepository::new(db.clone())),
            job_schedules: Arc::new(JobScheduleRepository::new(db.clone())),
            prayer: Arc::new(PrayerRepository::new(db.clone())),
            quran: Arc::new(QuranRepository::new(db.clone())),
            rate_limit_rules: Arc::new(RateLimitRuleRepository::new(db.clone())),
            request_log: Arc::new(RequestLogRepository::new(db.clone())),
            sync_log: Arc::new(SyncLogRepository::new(db.clone())),
            zakat: Arc::new(ZakatRepository::new(db.clone())),

            upstream: Arc::new(UpstreamClient::new()),
            rate_limiter: Arc::new(RateLimiter::new()),
            jwt_keys,
            config: Arc::new(config),
            db,
        }
    }
}
