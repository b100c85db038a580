// [libs/infra/db/src/repositories/mod.rs]
/*!
 * MODULE: REPOSITORY ACCESS MATRIX
 * LAYER: INFRASTRUCTURE (L3)
 * RESPONSIBILITY: ONE AUTHORITY STRUCT PER PERSISTED ENTITY
 */

pub mod admin_user_repository;
pub mod audit_repository;
pub mod finance_repository;
pub mod hadith_repository;
pub mod ip_block_repository;
pub mod job_repository;
pub mod job_schedule_repository;
pub mod prayer_repository;
pub mod quran_repository;
pub mod rate_limit_repository;
pub mod request_log_repository;
pub mod sync_log_repository;
pub mod zakat_repository;

pub use admin_user_repository::AdminUserRepository;
pub use audit_repository::{AuditFilters, AuditRepository};
pub use finance_repository::FinanceRepository;
pub use hadith_repository::HadithRepository;
pub use ip_block_repository::IpBlockRepository;
pub use job_repository::JobRepository;
pub use job_schedule_repository::JobScheduleRepository;
pub use prayer_repository::PrayerRepository;
pub use quran_repository::QuranRepository;
pub use rate_limit_repository::RateLimitRuleRepository;
pub use request_log_repository::RequestLogRepository;
pub use sync_log_repository::SyncLogRepository;
pub use zakat_repository::ZakatRepository;
