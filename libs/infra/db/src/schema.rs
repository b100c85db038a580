// [libs/infra/db/src/schema.rs]
/*!
 * MODULE: SCHEMA BOOTSTRAP
 * LAYER: INFRASTRUCTURE (L3)
 * RESPONSIBILITY: IDEMPOTENT TABLE AND INDEX CREATION
 *
 * Every statement is `CREATE TABLE IF NOT EXISTS` / `CREATE INDEX IF NOT
 * EXISTS`, safe to run on every boot against an existing database.
 */

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info, instrument};

const TABLES: &[(&str, &str)] = &[
    ("admin_users", r#"
        CREATE TABLE IF NOT EXISTS admin_users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            first_name TEXT,
            last_name TEXT,
            role TEXT NOT NULL DEFAULT 'viewer',
            permissions TEXT,
            active INTEGER NOT NULL DEFAULT 1,
            last_login_at DATETIME,
            current_refresh_token_id TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("audit_log_entries", r#"
        CREATE TABLE IF NOT EXISTS audit_log_entries (
            id TEXT PRIMARY KEY,
            user_id TEXT,
            action TEXT NOT NULL,
            resource TEXT NOT NULL,
            resource_id TEXT,
            detail TEXT,
            ip TEXT,
            user_agent TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("rate_limit_rules", r#"
        CREATE TABLE IF NOT EXISTS rate_limit_rules (
            id TEXT PRIMARY KEY,
            endpoint_pattern TEXT NOT NULL,
            method TEXT NOT NULL DEFAULT 'ALL',
            limit_count INTEGER NOT NULL,
            window_seconds INTEGER NOT NULL,
            enabled INTEGER NOT NULL DEFAULT 1,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(endpoint_pattern, method)
        );
    "#),
    ("ip_block_rules", r#"
        CREATE TABLE IF NOT EXISTS ip_block_rules (
            id TEXT PRIMARY KEY,
            ip_address TEXT NOT NULL UNIQUE,
            reason TEXT NOT NULL,
            blocked_by TEXT NOT NULL,
            blocked_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            expires_at DATETIME,
            enabled INTEGER NOT NULL DEFAULT 1
        );
    "#),
    ("client_ip_stats", r#"
        CREATE TABLE IF NOT EXISTS client_ip_stats (
            ip TEXT PRIMARY KEY,
            request_count INTEGER NOT NULL DEFAULT 0,
            error_count INTEGER NOT NULL DEFAULT 0,
            last_request_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            blocked INTEGER NOT NULL DEFAULT 0
        );
    "#),
    ("request_log_entries", r#"
        CREATE TABLE IF NOT EXISTS request_log_entries (
            id TEXT PRIMARY KEY,
            ip TEXT NOT NULL,
            method TEXT NOT NULL,
            endpoint TEXT NOT NULL,
            status_code INTEGER NOT NULL,
            latency_ms INTEGER NOT NULL,
            user_agent TEXT,
            received_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("sync_job_logs", r#"
        CREATE TABLE IF NOT EXISTS sync_job_logs (
            id TEXT PRIMARY KEY,
            job_name TEXT NOT NULL,
            resource TEXT NOT NULL,
            started_at DATETIME NOT NULL,
            finished_at DATETIME,
            status TEXT NOT NULL DEFAULT 'pending',
            error_text TEXT,
            duration_ms INTEGER NOT NULL DEFAULT 0,
            records_processed INTEGER NOT NULL DEFAULT 0,
            records_failed INTEGER NOT NULL DEFAULT 0
        );
    "#),
    ("job_status_records", r#"
        CREATE TABLE IF NOT EXISTS job_status_records (
            id TEXT PRIMARY KEY,
            job_name TEXT NOT NULL,
            job_type TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            progress_percentage INTEGER NOT NULL DEFAULT 0,
            priority INTEGER NOT NULL DEFAULT 5,
            started_at DATETIME,
            completed_at DATETIME,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            error_text TEXT,
            metadata TEXT,
            cancel_requested INTEGER NOT NULL DEFAULT 0
        );
    "#),
    ("job_schedules", r#"
        CREATE TABLE IF NOT EXISTS job_schedules (
            job_type TEXT PRIMARY KEY,
            enabled INTEGER NOT NULL DEFAULT 1,
            cron_expression TEXT,
            priority INTEGER NOT NULL DEFAULT 5,
            max_concurrency INTEGER NOT NULL DEFAULT 1,
            timeout_minutes INTEGER NOT NULL DEFAULT 30,
            retry_attempts INTEGER NOT NULL DEFAULT 3
        );
    "#),
    ("quran_chapters", r#"
        CREATE TABLE IF NOT EXISTS quran_chapters (
            chapter_number INTEGER PRIMARY KEY,
            name_arabic TEXT NOT NULL,
            name_simple TEXT NOT NULL,
            name_english TEXT NOT NULL,
            verses_count INTEGER NOT NULL,
            revelation_place TEXT NOT NULL,
            last_synced_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("quran_verses", r#"
        CREATE TABLE IF NOT EXISTS quran_verses (
            chapter_number INTEGER NOT NULL,
            verse_number INTEGER NOT NULL,
            text_arabic TEXT NOT NULL,
            juz_number INTEGER NOT NULL,
            page_number INTEGER NOT NULL,
            last_synced_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY(chapter_number, verse_number)
        );
    "#),
    ("quran_translations", r#"
        CREATE TABLE IF NOT EXISTS quran_translations (
            chapter_number INTEGER NOT NULL,
            verse_number INTEGER NOT NULL,
            resource_id INTEGER NOT NULL,
            language_code TEXT NOT NULL,
            text TEXT NOT NULL,
            last_synced_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY(chapter_number, verse_number, resource_id)
        );
    "#),
    ("hadith_collections", r#"
        CREATE TABLE IF NOT EXISTS hadith_collections (
            slug TEXT PRIMARY KEY,
            name_arabic TEXT NOT NULL,
            name_english TEXT NOT NULL,
            total_hadiths INTEGER NOT NULL DEFAULT 0,
            last_synced_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("hadith_books", r#"
        CREATE TABLE IF NOT EXISTS hadith_books (
            collection_slug TEXT NOT NULL,
            book_number INTEGER NOT NULL,
            name_arabic TEXT NOT NULL,
            name_english TEXT NOT NULL,
            last_synced_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY(collection_slug, book_number)
        );
    "#),
    ("hadiths", r#"
        CREATE TABLE IF NOT EXISTS hadiths (
            collection_slug TEXT NOT NULL,
            book_number INTEGER NOT NULL,
            hadith_number INTEGER NOT NULL,
            text_arabic TEXT NOT NULL,
            text_english TEXT,
            grade TEXT,
            last_synced_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY(collection_slug, book_number, hadith_number)
        );
    "#),
    ("prayer_locations", r#"
        CREATE TABLE IF NOT EXISTS prayer_locations (
            location_id INTEGER PRIMARY KEY,
            city TEXT NOT NULL,
            country TEXT NOT NULL,
            latitude REAL NOT NULL,
            longitude REAL NOT NULL,
            timezone TEXT NOT NULL,
            UNIQUE(city, country)
        );
    "#),
    ("prayer_methods", r#"
        CREATE TABLE IF NOT EXISTS prayer_methods (
            method_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            params TEXT
        );
    "#),
    ("prayer_times", r#"
        CREATE TABLE IF NOT EXISTS prayer_times (
            location_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            method_id INTEGER NOT NULL,
            school INTEGER NOT NULL DEFAULT 0,
            fajr TEXT NOT NULL,
            sunrise TEXT NOT NULL,
            dhuhr TEXT NOT NULL,
            asr TEXT NOT NULL,
            maghrib TEXT NOT NULL,
            isha TEXT NOT NULL,
            last_synced_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY(location_id, date, method_id, school)
        );
    "#),
    ("gold_prices", r#"
        CREATE TABLE IF NOT EXISTS gold_prices (
            date TEXT NOT NULL,
            currency TEXT NOT NULL,
            karat INTEGER NOT NULL,
            price_per_gram REAL NOT NULL,
            last_synced_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY(date, currency, karat)
        );
    "#),
    ("reciters", r#"
        CREATE TABLE IF NOT EXISTS reciters (
            reciter_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            style TEXT,
            language TEXT,
            last_synced_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("zakat_calculations", r#"
        CREATE TABLE IF NOT EXISTS zakat_calculations (
            id TEXT PRIMARY KEY,
            user_reference TEXT,
            asset_value REAL NOT NULL,
            currency TEXT NOT NULL,
            nisab_threshold REAL NOT NULL,
            zakat_due REAL NOT NULL,
            calculated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
];

const INDEXES: &[(&str, &str)] = &[
    ("idx_audit_resource", "CREATE INDEX IF NOT EXISTS idx_audit_resource ON audit_log_entries(resource, resource_id);"),
    ("idx_audit_created_at", "CREATE INDEX IF NOT EXISTS idx_audit_created_at ON audit_log_entries(created_at);"),
    ("idx_request_log_ip", "CREATE INDEX IF NOT EXISTS idx_request_log_ip ON request_log_entries(ip, received_at);"),
    ("idx_job_status_type", "CREATE INDEX IF NOT EXISTS idx_job_status_type ON job_status_records(job_type, status);"),
    ("idx_sync_log_resource", "CREATE INDEX IF NOT EXISTS idx_sync_log_resource ON sync_job_logs(resource, started_at);"),
    ("idx_quran_translations_lang", "CREATE INDEX IF NOT EXISTS idx_quran_translations_lang ON quran_translations(language_code);"),
    ("idx_prayer_times_location_date", "CREATE INDEX IF NOT EXISTS idx_prayer_times_location_date ON prayer_times(location_id, date);"),
];

#[instrument(skip(connection))]
pub async fn apply_schema(connection: &Connection) -> Result<()> {
    info!("applying schema bootstrap");
    for (name, sql) in TABLES {
        debug!(table = name, "creating table if missing");
        connection
            .execute(sql, ())
            .await
            .with_context(|| format!("failed to create table {name}"))?;
    }
    for (name, sql) in INDEXES {
        debug!(index = name, "creating index if missing");
        connection
            .execute(sql, ())
            .await
            .with_context(|| format!("failed to create index {name}"))?;
    }
    info!("schema bootstrap complete");
    Ok(())
}
