// [apps/gateway/src/config.rs]
/*!
 * MODULE: RUNTIME CONFIGURATION
 * LAYER: APPLICATION (L4)
 * RESPONSIBILITY: ENVIRONMENT-DERIVED SETTINGS, LOADED ONCE AT BOOT
 *
 * Every field has a sane default except the two secrets (`database_url`,
 * `jwt_signing_secret`), which are required — a missing secret should fail
 * fast at boot, not surface as an auth bug later.
 */

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_auth_token: Option<String>,
    pub listen_port: u16,
    pub jwt_signing_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub bcrypt_cost: u32,
    pub bulk_chunk_size: usize,
    pub sync_gating_interval: Duration,
    pub prayer_max_concurrency: u32,
    pub prayer_politeness_delay: (Duration, Duration),
    pub prayer_retry_max_attempts: u32,
    pub prayer_retry_backoff_ms: u64,
    pub quran_translation_fallbacks: Vec<String>,

    pub quran_api_base: String,
    pub hadith_api_base: String,
    pub prayer_api_base: String,
    pub gold_price_api_base: String,
    pub reciter_api_base: String,
}

impl AppConfig {
    /// Reads every setting from the process environment. `dotenvy::dotenv()`
    /// must already have run so a local `.env` file is visible here.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL is not set".to_string())?;
        let jwt_signing_secret =
            std::env::var("JWT_SIGNING_SECRET").map_err(|_| "JWT_SIGNING_SECRET is not set".to_string())?;

        Ok(Self {
            database_url,
            database_auth_token: std::env::var("DATABASE_AUTH_TOKEN").ok(),
            listen_port: env_parse("PORT", 3000),
            jwt_signing_secret,
            access_token_ttl: Duration::from_secs(15 * 60),
            refresh_token_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            bcrypt_cost: env_parse("BCRYPT_COST", 12),
            bulk_chunk_size: env_parse("BULK_CHUNK_SIZE", syncd_db::DEFAULT_CHUNK_SIZE),
            sync_gating_interval: Duration::from_secs(env_parse("SYNC_GATING_INTERVAL_SECONDS", 24 * 60 * 60)),
            prayer_max_concurrency: env_parse("PRAYER_MAX_CONCURRENCY", 2),
            prayer_politeness_delay: (
                Duration::from_millis(env_parse("PRAYER_POLITENESS_DELAY_MIN_MS", 75)),
                Duration::from_millis(env_parse("PRAYER_POLITENESS_DELAY_MAX_MS", 500)),
            ),
            prayer_retry_max_attempts: env_parse("PRAYER_RETRY_MAX_ATTEMPTS", 1),
            prayer_retry_backoff_ms: env_parse("PRAYER_RETRY_BACKOFF_MS", 0),
            quran_translation_fallbacks: std::env::var("QURAN_TRANSLATION_FALLBACKS")
                .map(|raw| raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
                .unwrap_or_default(),

            quran_api_base: std::env::var("QURAN_API_BASE").unwrap_or_else(|_| "https://api.quran.com/api/v4".to_string()),
            hadith_api_base: std::env::var("HADITH_API_BASE").unwrap_or_else(|_| "https://api.sunnah.com/v1".to_string()),
            prayer_api_base: std::env::var("PRAYER_API_BASE").unwrap_or_else(|_| "https://api.aladhan.com/v1".to_string()),
            gold_price_api_base: std::env::var("GOLD_PRICE_API_BASE").unwrap_or_else(|_| "https://api.metals.dev/v1".to_string()),
            reciter_api_base: std::env::var("RECITER_API_BASE").unwrap_or_else(|_| "https://api.quran.com/api/v4".to_string()),
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|raw| raw.parse().ok()).unwrap_or(default)
}
