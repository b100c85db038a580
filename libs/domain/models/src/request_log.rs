// [libs/domain/models/src/request_log.rs]
//! Append-mostly request log entry and the eventually-consistent
//! per-client IP rollup maintained alongside it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestLogEntry {
    pub id: String,
    pub ip: String,
    pub method: String,
    pub endpoint: String,
    pub status_code: u16,
    pub latency_ms: u64,
    pub user_agent: Option<String>,
    pub received_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientIpStat {
    pub ip: String,
    pub request_count: u64,
    pub error_count: u64,
    pub last_request_at: chrono::DateTime<chrono::Utc>,
    pub blocked: bool,
}

/// IP extraction falls back to this sentinel for unparsable client
/// addresses: treated as the "unknown" key, not blocked, counted normally.
pub const UNKNOWN_IP_KEY: &str = "unknown";

pub fn normalize_ip(raw: Option<&str>) -> String {
    match raw.and_then(|candidate| candidate.parse::<std::net::IpAddr>().ok()) {
        Some(addr) => addr.to_string(),
        None => UNKNOWN_IP_KEY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ipv4_passes_through() {
        assert_eq!(normalize_ip(Some("203.0.113.5")), "203.0.113.5");
    }

    #[test]
    fn garbage_input_falls_back_to_unknown() {
        assert_eq!(normalize_ip(Some("not-an-ip")), UNKNOWN_IP_KEY);
        assert_eq!(normalize_ip(None), UNKNOWN_IP_KEY);
    }
}
