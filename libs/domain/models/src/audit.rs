// [libs/domain/models/src/audit.rs]
//! Append-only audit trail entry. Never mutated after insert.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: String,
    pub user_id: Option<String>,
    pub action: String,
    pub resource: String,
    pub resource_id: Option<String>,
    pub detail: Value,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Fields stripped from audit detail payloads before they are persisted.
const REDACTED_KEYS: &[&str] = &[
    "password",
    "current_password",
    "new_password",
    "password_hash",
    "access_token",
    "refresh_token",
    "token",
];

/// Removes sensitive fields from a detail payload before it is written to
/// the audit log.
pub fn redact_detail(mut detail: Value) -> Value {
    if let Value::Object(map) = &mut detail {
        for key in REDACTED_KEYS {
            map.remove(*key);
        }
    }
    detail
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_password_and_token_fields() {
        let detail = json!({
            "email": "a@b.test",
            "password": "secret",
            "refresh_token": "abc.def.ghi",
        });
        let redacted = redact_detail(detail);
        assert_eq!(redacted.get("password"), None);
        assert_eq!(redacted.get("refresh_token"), None);
        assert_eq!(redacted.get("email").unwrap(), "a@b.test");
    }
}
