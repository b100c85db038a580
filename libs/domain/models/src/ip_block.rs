// [libs/domain/models/src/ip_block.rs]
//! IP block rule shape and its derived state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpBlockRule {
    pub id: String,
    pub ip_address: String,
    pub reason: String,
    pub blocked_by: String,
    pub blocked_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IpBlockState {
    Blocked,
    Expired,
    Unblocked,
}

impl IpBlockRule {
    /// `Blocked` while enabled and (no expiry or expiry in the future),
    /// `Expired` once an enabled rule's expiry has passed, else `Unblocked`.
    pub fn derived_state(&self, now: chrono::DateTime<chrono::Utc>) -> IpBlockState {
        if !self.enabled {
            return IpBlockState::Unblocked;
        }
        match self.expires_at {
            None => IpBlockState::Blocked,
            Some(expires_at) if expires_at > now => IpBlockState::Blocked,
            Some(_) => IpBlockState::Expired,
        }
    }

    pub fn is_active(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.derived_state(now) == IpBlockState::Blocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn rule(enabled: bool, expires_at: Option<chrono::DateTime<chrono::Utc>>) -> IpBlockRule {
        IpBlockRule {
            id: "r1".into(),
            ip_address: "203.0.113.7".into(),
            reason: "abuse".into(),
            blocked_by: "admin@example.test".into(),
            blocked_at: chrono::Utc::now(),
            expires_at,
            enabled,
        }
    }

    #[test]
    fn permanent_enabled_rule_is_blocked() {
        let now = chrono::Utc::now();
        assert_eq!(rule(true, None).derived_state(now), IpBlockState::Blocked);
    }

    #[test]
    fn expired_rule_is_expired_not_blocked() {
        let now = chrono::Utc::now();
        let rule = rule(true, Some(now - Duration::seconds(1)));
        assert_eq!(rule.derived_state(now), IpBlockState::Expired);
        assert!(!rule.is_active(now));
    }

    #[test]
    fn disabled_rule_is_unblocked_even_before_expiry() {
        let now = chrono::Utc::now();
        let rule = rule(false, Some(now + Duration::seconds(60)));
        assert_eq!(rule.derived_state(now), IpBlockState::Unblocked);
    }
}
