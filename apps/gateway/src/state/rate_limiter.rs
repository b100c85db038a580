// [apps/gateway/src/state/rate_limiter.rs]
/*!
 * MODULE: IN-PROCESS FIXED-WINDOW RATE COUNTER
 * LAYER: APPLICATION (L4)
 * RESPONSIBILITY: AUTHORITATIVE ADMISSION COUNTING, NOT THE DB MIRROR
 *
 * `client_ip_stats` persists analytics for the dashboard; this map is what
 * the admission pipeline actually consults. A `std::sync::Mutex` is enough
 * here — the pipeline already serializes per-key access one request at a
 * time, so there is no contention to amortize with a lock-free structure.
 */

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use syncd_domain_models::rate_limit::RateLimitRule;

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: DateTime<Utc>,
    count: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct RateLimiter {
    windows: Mutex<HashMap<(String, String), Window>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates and, if admitted, increments the counter for `client_ip`
    /// under `rule` in one atomic step.
    pub fn check_and_increment(&self, client_ip: &str, rule: &RateLimitRule, now: DateTime<Utc>) -> RateLimitDecision {
        let key = (client_ip.to_string(), rule.id.clone());
        let window_length = chrono::Duration::seconds(rule.window_seconds as i64);

        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");
        let window = windows.entry(key).or_insert(Window { started_at: now, count: 0 });

        if now >= window.started_at + window_length {
            window.started_at = now;
            window.count = 0;
        }

        let reset_at = window.started_at + window_length;

        if window.count < rule.limit_count {
            window.count += 1;
            RateLimitDecision {
                allowed: true,
                limit: rule.limit_count,
                remaining: rule.limit_count - window.count,
                reset_at,
            }
        } else {
            RateLimitDecision { allowed: false, limit: rule.limit_count, remaining: 0, reset_at }
        }
    }

    /// Purges every live counter for a rule, e.g. after the rule is deleted
    /// or its limits are edited, so the next request starts a fresh window.
    pub fn purge_rule(&self, rule_id: &str) {
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");
        windows.retain(|(_, bound_rule_id), _| bound_rule_id != rule_id);
    }

    /// Drops every counter. Called by `POST /cache/clear`.
    pub fn clear_all(&self) {
        self.windows.lock().expect("rate limiter mutex poisoned").clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(limit: u32, window_seconds: u32) -> RateLimitRule {
        RateLimitRule {
            id: "rule-1".into(),
            endpoint_pattern: "/api/v1/sync/*".into(),
            method: syncd_domain_models::rate_limit::HttpMethodPattern::All,
            limit_count: limit,
            window_seconds,
            enabled: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn admits_up_to_limit_then_rejects() {
        let limiter = RateLimiter::new();
        let rule = rule(3, 60);
        let now = Utc::now();

        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check_and_increment("203.0.113.5", &rule, now);
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let decision = limiter.check_and_increment("203.0.113.5", &rule, now);
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
    }

    #[test]
    fn window_resets_after_expiry() {
        let limiter = RateLimiter::new();
        let rule = rule(1, 60);
        let now = Utc::now();

        assert!(limiter.check_and_increment("203.0.113.5", &rule, now).allowed);
        assert!(!limiter.check_and_increment("203.0.113.5", &rule, now).allowed);

        let later = now + chrono::Duration::seconds(61);
        assert!(limiter.check_and_increment("203.0.113.5", &rule, later).allowed);
    }

    #[test]
    fn distinct_clients_get_independent_windows() {
        let limiter = RateLimiter::new();
        let rule = rule(1, 60);
        let now = Utc::now();

        assert!(limiter.check_and_increment("203.0.113.5", &rule, now).allowed);
        assert!(limiter.check_and_increment("203.0.113.9", &rule, now).allowed);
    }

    #[test]
    fn purge_rule_drops_only_that_rules_counters() {
        let limiter = RateLimiter::new();
        let rule_a = rule(1, 60);
        let mut rule_b = rule(1, 60);
        rule_b.id = "rule-2".into();
        let now = Utc::now();

        limiter.check_and_increment("203.0.113.5", &rule_a, now);
        limiter.check_and_increment("203.0.113.5", &rule_b, now);

        limiter.purge_rule(&rule_a.id);

        assert!(limiter.check_and_increment("203.0.113.5", &rule_a, now).allowed);
        assert!(!limiter.check_and_increment("203.0.113.5", &rule_b, now).allowed);
    }
}
