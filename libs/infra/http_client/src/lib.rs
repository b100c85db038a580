// [libs/infra/http_client/src/lib.rs]
//! Outbound HTTP adapter shared by every sync module.

pub mod client;
pub mod errors;

pub use client::{RetryPolicy, Timeouts, UpstreamClient, USER_AGENT};
pub use errors::UpstreamError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_retry_policy_retries_server_errors_only() {
        let policy = RetryPolicy::standard();
        assert!((policy.retry_on_status)(reqwest::StatusCode::BAD_GATEWAY));
        assert!(!(policy.retry_on_status)(reqwest::StatusCode::NOT_FOUND));
        assert_eq!(policy.max_attempts, 3);
    }

    #[test]
    fn none_retry_policy_never_retries() {
        let policy = RetryPolicy::none();
        assert_eq!(policy.max_attempts, 1);
        assert!(!(policy.retry_on_status)(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
    }
}
