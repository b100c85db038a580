// [libs/infra/http_client/src/client.rs]
/*!
 * MODULE: UPSTREAM HTTP CLIENT
 * LAYER: INFRASTRUCTURE ADAPTER (L3)
 * RESPONSIBILITY: AUTHENTICATED, RETRYING, TIMEOUT-BOUNDED OUTBOUND CALLS
 *
 * One client instance is shared across every sync module; callers pick a
 * timeout preset and retry policy per call rather than building their own
 * reqwest client.
 */

use crate::errors::UpstreamError;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{instrument, warn};

pub const USER_AGENT: &str = "DeenSync-Core/1.0";

#[derive(Debug, Clone, Copy)]
pub struct Timeouts;

impl Timeouts {
    pub const DEFAULT: Duration = Duration::from_secs(15);
    pub const SYNC: Duration = Duration::from_secs(300);
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_ms: u64,
    pub retry_on_status: fn(StatusCode) -> bool,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self { max_attempts: 1, backoff_ms: 0, retry_on_status: |_| false }
    }

    /// 3 attempts, exponential backoff starting at `backoff_ms`, retrying
    /// network failures and any `5xx` response.
    pub fn standard() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 250,
            retry_on_status: |status| status.is_server_error(),
        }
    }
}

pub struct UpstreamClient {
    http: Client,
}

impl UpstreamClient {
    pub fn new() -> Self {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Timeouts::DEFAULT)
            .build()
            .expect("reqwest client configuration is static and valid");
        Self { http }
    }

    #[instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        timeout: Duration,
        retry: &RetryPolicy,
    ) -> Result<T, UpstreamError> {
        self.execute_with_retry(Method::GET, url, None::<&()>, timeout, retry).await
    }

    #[instrument(skip(self, body))]
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        timeout: Duration,
        retry: &RetryPolicy,
    ) -> Result<T, UpstreamError> {
        self.execute_with_retry(Method::POST, url, Some(body), timeout, retry).await
    }

    async fn execute_with_retry<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        timeout: Duration,
        retry: &RetryPolicy,
    ) -> Result<T, UpstreamError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut request = self.http.request(method.clone(), url).timeout(timeout);
            request = request.header(reqwest::header::CONTENT_TYPE, "application/json");
            if let Some(body) = body {
                request = request.json(body);
            }

            let outcome = request.send().await;
            match outcome {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body_text = response.text().await.map_err(UpstreamError::Network)?;
                        return serde_json::from_str(&body_text)
                            .map_err(|_| UpstreamError::Protocol { status: status.as_u16(), body: body_text });
                    }
                    let body_text = response.text().await.unwrap_or_default();
                    let error = UpstreamError::Protocol { status: status.as_u16(), body: body_text };
                    if attempt < retry.max_attempts && (retry.retry_on_status)(status) {
                        warn!(url, attempt, status = status.as_u16(), "upstream call failed, retrying");
                        tokio::time::sleep(backoff_duration(retry.backoff_ms, attempt)).await;
                        continue;
                    }
                    return Err(error);
                }
                Err(network_error) => {
                    let timed_out = network_error.is_timeout();
                    if attempt < retry.max_attempts {
                        warn!(url, attempt, "upstream call failed, retrying");
                        tokio::time::sleep(backoff_duration(retry.backoff_ms, attempt)).await;
                        continue;
                    }
                    return Err(if timed_out {
                        UpstreamError::Timeout(timeout)
                    } else {
                        UpstreamError::Network(network_error)
                    });
                }
            }
        }
    }
}

impl Default for UpstreamClient {
    fn default() -> Self {
        Self::new()
    }
}

fn backoff_duration(base_ms: u64, attempt: u32) -> Duration {
    Duration::from_millis(base_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1))))
}
