// [libs/infra/http_client/src/errors.rs]
//! Classification of upstream HTTP provider failures.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("network failure reaching upstream: {0}")]
    Network(#[from] reqwest::Error),

    #[error("upstream responded with decoding failure: {0}")]
    Decoding(#[from] serde_json::Error),

    #[error("upstream rejected request with status {status}: {body}")]
    Protocol { status: u16, body: String },

    #[error("upstream exhausted all retry attempts")]
    RetriesExhausted,

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl UpstreamError {
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::Network(_) | UpstreamError::Timeout(_) => true,
            UpstreamError::Protocol { status, .. } => *status >= 500,
            UpstreamError::Decoding(_) | UpstreamError::RetriesExhausted => false,
        }
    }
}
