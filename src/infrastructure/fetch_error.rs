//! Error types for outbound HTTP calls
//!
//! Every upstream failure (network, timeout, non-success status, undecodable
//! body) is classified into a [`FetchError`]. Call sites treat any of them as
//! "no result" for the item at hand; none of them abort a refresh cycle.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request timed out after {timeout_seconds}s: {url}")]
    Timeout { url: String, timeout_seconds: u64 },

    #[error("HTTP request failed: {url} - {message}")]
    Transport { url: String, message: String },

    #[error("HTTP error {status}: {url}")]
    Status { status: u16, url: String },

    #[error("Response decoding failed: {url} - {message}")]
    Decode { url: String, message: String },

    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },
}

pub type FetchResult<T> = Result<T, FetchError>;

impl FetchError {
    /// Classify a reqwest error raised while sending or reading a response
    pub fn from_reqwest(url: &str, error: &reqwest::Error, timeout_seconds: u64) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
                timeout_seconds,
            }
        } else if error.is_decode() {
            Self::Decode {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else if let Some(status) = error.status() {
            Self::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }

    pub fn invalid_url(url: &str, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    /// Upstream asked us to slow down
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Status { status: 429, .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
