//! Fetch error types.

use claimwatch_core::ClaimError;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for setting up lookups and polls.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// Invalid lookup base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid header name or value.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Core error.
    #[error("Core error: {0}")]
    Core(#[from] claimwatch_core::CoreError),

    /// Polling requires a tokio runtime.
    #[error("No tokio runtime available: {0}")]
    NoRuntime(String),
}

// ============================================================================
// HTTP Error
// ============================================================================

/// HTTP-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request error.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Domain not allowed.
    #[error("Domain not allowed: {0}")]
    DomainNotAllowed(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl HttpError {
    /// Maps this error onto the claim lookup taxonomy.
    ///
    /// `timeout` is reported when the underlying request timed out.
    pub fn into_claim_error(self, timeout: Duration) -> ClaimError {
        match self {
            HttpError::Request(e) => classify_reqwest_error(&e, timeout),
            other => ClaimError::Transport(other.to_string()),
        }
    }
}

/// Maps a reqwest error onto the claim lookup taxonomy.
pub fn classify_reqwest_error(err: &reqwest::Error, timeout: Duration) -> ClaimError {
    if err.is_timeout() {
        ClaimError::Timeout(timeout)
    } else if err.is_decode() {
        ClaimError::MalformedBody(err.to_string())
    } else {
        ClaimError::Transport(err.to_string())
    }
}
