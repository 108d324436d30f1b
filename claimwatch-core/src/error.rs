//! Core error types for `ClaimWatch`.

use std::time::Duration;
use thiserror::Error;

/// Core error type for `ClaimWatch` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A claim query violates its constraints.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Why a single claim lookup failed.
///
/// Every variant is fatal to a poll: the poller reports it as
/// [`PollOutcome::Failed`](crate::PollOutcome::Failed) and stops.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    /// The request never produced a response (connect, DNS, reset).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The lookup did not complete within the per-attempt timeout.
    #[error("Lookup timed out after {0:?}")]
    Timeout(Duration),

    /// The endpoint answered with a non-2xx status.
    #[error("Unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The body was not the expected `{ data: [...] }` shape.
    #[error("Malformed response: {0}")]
    MalformedBody(String),
}

impl ClaimError {
    /// Returns true for network-level failures (including timeouts).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }

    /// Returns true when the endpoint answered but broke the contract.
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::MalformedBody(_))
    }
}
