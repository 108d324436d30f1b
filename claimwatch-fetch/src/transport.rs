//! Claim lookup transport.
//!
//! The poller never talks to the network directly; it asks a
//! [`ClaimTransport`] for the records currently attached to a reference
//! token. Production code uses
//! [`HttpClaimTransport`](crate::host::lookup::HttpClaimTransport); tests plug
//! in scripted fakes.

use async_trait::async_trait;
use claimwatch_core::{ClaimError, ClaimQuery, ClaimRecord};
use serde::Deserialize;
use std::sync::Arc;

/// Longest slice of an error body kept in [`ClaimError::Status`].
const MAX_ERROR_BODY: usize = 200;

// ============================================================================
// Transport Trait
// ============================================================================

/// One round trip to the claim-lookup endpoint.
#[async_trait]
pub trait ClaimTransport: Send + Sync {
    /// Returns the records currently known for `query`, in server order.
    ///
    /// An empty vector means "not yet"; errors end the poll.
    async fn lookup(&self, query: &ClaimQuery) -> Result<Vec<ClaimRecord>, ClaimError>;
}

#[async_trait]
impl<T: ClaimTransport + ?Sized> ClaimTransport for Arc<T> {
    async fn lookup(&self, query: &ClaimQuery) -> Result<Vec<ClaimRecord>, ClaimError> {
        (**self).lookup(query).await
    }
}

// ============================================================================
// Wire Format
// ============================================================================

/// Success body of the lookup endpoint.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    data: Vec<ClaimRecord>,
}

/// Decodes a lookup response from its status code and raw body.
///
/// # Errors
///
/// Non-2xx statuses become [`ClaimError::Status`]; bodies that are not
/// `{ "data": [...] }` become [`ClaimError::MalformedBody`].
pub fn decode_lookup_body(status: u16, body: &[u8]) -> Result<Vec<ClaimRecord>, ClaimError> {
    if !(200..300).contains(&status) {
        let text = String::from_utf8_lossy(body);
        let body = text.chars().take(MAX_ERROR_BODY).collect();
        return Err(ClaimError::Status { status, body });
    }

    serde_json::from_slice::<LookupResponse>(body)
        .map(|resp| resp.data)
        .map_err(|e| ClaimError::MalformedBody(e.to_string()))
}

// ============================================================================
// Tests
// ============================================================================
