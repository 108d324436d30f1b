// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # ClaimWatch Fetch
//!
//! Claim lookup and bounded polling for the ClaimWatch application.
//!
//! ## Host APIs
//!
//! - [`host::http`] - HTTP client with tracing and domain allowlist
//! - [`host::lookup`] - The rewards claim-lookup endpoint
//!
//! ## Polling
//!
//! - [`transport::ClaimTransport`] - One lookup round trip (injectable)
//! - [`poller::ClaimPoller`] - Starts bounded polls
//! - [`poller::PollHandle`] - Waits on or cancels a running poll
//!
//! ## Example
//!
//! ```ignore
//! use claimwatch_core::ClaimQuery;
//! use claimwatch_fetch::{ClaimPoller, HttpClaimTransport, DEFAULT_LOOKUP_BASE};
//!
//! let poller = ClaimPoller::new(HttpClaimTransport::new(DEFAULT_LOOKUP_BASE)?);
//! let query = ClaimQuery::new(reference_token, shop_domain);
//! let mut handle = poller.start(query, |state: &PollState| tracing::info!(?state))?;
//! let outcome = handle.wait().await;
//! ```

pub mod error;
pub mod host;
pub mod poller;
pub mod transport;

// Errors
pub use error::{classify_reqwest_error, FetchError, HttpError};

// Host APIs
pub use host::{
    parse_shop_header, HttpClaimTransport, HttpClient, DEFAULT_LOOKUP_BASE, DEFAULT_SHOP_HEADER,
};

// Polling
pub use poller::{CancelToken, ClaimPoller, PollHandle, PollObserver};
pub use transport::{decode_lookup_body, ClaimTransport};
