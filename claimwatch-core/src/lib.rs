// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `ClaimWatch` Core
//!
//! Core types for the `ClaimWatch` claim poller.
//!
//! This crate provides the foundational abstractions used across all other
//! `ClaimWatch` crates:
//!
//! - Domain models (claim records, queries, poll states)
//! - Error types
//! - Claim-link derivation
//!
//! ## Key Types
//!
//! ### Claims
//! - [`ClaimRecord`] - A reward record returned by the lookup endpoint
//! - [`ClaimStatus`] - Whether the reward was claimed
//! - [`ClaimAmount`] - Reward value in minor units
//!
//! ### Polling
//! - [`ClaimQuery`] - What to poll for and how hard to try
//! - [`PollState`] - What an observer is told
//! - [`PollOutcome`] - How a poll ended
//!
//! ### Links
//! - [`ClaimLinks`] - Claim / profile URL derivation

pub mod error;
pub mod links;
pub mod models;

// Re-export error types
pub use error::{ClaimError, CoreError};

// Re-export links
pub use links::{ClaimLinks, DEFAULT_CONSUMER_BASE};

// Re-export all model types
pub use models::{
    // Claims
    ClaimAmount,
    ClaimRecord,
    ClaimStatus,
    // Query
    ClaimQuery,
    ClaimQueryBuilder,
    DEFAULT_ATTEMPT_TIMEOUT,
    DEFAULT_MAX_ATTEMPTS,
    DEFAULT_POLL_INTERVAL,
    // Poll
    PollOutcome,
    PollState,
};
