//! Domain models for ClaimWatch.
//!
//! ## Submodules
//!
//! - [`claim`] - Claim records as returned by the rewards service
//! - [`query`] - The immutable input to one poll
//! - [`poll`] - Observer states and terminal outcomes

mod claim;
mod poll;
mod query;

pub use claim::{ClaimAmount, ClaimRecord, ClaimStatus};
pub use poll::{PollOutcome, PollState};
pub use query::{
    ClaimQuery, ClaimQueryBuilder, DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_POLL_INTERVAL,
};
