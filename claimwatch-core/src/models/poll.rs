//! Poll states and outcomes.
//!
//! - [`PollState`] - Everything an observer can be told
//! - [`PollOutcome`] - The terminal subset of those states

use crate::error::ClaimError;
use crate::models::ClaimRecord;

// ============================================================================
// Poll Outcome
// ============================================================================

/// How a poll ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// A record appeared; the first one returned wins.
    Found(ClaimRecord),
    /// The attempt budget ran out without a record. Not an error.
    Exhausted {
        /// Attempts made.
        attempts: u32,
    },
    /// The caller cancelled before a terminal state.
    Cancelled,
    /// A lookup failed; the poll was not retried.
    Failed(ClaimError),
}

impl PollOutcome {
    /// Short lowercase label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Found(_) => "found",
            Self::Exhausted { .. } => "exhausted",
            Self::Cancelled => "cancelled",
            Self::Failed(_) => "failed",
        }
    }

    /// Returns the record if one was found.
    pub fn record(&self) -> Option<&ClaimRecord> {
        match self {
            Self::Found(record) => Some(record),
            _ => None,
        }
    }

    /// Returns the error if the poll failed.
    pub fn error(&self) -> Option<&ClaimError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for PollOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Found(record) => write!(
                f,
                "found {} ({}, {})",
                record.token,
                record.claimed_status,
                record.claimed_amount.minor()
            ),
            Self::Exhausted { attempts } => write!(f, "exhausted after {attempts} attempts"),
            Self::Cancelled => f.write_str("cancelled"),
            Self::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

// ============================================================================
// Poll State
// ============================================================================

/// A state transition reported to a poll observer.
///
/// Observers see one `Loading` per attempt issued, then exactly one terminal
/// state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    /// An attempt is about to be issued (zero-based).
    Loading {
        /// Attempt index.
        attempt: u32,
    },
    /// See [`PollOutcome::Found`].
    Found(ClaimRecord),
    /// See [`PollOutcome::Exhausted`].
    Exhausted {
        /// Attempts made.
        attempts: u32,
    },
    /// See [`PollOutcome::Cancelled`].
    Cancelled,
    /// See [`PollOutcome::Failed`].
    Failed(ClaimError),
}

impl PollState {
    /// Returns true for every state except `Loading`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Loading { .. })
    }

    /// Converts a terminal state into its outcome.
    pub fn into_outcome(self) -> Option<PollOutcome> {
        match self {
            Self::Loading { .. } => None,
            Self::Found(record) => Some(PollOutcome::Found(record)),
            Self::Exhausted { attempts } => Some(PollOutcome::Exhausted { attempts }),
            Self::Cancelled => Some(PollOutcome::Cancelled),
            Self::Failed(err) => Some(PollOutcome::Failed(err)),
        }
    }

    /// Short lowercase label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Loading { .. } => "loading",
            Self::Found(_) => "found",
            Self::Exhausted { .. } => "exhausted",
            Self::Cancelled => "cancelled",
            Self::Failed(_) => "failed",
        }
    }
}

impl From<PollOutcome> for PollState {
    fn from(outcome: PollOutcome) -> Self {
        match outcome {
            PollOutcome::Found(record) => Self::Found(record),
            PollOutcome::Exhausted { attempts } => Self::Exhausted { attempts },
            PollOutcome::Cancelled => Self::Cancelled,
            PollOutcome::Failed(err) => Self::Failed(err),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
