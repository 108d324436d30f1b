//! Claim record types.
//!
//! A claim record is the rewards service's view of an earned grant: which
//! token it belongs to, whether the shopper already claimed it, and how much
//! it is worth in minor units.

use serde::{Deserialize, Serialize};

// ============================================================================
// Claim Status
// ============================================================================

/// Whether the shopper has already claimed the reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
    /// Reward earned but not yet claimed.
    #[serde(rename = "notClaim")]
    NotClaim,
    /// Reward already attached to a consumer profile.
    #[serde(rename = "claimed")]
    Claimed,
}

impl ClaimStatus {
    /// Returns the wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotClaim => "notClaim",
            Self::Claimed => "claimed",
        }
    }

    /// Returns true if the reward is still waiting to be claimed.
    pub fn is_claimable(&self) -> bool {
        *self == Self::NotClaim
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ClaimStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notClaim" | "not-claim" | "not_claim" => Ok(Self::NotClaim),
            "claimed" => Ok(Self::Claimed),
            other => Err(format!("unknown claim status: {other}")),
        }
    }
}

// ============================================================================
// Claim Amount
// ============================================================================

/// Reward amount in minor currency units (e.g. cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ClaimAmount {
    /// Amount in minor units.
    pub amount: u64,
}

impl ClaimAmount {
    /// Creates an amount from minor units.
    pub const fn from_minor(amount: u64) -> Self {
        Self { amount }
    }

    /// Returns the amount in minor units.
    pub const fn minor(&self) -> u64 {
        self.amount
    }

    /// Renders the amount in major units, trimming trailing zeros.
    ///
    /// `500` renders as `"5"`, `550` as `"5.5"`, `505` as `"5.05"`.
    pub fn major_display(&self) -> String {
        let whole = self.amount / 100;
        let cents = self.amount % 100;
        match cents {
            0 => whole.to_string(),
            c if c % 10 == 0 => format!("{whole}.{}", c / 10),
            c => format!("{whole}.{c:02}"),
        }
    }
}

impl From<u64> for ClaimAmount {
    fn from(amount: u64) -> Self {
        Self::from_minor(amount)
    }
}

// ============================================================================
// Claim Record
// ============================================================================

/// A reward record returned by the claim-lookup endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRecord {
    /// Token identifying the grant; used to build the claim link.
    pub token: String,
    /// Claim state.
    pub claimed_status: ClaimStatus,
    /// Reward value.
    pub claimed_amount: ClaimAmount,
}

impl ClaimRecord {
    /// Creates a new claim record.
    pub fn new(token: impl Into<String>, claimed_status: ClaimStatus, amount: u64) -> Self {
        Self {
            token: token.into(),
            claimed_status,
            claimed_amount: ClaimAmount::from_minor(amount),
        }
    }

    /// Returns true if the reward has already been claimed.
    pub fn is_claimed(&self) -> bool {
        !self.claimed_status.is_claimable()
    }
}

// ============================================================================
// Tests
// ============================================================================
