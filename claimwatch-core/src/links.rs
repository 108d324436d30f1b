//! Claim-link derivation.
//!
//! Once a record is found the shopper is sent to the consumer site: to the
//! claim page for an unclaimed reward, or to their miles profile otherwise.

use url::Url;

use crate::error::CoreError;
use crate::models::{ClaimRecord, ClaimStatus};

/// Default consumer site origin.
pub const DEFAULT_CONSUMER_BASE: &str = "https://dev-consumer.divit.dev";

/// Builds shopper-facing links for claim records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimLinks {
    consumer_base: Url,
}

impl ClaimLinks {
    /// Creates links rooted at `consumer_base`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if the base is not an absolute
    /// hierarchical URL.
    pub fn new(consumer_base: &str) -> Result<Self, CoreError> {
        let url = Url::parse(consumer_base)
            .map_err(|e| CoreError::InvalidConfig(format!("consumer base {consumer_base}: {e}")))?;
        if url.cannot_be_a_base() {
            return Err(CoreError::InvalidConfig(format!(
                "consumer base {consumer_base} cannot carry a path"
            )));
        }
        Ok(Self { consumer_base: url })
    }

    /// Returns the consumer site origin.
    pub fn consumer_base(&self) -> &Url {
        &self.consumer_base
    }

    /// Returns where the shopper should go for `record`.
    ///
    /// Unclaimed rewards link to `/miles/claim/<token>`; claimed ones link to
    /// `/profile/miles` regardless of token.
    pub fn url_for(&self, record: &ClaimRecord) -> Url {
        match record.claimed_status {
            ClaimStatus::NotClaim => self.with_segments(&["miles", "claim", &record.token]),
            ClaimStatus::Claimed => self.with_segments(&["profile", "miles"]),
        }
    }

    /// Returns the link label shown next to the amount.
    pub fn call_to_action(record: &ClaimRecord) -> &'static str {
        match record.claimed_status {
            ClaimStatus::NotClaim => "Click here to claim your divit miles",
            ClaimStatus::Claimed => "Click here to view your divit miles",
        }
    }

    fn with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.consumer_base.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

impl Default for ClaimLinks {
    fn default() -> Self {
        Self {
            consumer_base: Url::parse(DEFAULT_CONSUMER_BASE)
                .unwrap_or_else(|e| panic!("default consumer base is invalid: {e}")),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unclaimed_links_to_claim_page() {
        let links = ClaimLinks::default();
        let record = ClaimRecord::new("T", ClaimStatus::NotClaim, 100);

        assert_eq!(
            links.url_for(&record).as_str(),
            "https://dev-consumer.divit.dev/miles/claim/T"
        );
        assert_eq!(ClaimLinks::call_to_action(&record), "Click here to claim your divit miles");
    }

    #[test]
    fn test_claimed_links_to_profile_regardless_of_token() {
        let links = ClaimLinks::default();
        let a = ClaimRecord::new("one", ClaimStatus::Claimed, 100);
        let b = ClaimRecord::new("two", ClaimStatus::Claimed, 900);

        assert_eq!(
            links.url_for(&a).as_str(),
            "https://dev-consumer.divit.dev/profile/miles"
        );
        assert_eq!(links.url_for(&a), links.url_for(&b));
        assert_eq!(ClaimLinks::call_to_action(&a), "Click here to view your divit miles");
    }

    #[test]
    fn test_base_with_path_and_trailing_slash() {
        let links = ClaimLinks::new("https://example.com/rewards/").unwrap();
        let record = ClaimRecord::new("abc", ClaimStatus::NotClaim, 1);

        assert_eq!(
            links.url_for(&record).as_str(),
            "https://example.com/rewards/miles/claim/abc"
        );
    }

    #[test]
    fn test_token_is_percent_encoded() {
        let links = ClaimLinks::new("https://example.com").unwrap();
        let record = ClaimRecord::new("a/b c", ClaimStatus::NotClaim, 1);

        assert_eq!(
            links.url_for(&record).as_str(),
            "https://example.com/miles/claim/a%2Fb%20c"
        );
    }

    #[test]
    fn test_rejects_invalid_base() {
        assert!(ClaimLinks::new("not a url").is_err());
        assert!(ClaimLinks::new("mailto:rewards@example.com").is_err());
    }
}
