//! Claim query: the immutable input to one poll.

use std::time::Duration;

use crate::error::CoreError;

/// Default delay between attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Default attempt budget.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Default upper bound on a single lookup.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_millis(5000);

// ============================================================================
// Claim Query
// ============================================================================

/// What to poll for and how hard to try.
///
/// Built once per checkout session and consumed by exactly one poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimQuery {
    reference_token: String,
    shop_domain: String,
    poll_interval: Duration,
    max_attempts: u32,
    attempt_timeout: Duration,
}

impl ClaimQuery {
    /// Creates a query with default interval, budget and timeout.
    pub fn new(reference_token: impl Into<String>, shop_domain: impl Into<String>) -> Self {
        Self {
            reference_token: reference_token.into(),
            shop_domain: shop_domain.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    /// Returns a builder.
    pub fn builder(
        reference_token: impl Into<String>,
        shop_domain: impl Into<String>,
    ) -> ClaimQueryBuilder {
        ClaimQueryBuilder {
            query: Self::new(reference_token, shop_domain),
        }
    }

    /// Opaque token correlating the checkout with a reward record.
    pub fn reference_token(&self) -> &str {
        &self.reference_token
    }

    /// Shop domain, sent as a request header.
    pub fn shop_domain(&self) -> &str {
        &self.shop_domain
    }

    /// Delay between consecutive attempts.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Total number of lookups allowed.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Upper bound on a single lookup.
    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Checks the query's constraints.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidQuery`] for an empty reference token, a zero
    /// attempt budget, an interval under one millisecond, or a zero timeout.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.reference_token.trim().is_empty() {
            return Err(CoreError::InvalidQuery(
                "reference token must not be empty".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(CoreError::InvalidQuery(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.poll_interval < Duration::from_millis(1) {
            return Err(CoreError::InvalidQuery(
                "poll interval must be at least 1ms".to_string(),
            ));
        }
        if self.attempt_timeout.is_zero() {
            return Err(CoreError::InvalidQuery(
                "attempt timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ClaimQuery`].
#[derive(Debug, Clone)]
pub struct ClaimQueryBuilder {
    query: ClaimQuery,
}

impl ClaimQueryBuilder {
    /// Sets the delay between attempts.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.query.poll_interval = interval;
        self
    }

    /// Sets the delay between attempts in milliseconds.
    pub fn poll_interval_ms(self, ms: u64) -> Self {
        self.poll_interval(Duration::from_millis(ms))
    }

    /// Sets the attempt budget.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.query.max_attempts = attempts;
        self
    }

    /// Sets the per-lookup timeout.
    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.query.attempt_timeout = timeout;
        self
    }

    /// Validates and returns the query.
    ///
    /// # Errors
    ///
    /// See [`ClaimQuery::validate`].
    pub fn build(self) -> Result<ClaimQuery, CoreError> {
        self.query.validate()?;
        Ok(self.query)
    }
}

// ============================================================================
// Tests
// ============================================================================
