//! Configuration management.
//!
//! The configuration file is JSON and every section is optional; missing
//! fields take their defaults.

use claimwatch_core::{
    ClaimLinks, ClaimQuery, ClaimQueryBuilder, DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_CONSUMER_BASE,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL,
};
use claimwatch_fetch::{parse_shop_header, DEFAULT_LOOKUP_BASE, DEFAULT_SHOP_HEADER};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::error::StoreError;

/// Log levels accepted in `general.log_level`.
const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Lookup endpoint settings.
    #[serde(default)]
    pub lookup: LookupConfig,
    /// Poll cadence and budget.
    #[serde(default)]
    pub poll: PollConfig,
    /// Shopper-facing link settings.
    #[serde(default)]
    pub links: LinksConfig,
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
}

/// Claim-lookup endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Base URL; the reference token is appended as a path segment.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Header carrying the shop domain.
    #[serde(default = "default_shop_header")]
    pub shop_header: String,
    /// Per-lookup timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Poll cadence and budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Delay between attempts in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Total lookups allowed.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// Shopper-facing link settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinksConfig {
    /// Origin of the consumer site.
    #[serde(default = "default_consumer_base")]
    pub consumer_base: String,
}

/// General application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_base_url() -> String {
    DEFAULT_LOOKUP_BASE.to_string()
}

fn default_shop_header() -> String {
    DEFAULT_SHOP_HEADER.to_string()
}

fn default_timeout_ms() -> u64 {
    duration_ms(DEFAULT_ATTEMPT_TIMEOUT)
}

fn default_interval_ms() -> u64 {
    duration_ms(DEFAULT_POLL_INTERVAL)
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_consumer_base() -> String {
    DEFAULT_CONSUMER_BASE.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            shop_header: default_shop_header(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            consumer_base: default_consumer_base(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl LookupConfig {
    /// Per-lookup timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl PollConfig {
    /// Delay between attempts.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl LinksConfig {
    /// Builds the link deriver.
    ///
    /// # Errors
    ///
    /// Fails if `consumer_base` is not a usable URL.
    pub fn claim_links(&self) -> Result<ClaimLinks, StoreError> {
        ClaimLinks::new(&self.consumer_base).map_err(|e| StoreError::Config(e.to_string()))
    }
}

impl Config {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("claimwatch")
            .join("config.json")
    }

    /// Loads configuration from the default path.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read, parsed, or validated.
    pub fn load() -> Result<Self, StoreError> {
        Self::load_from(&Self::default_path())
    }

    /// Loads configuration from a specific path.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read, parsed, or validated.
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to the default path.
    ///
    /// # Errors
    ///
    /// Fails if the directory or file cannot be written.
    pub fn save(&self) -> Result<(), StoreError> {
        self.save_to(&Self::default_path())
    }

    /// Saves configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Fails if the directory or file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<(), StoreError> {
        let base = Url::parse(&self.lookup.base_url)
            .map_err(|e| StoreError::Config(format!("lookup.base_url: {e}")))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(StoreError::Config(format!(
                "lookup.base_url: unsupported scheme {}",
                base.scheme()
            )));
        }
        if self.lookup.shop_header.trim().is_empty() {
            return Err(StoreError::Config("lookup.shop_header is empty".to_string()));
        }
        parse_shop_header(&self.lookup.shop_header)
            .map_err(|e| StoreError::Config(format!("lookup.shop_header: {e}")))?;
        if self.lookup.timeout_ms == 0 {
            return Err(StoreError::Config("lookup.timeout_ms must be positive".to_string()));
        }
        if self.poll.interval_ms == 0 {
            return Err(StoreError::Config("poll.interval_ms must be positive".to_string()));
        }
        if self.poll.max_attempts == 0 {
            return Err(StoreError::Config("poll.max_attempts must be positive".to_string()));
        }
        self.links.claim_links()?;
        if !LOG_LEVELS.contains(&self.general.log_level.to_lowercase().as_str()) {
            return Err(StoreError::Config(format!(
                "general.log_level: unknown level {}",
                self.general.log_level
            )));
        }
        Ok(())
    }

    /// Starts a query builder seeded with this configuration's cadence.
    pub fn query_builder(
        &self,
        reference_token: impl Into<String>,
        shop_domain: impl Into<String>,
    ) -> ClaimQueryBuilder {
        ClaimQuery::builder(reference_token, shop_domain)
            .poll_interval(self.poll.interval())
            .max_attempts(self.poll.max_attempts)
            .attempt_timeout(self.lookup.timeout())
    }
}

// ============================================================================
// Tests
// ============================================================================
