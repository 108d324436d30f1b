//! HTTP claim lookup.
//!
//! Queries `GET <lookup-base>/<reference-token>` with the shop domain in a
//! request header and caching disabled.

use async_trait::async_trait;
use claimwatch_core::{ClaimError, ClaimQuery, ClaimRecord};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CACHE_CONTROL};
use tracing::{debug, instrument, warn};
use url::Url;

use super::http::HttpClient;
use crate::error::{classify_reqwest_error, FetchError};
use crate::transport::{decode_lookup_body, ClaimTransport};

/// Default lookup endpoint base.
pub const DEFAULT_LOOKUP_BASE: &str = "https://dev-api.divit.dev/miles/shopify/tokens";

/// Default header carrying the shop domain.
pub const DEFAULT_SHOP_HEADER: &str = "x-shop-domain";

/// Parses a configured shop-domain header name.
///
/// # Errors
///
/// Fails if `name` is not a valid HTTP header name.
pub fn parse_shop_header(name: &str) -> Result<HeaderName, FetchError> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| FetchError::InvalidHeader(format!("{name}: {e}")))
}

// ============================================================================
// HTTP Claim Transport
// ============================================================================

/// [`ClaimTransport`] backed by the rewards REST API.
#[derive(Debug, Clone)]
pub struct HttpClaimTransport {
    client: HttpClient,
    base: Url,
    shop_header: HeaderName,
}

impl HttpClaimTransport {
    /// Creates a transport for `base_url` with a default client.
    ///
    /// # Errors
    ///
    /// Fails if the URL is not an absolute http(s) URL or the client cannot
    /// be built.
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        Self::with_client(HttpClient::new()?, base_url)
    }

    /// Creates a transport with a custom client.
    ///
    /// Requests are pinned to the base URL's host.
    ///
    /// # Errors
    ///
    /// Fails if the URL is not an absolute http(s) URL.
    pub fn with_client(client: HttpClient, base_url: &str) -> Result<Self, FetchError> {
        let base = Url::parse(base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{base_url}: {e}")))?;

        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(format!(
                "{base_url}: expected an http(s) URL"
            )));
        }
        let host = base
            .host_str()
            .ok_or_else(|| FetchError::InvalidUrl(format!("{base_url}: no host")))?
            .to_string();

        Ok(Self {
            client: client.with_allowed_domains(vec![host]),
            base,
            shop_header: HeaderName::from_static(DEFAULT_SHOP_HEADER),
        })
    }

    /// Overrides the header that carries the shop domain.
    ///
    /// # Errors
    ///
    /// Fails if `name` is not a valid header name.
    pub fn with_shop_header(mut self, name: &str) -> Result<Self, FetchError> {
        self.shop_header = parse_shop_header(name)?;
        Ok(self)
    }

    /// Returns the header that carries the shop domain.
    pub fn shop_header(&self) -> &HeaderName {
        &self.shop_header
    }

    /// Returns the lookup URL for a reference token.
    ///
    /// The token is percent-encoded as a single path segment.
    pub fn lookup_url(&self, reference_token: &str) -> Url {
        let mut url = self.base.clone();
        // cannot_be_a_base was rejected at construction
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push(reference_token);
        }
        url
    }

    fn build_headers(&self, query: &ClaimQuery) -> Result<HeaderMap, ClaimError> {
        let shop = HeaderValue::from_str(query.shop_domain())
            .map_err(|e| ClaimError::Transport(format!("invalid shop domain header: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(self.shop_header.clone(), shop);
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl ClaimTransport for HttpClaimTransport {
    #[instrument(skip(self, query), fields(shop = %query.shop_domain()))]
    async fn lookup(&self, query: &ClaimQuery) -> Result<Vec<ClaimRecord>, ClaimError> {
        let url = self.lookup_url(query.reference_token());
        let headers = self.build_headers(query)?;
        let timeout = self.client.timeout();

        let response = self
            .client
            .get_with_headers(url.as_str(), headers)
            .await
            .map_err(|e| {
                warn!(error = %e, "Claim lookup request failed");
                e.into_claim_error(timeout)
            })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| classify_reqwest_error(&e, timeout))?;

        let records = decode_lookup_body(status, &body)?;
        debug!(status, records = records.len(), "Claim lookup decoded");
        Ok(records)
    }
}

// ============================================================================
// Tests
// ============================================================================
