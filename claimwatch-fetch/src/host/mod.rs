//! Host APIs for ClaimWatch.
//!
//! - [`http`] - HTTP client with tracing and domain allowlist
//! - [`lookup`] - The claim-lookup endpoint as a [`ClaimTransport`](crate::ClaimTransport)

pub mod http;
pub mod lookup;

pub use http::HttpClient;
pub use lookup::{parse_shop_header, HttpClaimTransport, DEFAULT_LOOKUP_BASE, DEFAULT_SHOP_HEADER};
