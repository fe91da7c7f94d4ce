//! Upstream data API access.
//!
//! Handlers never talk to `reqwest` directly; they go through the
//! [`UpstreamFetcher`] trait so that tests and offline runs can swap in
//! [`StaticFetcher`].

pub mod http;
pub mod static_fetcher;

use async_trait::async_trait;
use serde_json::Value;

pub use http::HttpFetcher;
pub use static_fetcher::StaticFetcher;

/// Result type for upstream fetches
pub type FetchResult<T> = Result<T, FetchError>;

/// Error type for upstream fetches.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The upstream answered with a status outside 2xx.
    #[error("Upstream returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// The request did not complete before the client timeout.
    #[error("Upstream request timed out: {url}")]
    Timeout { url: String },

    /// Connection, TLS or protocol failure.
    #[error("Upstream transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// The body was not valid JSON.
    #[error("Upstream returned an undecodable body for {url}: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    /// HTTP status, when the upstream produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Outbound JSON retrieval.
///
/// Each call is independent: no retries, no caching.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; handlers issue concurrent fetches.
#[async_trait]
pub trait UpstreamFetcher: Send + Sync {
    /// GET `path` (relative to the upstream base URL) and parse the body as JSON.
    async fn fetch_json(&self, path: &str) -> FetchResult<Value>;
}
