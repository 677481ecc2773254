//! Shared error type for source adapters.

use thiserror::Error;

/// Failure of an adapter call. Shape ambiguity (missing fields, odd labels,
/// absent selectors) never lands here; it is resolved by the fallback chains.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Invalid URL: {input}: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("Failed to create HTTP client: {source}")]
    ClientBuild { source: reqwest::Error },

    // Transport
    #[error("Network error: could not reach {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("Failed to read response body from {url}: {source}")]
    BodyRead { url: String, source: reqwest::Error },

    // Upstream status
    #[error("HTTP {status} when fetching: {url}")]
    HttpStatus {
        status: u16,
        url: String,
        /// Optional context (e.g. "detail page", "search") for programmatic use.
        context: Option<String>,
    },

    // Payload
    #[error("Malformed JSON from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("No item with slug '{slug}' in upstream response.")]
    NotFound { slug: String },

    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

impl ScraperError {
    /// True for failures of the transport itself (connect, timeout, body read).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ScraperError::Network { .. } | ScraperError::BodyRead { .. }
        )
    }

    /// HTTP status code for upstream status failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ScraperError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
