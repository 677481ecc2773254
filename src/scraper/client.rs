//! Blocking HTTP client shared by the adapters, and the [`Fetch`] seam they are generic over.

use crate::scraper::ScraperError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, REFERER};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,application/json,image/webp,*/*;q=0.8";
const DEFAULT_ACCEPT_LANGUAGE: &str = "vi-VN,vi;q=0.9,en-US;q=0.8,en;q=0.7";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_AUX_TIMEOUT_SECS: u64 = 10;
const MAX_REDIRECTS: usize = 10;

/// One-shot GET access to upstream documents.
///
/// Implementations make exactly one request per call and never retry.
pub trait Fetch {
    /// GET `url` and return the body as text. `context` labels the request in errors.
    fn get_text(&self, url: &str, context: &str) -> Result<String, ScraperError>;

    /// GET `url` and return the raw body with its Content-Type (empty if absent).
    fn get_bytes(&self, url: &str, context: &str) -> Result<(Vec<u8>, String), ScraperError>;
}

/// Immutable blocking client. Cloning shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::blocking::Client,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    fn send(&self, url: &str) -> Result<reqwest::blocking::Response, ScraperError> {
        debug!(url, "GET");
        self.inner.get(url).send().map_err(|e| {
            if e.is_timeout() {
                warn!(url, "request timed out");
            }
            ScraperError::Network {
                url: url.to_string(),
                source: e,
            }
        })
    }
}

/// Fail on non-2xx status, otherwise hand the response back.
fn check_response(
    response: reqwest::blocking::Response,
    url: &str,
    context: &str,
) -> Result<reqwest::blocking::Response, ScraperError> {
    let status = response.status();
    if !status.is_success() {
        warn!(url, status = status.as_u16(), context, "upstream returned error status");
        return Err(ScraperError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
            context: Some(context.to_string()),
        });
    }
    Ok(response)
}

impl Fetch for HttpClient {
    fn get_text(&self, url: &str, context: &str) -> Result<String, ScraperError> {
        let response = check_response(self.send(url)?, url, context)?;
        let body = response.text().map_err(|e| ScraperError::BodyRead {
            url: url.to_string(),
            source: e,
        })?;
        debug!(url, bytes = body.len(), "fetched");
        Ok(body)
    }

    fn get_bytes(&self, url: &str, context: &str) -> Result<(Vec<u8>, String), ScraperError> {
        let response = check_response(self.send(url)?, url, context)?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = response.bytes().map_err(|e| ScraperError::BodyRead {
            url: url.to_string(),
            source: e,
        })?;
        Ok((bytes.to_vec(), content_type))
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    user_agent: Option<String>,
    referer: Option<String>,
    timeout_secs: u64,
    accept_invalid_certs: bool,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            user_agent: None,
            referer: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            accept_invalid_certs: false,
        }
    }
}

impl HttpClientBuilder {
    /// Set a custom User-Agent. If not set, a browser-like default is used.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Send this Referer with every request (some sites reject requests without one).
    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    /// Set request timeout in seconds. Default 30.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Skip TLS certificate verification. Off by default.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn build(self) -> Result<HttpClient, ScraperError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE),
        );
        if let Some(referer) = &self.referer {
            let value = HeaderValue::from_str(referer).map_err(|e| ScraperError::InvalidUrl {
                input: referer.clone(),
                reason: e.to_string(),
            })?;
            headers.insert(REFERER, value);
        }
        if self.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for this client");
        }
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let inner = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(Duration::from_secs(self.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
            .map_err(|e| ScraperError::ClientBuild { source: e })?;
        Ok(HttpClient { inner })
    }
}
