//! Collaborators around the normalization core: storage, image proxying,
//! stream extraction and metadata enrichment. Each is a narrow trait with one
//! concrete implementation.

mod extractor;
mod image;
mod store;
mod tmdb;

pub use extractor::{format_selector, StreamInfo, YtDlpExtractor};
pub use image::{HttpImageProxy, ImageBytes};
pub use store::MemoryStore;
pub use tmdb::{CastMember, Enrichment, TmdbClient, DEFAULT_TMDB_BASE};

use crate::model::CanonicalMovie;
use crate::scraper::ScraperError;
use thiserror::Error;

/// Errors from collaborators.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Could not run {program}: {source}. Is it installed and on PATH?")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} timed out after {secs}s")]
    Timeout { program: String, secs: u64 },

    #[error("{program} failed: {message}")]
    ToolFailed { program: String, message: String },

    #[error("Could not decode {what}: {source}")]
    Decode {
        what: String,
        source: serde_json::Error,
    },

    #[error("Image URL must be absolute: {url}")]
    RelativeUrl { url: String },

    #[error("TMDB API key is not configured (set tmdb_api_key or TMDB_API_KEY).")]
    MissingApiKey,

    #[error(transparent)]
    Upstream(#[from] ScraperError),
}

/// Storage for canonical movies. Lookup by id or by the source URL it came from.
pub trait MovieStore {
    fn put(&self, movie: CanonicalMovie, source_url: Option<&str>);
    fn get(&self, id: &str) -> Option<CanonicalMovie>;
    fn get_by_source_url(&self, url: &str) -> Option<CanonicalMovie>;
}

/// Fetches (and possibly resizes) images. Accepts absolute URLs only.
pub trait ImageProxy {
    fn fetch(&self, url: &str, width: u32) -> Result<ImageBytes, ServiceError>;
}

/// Resolves a playable episode URL into a direct stream.
pub trait StreamExtractor {
    fn extract(&self, url: &str, quality: Option<&str>) -> Result<StreamInfo, ServiceError>;
}

/// Looks up synopsis, cast and ratings for a title.
pub trait MetadataEnricher {
    fn enrich(&self, title: &str, year: Option<u32>) -> Result<Option<Enrichment>, ServiceError>;
}
