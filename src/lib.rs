//! reelscrape: normalized movie and episode metadata from heterogeneous streaming sources.

pub mod cli;
pub mod config;
pub mod model;
pub mod scraper;
pub mod services;

// Re-exports for CLI and consumers.
pub use model::{CanonicalMovie, Category, Episode};
pub use scraper::{
    build_adapter, CategoryKind, Fetch, HttpClient, HttpClientBuilder, ScraperError,
    SourceAdapter, SourceKind, SourceSettings,
};
pub use services::{
    ImageProxy, MemoryStore, MetadataEnricher, MovieStore, ServiceError, StreamExtractor,
};
