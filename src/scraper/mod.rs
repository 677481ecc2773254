//! Source adapters and the normalization primitives they share.
//!
//! An adapter talks to one upstream family (structured JSON API or rendered
//! HTML site) and returns [`CanonicalMovie`](crate::model::CanonicalMovie)
//! values. Shape ambiguity is resolved in [`shape`], [`normalize`] and the
//! strategy chains of [`chain`]; only transport, status and decode failures
//! come back as errors.

pub mod chain;
mod client;
mod error;
pub mod normalize;
pub mod ophim;
pub mod phimmoi;
pub mod shape;

pub use client::{
    Fetch, HttpClient, HttpClientBuilder, DEFAULT_AUX_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS,
};
pub use error::ScraperError;

#[cfg(test)]
pub(crate) use client::stub;

use crate::model::{CanonicalMovie, Category};

pub const DEFAULT_API_BASE: &str = "https://ophim1.com";
pub const DEFAULT_IMAGE_PREFIX: &str = "https://img.ophim1.com/uploads/movies/";
pub const DEFAULT_SITE_BASE: &str = "https://phimmoichill.network";
pub const DEFAULT_GRID_LIMIT: usize = 24;

/// Category tokens that name a curated list rather than a genre.
pub const LIST_CATEGORIES: [&str; 6] = [
    "phim-le",
    "phim-bo",
    "hoat-hinh",
    "tv-shows",
    "phim-sap-chieu",
    "phim-dang-chieu",
];

/// Where a category token is routed. Pure function of the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRoute {
    /// Home feed (empty token or "home").
    Home,
    /// Curated list under `danh-sach/`.
    List(String),
    /// Anything else is treated as a genre under `the-loai/`.
    Genre(String),
}

pub fn route_category(category: &str) -> ListRoute {
    let token = category.trim();
    if token.is_empty() || token.eq_ignore_ascii_case("home") {
        ListRoute::Home
    } else if LIST_CATEGORIES.contains(&token) {
        ListRoute::List(token.to_string())
    } else {
        ListRoute::Genre(token.to_string())
    }
}

/// Which taxonomy to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    Genre,
    Country,
}

/// Upstream technology to read from. Chosen by configuration, never by probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Structured JSON API (ophim family).
    Ophim,
    /// Rendered HTML site (phimmoichill family).
    Phimmoi,
}

impl SourceKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ophim" | "json" | "api" => Some(SourceKind::Ophim),
            "phimmoi" | "phimmoichill" | "html" => Some(SourceKind::Phimmoi),
            _ => None,
        }
    }
}

/// Capability shared by every source adapter.
///
/// Calls are independent: adapters hold only immutable client configuration.
/// A successful fetch with no matches is `Ok(vec![])`.
pub trait SourceAdapter {
    /// Short source name for logs.
    fn name(&self) -> &'static str;

    fn fetch_list(&self, category: &str, page: u32) -> Result<Vec<CanonicalMovie>, ScraperError>;

    fn fetch_detail(&self, slug: &str) -> Result<CanonicalMovie, ScraperError>;

    fn search(&self, query: &str, page: u32) -> Result<Vec<CanonicalMovie>, ScraperError>;

    fn fetch_categories(&self, kind: CategoryKind) -> Result<Vec<Category>, ScraperError>;
}

/// Resolved adapter settings (defaults, then config file, then CLI flags).
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub api_base: String,
    pub image_prefix: String,
    pub site_base: String,
    pub user_agent: Option<String>,
    pub timeout_secs: u64,
    pub grid_limit: usize,
    pub accept_invalid_certs: bool,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            image_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
            site_base: DEFAULT_SITE_BASE.to_string(),
            user_agent: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            grid_limit: DEFAULT_GRID_LIMIT,
            accept_invalid_certs: false,
        }
    }
}

impl SourceSettings {
    fn client(&self, referer: &str) -> Result<HttpClient, ScraperError> {
        let mut builder = HttpClient::builder()
            .timeout_secs(self.timeout_secs)
            .referer(referer)
            .accept_invalid_certs(self.accept_invalid_certs);
        if let Some(ua) = &self.user_agent {
            builder = builder.user_agent(ua.clone());
        }
        builder.build()
    }
}

/// Build the adapter for `kind`.
pub fn build_adapter(
    kind: SourceKind,
    settings: &SourceSettings,
) -> Result<Box<dyn SourceAdapter>, ScraperError> {
    match kind {
        SourceKind::Ophim => {
            let client = settings.client(&settings.api_base)?;
            let endpoints = ophim::OphimEndpoints::new(&settings.api_base, &settings.image_prefix)?;
            Ok(Box::new(ophim::OphimAdapter::new(client, endpoints)))
        }
        SourceKind::Phimmoi => {
            let client = settings.client(&settings.site_base)?;
            Ok(Box::new(phimmoi::PhimmoiAdapter::new(
                client,
                &settings.site_base,
                settings.grid_limit,
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_table_is_exhaustive() {
        assert_eq!(route_category(""), ListRoute::Home);
        assert_eq!(route_category("home"), ListRoute::Home);
        for token in LIST_CATEGORIES {
            assert_eq!(route_category(token), ListRoute::List(token.to_string()));
        }
        assert_eq!(
            route_category("hanh-dong"),
            ListRoute::Genre("hanh-dong".to_string())
        );
    }

    #[test]
    fn source_kind_parse() {
        assert_eq!(SourceKind::parse("ophim"), Some(SourceKind::Ophim));
        assert_eq!(SourceKind::parse("JSON"), Some(SourceKind::Ophim));
        assert_eq!(SourceKind::parse("phimmoi"), Some(SourceKind::Phimmoi));
        assert_eq!(SourceKind::parse("html"), Some(SourceKind::Phimmoi));
        assert_eq!(SourceKind::parse("other"), None);
    }

    #[test]
    fn build_adapter_for_each_kind() -> Result<(), ScraperError> {
        let settings = SourceSettings::default();
        assert_eq!(build_adapter(SourceKind::Ophim, &settings)?.name(), "ophim");
        assert_eq!(build_adapter(SourceKind::Phimmoi, &settings)?.name(), "phimmoi");
        Ok(())
    }

    #[test]
    fn build_adapter_rejects_bad_image_prefix() {
        let settings = SourceSettings {
            image_prefix: "not a url".to_string(),
            ..SourceSettings::default()
        };
        assert!(matches!(
            build_adapter(SourceKind::Ophim, &settings),
            Err(ScraperError::InvalidUrl { .. })
        ));
    }
}
