//! TMDB-backed [`MetadataEnricher`]: search by title, then pull details and credits.

use super::{MetadataEnricher, ServiceError};
use crate::scraper::{Fetch, HttpClient};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const DEFAULT_TMDB_BASE: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/";
const POSTER_SIZE: &str = "w500";
const BACKDROP_SIZE: &str = "original";
const LANGUAGE: &str = "en-US";
const MAX_CAST: usize = 10;

/// Extra metadata for one title.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrichment {
    pub tmdb_id: u64,
    pub title: String,
    pub overview: String,
    pub release_date: String,
    pub vote_average: f64,
    pub runtime: Option<u32>,
    pub tagline: String,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub cast: Vec<CastMember>,
    pub directors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CastMember {
    pub name: String,
    pub character: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchHit {
    id: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Details {
    id: u64,
    title: String,
    overview: String,
    release_date: String,
    vote_average: f64,
    runtime: Option<u32>,
    tagline: String,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    credits: Credits,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Credits {
    cast: Vec<CastMember>,
    crew: Vec<CrewMember>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CrewMember {
    name: String,
    job: String,
}

fn image_url(size: &str, path: Option<&str>) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{}{}{}", IMAGE_BASE, size, p))
}

impl From<Details> for Enrichment {
    fn from(d: Details) -> Self {
        let directors = d
            .credits
            .crew
            .iter()
            .filter(|c| c.job == "Director")
            .map(|c| c.name.clone())
            .collect();
        Enrichment {
            tmdb_id: d.id,
            poster_url: image_url(POSTER_SIZE, d.poster_path.as_deref()),
            backdrop_url: image_url(BACKDROP_SIZE, d.backdrop_path.as_deref()),
            cast: d.credits.cast.into_iter().take(MAX_CAST).collect(),
            directors,
            title: d.title,
            overview: d.overview,
            release_date: d.release_date,
            vote_average: d.vote_average,
            runtime: d.runtime.filter(|r| *r > 0),
            tagline: d.tagline,
        }
    }
}

pub struct TmdbClient<F: Fetch = HttpClient> {
    fetch: F,
    api_key: Option<String>,
    base: String,
}

impl<F: Fetch> TmdbClient<F> {
    /// A client without a key is valid; every lookup then fails with `MissingApiKey`.
    pub fn new(fetch: F, api_key: Option<String>) -> Self {
        Self {
            fetch,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base: DEFAULT_TMDB_BASE.to_string(),
        }
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into().trim_end_matches('/').to_string();
        self
    }

    fn search_url(&self, key: &str, title: &str, year: Option<u32>) -> String {
        let mut url = format!(
            "{}/search/movie?api_key={}&query={}&language={}",
            self.base,
            urlencoding::encode(key),
            urlencoding::encode(title),
            LANGUAGE
        );
        if let Some(y) = year {
            url.push_str(&format!("&year={}", y));
        }
        url
    }

    fn details_url(&self, key: &str, id: u64) -> String {
        format!(
            "{}/movie/{}?api_key={}&append_to_response=credits&language={}",
            self.base,
            id,
            urlencoding::encode(key),
            LANGUAGE
        )
    }

    fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        what: &str,
    ) -> Result<T, ServiceError> {
        let body = self.fetch.get_text(url, what)?;
        serde_json::from_str(&body).map_err(|e| ServiceError::Decode {
            what: what.to_string(),
            source: e,
        })
    }
}

impl<F: Fetch> MetadataEnricher for TmdbClient<F> {
    /// `Ok(None)` when the search has no results.
    fn enrich(&self, title: &str, year: Option<u32>) -> Result<Option<Enrichment>, ServiceError> {
        let key = self.api_key.as_deref().ok_or(ServiceError::MissingApiKey)?;
        let search: SearchResponse =
            self.get_json(&self.search_url(key, title, year), "TMDB search")?;
        let Some(hit) = search.results.first() else {
            debug!(title, ?year, "no TMDB match");
            return Ok(None);
        };
        let details: Details = self.get_json(&self.details_url(key, hit.id), "TMDB details")?;
        info!(title, tmdb_id = details.id, "enriched from TMDB");
        Ok(Some(details.into()))
    }
}
