//! Structured API adapter (ophim family). Listing, search and detail endpoints
//! return differently shaped envelopes; see [`crate::scraper::shape`].

use crate::model::{CanonicalMovie, Category, Episode};
use crate::scraper::chain::{non_empty, resolve_or, Strategy};
use crate::scraper::normalize::{
    finalize_episodes, normalize_image_url, normalize_url, parse_duration_minutes,
    resolve_episode_number,
};
use crate::scraper::shape::{
    resolve_categories, resolve_episode_groups, resolve_items, resolve_single, ApiMovie,
    CategoryEnvelope, EpisodeEntry, EpisodeServer, Envelope, NamedRef,
};
use crate::scraper::{
    route_category, CategoryKind, Fetch, HttpClient, ListRoute, ScraperError, SourceAdapter,
};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

/// URL layout of one API deployment.
#[derive(Debug, Clone)]
pub struct OphimEndpoints {
    api_base: String,
    image_prefix: String,
    image_origin: String,
}

impl OphimEndpoints {
    pub fn new(api_base: &str, image_prefix: &str) -> Result<Self, ScraperError> {
        Url::parse(api_base).map_err(|e| ScraperError::InvalidUrl {
            input: api_base.to_string(),
            reason: e.to_string(),
        })?;
        let image_origin = Url::parse(image_prefix)
            .map_err(|e| ScraperError::InvalidUrl {
                input: image_prefix.to_string(),
                reason: e.to_string(),
            })?
            .origin()
            .ascii_serialization();
        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            image_prefix: image_prefix.to_string(),
            image_origin,
        })
    }

    /// Upstream path for a category token (no network involved).
    pub fn list_path(category: &str) -> String {
        match route_category(category) {
            ListRoute::Home => "v1/api/danh-sach/phim-moi-cap-nhat".to_string(),
            ListRoute::List(token) => format!("v1/api/danh-sach/{}", token),
            ListRoute::Genre(token) => {
                format!("v1/api/the-loai/{}", urlencoding::encode(&token))
            }
        }
    }

    pub fn list_url(&self, category: &str, page: u32) -> String {
        format!("{}/{}?page={}", self.api_base, Self::list_path(category), page)
    }

    pub fn search_url(&self, query: &str, page: u32) -> String {
        format!(
            "{}/v1/api/tim-kiem?keyword={}&page={}",
            self.api_base,
            urlencoding::encode(query.trim()),
            page
        )
    }

    pub fn detail_url(&self, slug: &str) -> String {
        format!("{}/v1/api/phim/{}", self.api_base, urlencoding::encode(slug.trim()))
    }

    pub fn categories_url(&self, kind: CategoryKind) -> String {
        let path = match kind {
            CategoryKind::Genre => "the-loai",
            CategoryKind::Country => "quoc-gia",
        };
        format!("{}/v1/api/{}", self.api_base, path)
    }

    fn image(&self, raw: &str) -> String {
        normalize_image_url(raw, &self.image_prefix, &self.image_origin)
    }
}

/// JSON API adapter. Generic over the transport so tests can feed canned bodies.
pub struct OphimAdapter<F: Fetch = HttpClient> {
    fetch: F,
    endpoints: OphimEndpoints,
}

impl<F: Fetch> OphimAdapter<F> {
    pub fn new(fetch: F, endpoints: OphimEndpoints) -> Self {
        Self { fetch, endpoints }
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, context: &str) -> Result<T, ScraperError> {
        let body = self.fetch.get_text(url, context)?;
        serde_json::from_str(&body).map_err(|e| ScraperError::Decode {
            url: url.to_string(),
            source: e,
        })
    }

    fn fetch_movie_list(
        &self,
        url: &str,
        context: &str,
    ) -> Result<Vec<CanonicalMovie>, ScraperError> {
        let envelope: Envelope = self.get_json(url, context)?;
        let items = resolve_items(&envelope);
        debug!(url, slot = items.strategy, count = items.value.len(), "resolved list items");
        let movies: Vec<CanonicalMovie> = items
            .value
            .iter()
            .filter_map(|item| {
                let movie = list_movie(item, &self.endpoints);
                if !movie.is_usable() {
                    debug!(title = %item.name, "skipping list item without slug");
                }
                movie.is_usable().then_some(movie)
            })
            .collect();
        info!(url, count = movies.len(), "parsed movie list");
        Ok(movies)
    }
}

fn joined_names(refs: &[NamedRef]) -> String {
    refs.iter()
        .filter_map(|r| non_empty(&r.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Canonical movie from a list item (detail fields left empty).
fn list_movie(item: &ApiMovie, endpoints: &OphimEndpoints) -> CanonicalMovie {
    let slug = item.slug.trim().to_string();
    let time = non_empty(&item.time);
    CanonicalMovie {
        id: slug.clone(),
        slug,
        title: item.name.trim().to_string(),
        original_title: non_empty(&item.origin_name),
        thumbnail_url: endpoints.image(&item.thumb_url),
        backdrop_url: endpoints.image(&item.poster_url),
        year: item.year,
        quality: item.quality.trim().to_string(),
        language: item.lang.trim().to_string(),
        category: "movies".to_string(),
        duration_minutes: time.as_deref().and_then(parse_duration_minutes),
        time,
        ..Default::default()
    }
}

/// Playable URL of one entry: the m3u8 playlist, else the embed page.
fn entry_url(entry: &EpisodeEntry, api_base: &str) -> Option<String> {
    let chain = [
        Strategy::new("link_m3u8", |e: &EpisodeEntry| non_empty(&e.link_m3u8)),
        Strategy::new("link_embed", |e: &EpisodeEntry| non_empty(&e.link_embed)),
    ];
    let url = resolve_or(entry, &chain, String::new());
    non_empty(normalize_url(&url, api_base))
}

/// Every server group's entries as one de-duplicated, ascending episode list.
fn flatten_episodes(groups: &[EpisodeServer], api_base: &str) -> Vec<Episode> {
    let parsed = groups
        .iter()
        .flat_map(|group| group.server_data.iter())
        .filter_map(|entry| match entry_url(entry, api_base) {
            Some(url) => Some(Episode {
                number: resolve_episode_number(&entry.name),
                title: entry.name.clone(),
                url,
            }),
            None => {
                debug!(label = %entry.name, "dropping episode without stream link");
                None
            }
        });
    finalize_episodes(parsed)
}

/// Parse a detail response body into a canonical movie.
fn parse_detail(
    envelope: &Envelope,
    slug: &str,
    endpoints: &OphimEndpoints,
) -> Result<CanonicalMovie, ScraperError> {
    let single = resolve_single(envelope);
    let item = single.value;
    if item.slug.trim().is_empty() {
        return Err(ScraperError::NotFound {
            slug: slug.to_string(),
        });
    }
    let groups = resolve_episode_groups(envelope);
    debug!(
        item_slot = single.strategy,
        episode_slot = groups.strategy,
        groups = groups.value.len(),
        "resolved detail envelope"
    );
    let episodes = flatten_episodes(groups.value, &endpoints.api_base);
    let mut movie = list_movie(item, endpoints);
    movie.description = item.content.trim().to_string();
    movie.director = item.director.join(", ");
    movie.genre = joined_names(&item.category);
    movie.country = joined_names(&item.country);
    if episodes.len() > 1 {
        movie.category = "series".to_string();
    }
    movie.episodes = episodes;
    Ok(movie)
}

impl<F: Fetch> SourceAdapter for OphimAdapter<F> {
    fn name(&self) -> &'static str {
        "ophim"
    }

    fn fetch_list(&self, category: &str, page: u32) -> Result<Vec<CanonicalMovie>, ScraperError> {
        let url = self.endpoints.list_url(category, page.max(1));
        self.fetch_movie_list(&url, "list")
    }

    fn fetch_detail(&self, slug: &str) -> Result<CanonicalMovie, ScraperError> {
        let url = self.endpoints.detail_url(slug);
        let envelope: Envelope = self.get_json(&url, "detail")?;
        let movie = parse_detail(&envelope, slug, &self.endpoints)?;
        info!(slug = %movie.slug, episodes = movie.episodes.len(), "parsed movie detail");
        Ok(movie)
    }

    fn search(&self, query: &str, page: u32) -> Result<Vec<CanonicalMovie>, ScraperError> {
        let url = self.endpoints.search_url(query, page.max(1));
        self.fetch_movie_list(&url, "search")
    }

    fn fetch_categories(&self, kind: CategoryKind) -> Result<Vec<Category>, ScraperError> {
        let url = self.endpoints.categories_url(kind);
        let envelope: CategoryEnvelope = self.get_json(&url, "categories")?;
        Ok(resolve_categories(&envelope)
            .iter()
            .filter(|c| !c.slug.trim().is_empty())
            .map(|c| Category {
                name: c.name.trim().to_string(),
                slug: c.slug.trim().to_string(),
            })
            .collect())
    }
}
