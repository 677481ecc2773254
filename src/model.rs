//! Canonical data model for aggregated movie metadata.
//!
//! Every source adapter converges on these shapes; the CLI and the
//! collaborators in [`crate::services`] consume them.

use serde::{Deserialize, Serialize};

/// Canonical movie: one title from one source, with its playable episodes.
///
/// URL fields are either empty or absolute. `slug` is non-empty on any record
/// an adapter returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalMovie {
    /// Source-stable identifier. Same value as `slug` for every current source.
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(rename = "originalTitle", skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    #[serde(rename = "thumbnailUrl")]
    pub thumbnail_url: String,
    #[serde(rename = "backdropUrl")]
    pub backdrop_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    pub quality: String,
    pub language: String,
    pub genre: String,
    pub country: String,
    pub director: String,
    pub description: String,
    /// Coarse grouping tag ("movies", "series").
    pub category: String,
    /// Raw upstream running-time label, e.g. "90 phút".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(rename = "durationMinutes", skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    /// Sorted ascending by number, numbers unique.
    pub episodes: Vec<Episode>,
}

impl CanonicalMovie {
    /// A record is usable once it carries a slug.
    pub fn is_usable(&self) -> bool {
        !self.slug.is_empty()
    }
}

/// One playable unit of a movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    /// 1-based ordinal, unique within a movie.
    pub number: u32,
    /// Upstream label, kept verbatim for display.
    pub title: String,
    /// Absolute page URL or playlist (m3u8) URL.
    pub url: String,
}

/// Genre or country filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub slug: String,
}
