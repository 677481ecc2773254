//! Envelope types for the structured API and the fixed-priority resolvers that
//! find the real payload inside them.
//!
//! The same endpoint family wraps its payload differently per path: listings
//! put items at the top level, search nests them under `data`, detail responses
//! use either `movie` + `episodes` or `data.item` with episodes inside the item.
//! Each resolver below is a [`Strategy`] chain; the order is fixed.

use crate::scraper::chain::{first_found, Found, Strategy};
use serde::{Deserialize, Deserializer};

/// Treat `null` the same as a missing field.
fn null_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Years arrive as numbers, numeric strings, or null.
fn lenient_u32<'de, D>(d: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(d)?;
    Ok(match v {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|n| *n > 0))
}

/// `director` is usually a list of names, occasionally a single string.
fn string_or_list<'de, D>(d: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<Option<String>>),
    }
    Ok(match Option::<OneOrMany>::deserialize(d)? {
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v.into_iter().flatten().collect(),
        None => Vec::new(),
    }
    .into_iter()
    .map(|s| s.trim().to_string())
    .filter(|s| !s.is_empty())
    .collect())
}

/// Outer response object. Every slot is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Envelope {
    #[serde(deserialize_with = "null_default")]
    pub items: Vec<ApiMovie>,
    #[serde(deserialize_with = "null_default")]
    pub data: EnvelopeData,
    #[serde(deserialize_with = "null_default")]
    pub movie: ApiMovie,
    #[serde(deserialize_with = "null_default")]
    pub episodes: Vec<EpisodeServer>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EnvelopeData {
    #[serde(deserialize_with = "null_default")]
    pub items: Vec<ApiMovie>,
    #[serde(deserialize_with = "null_default")]
    pub item: ApiMovie,
    #[serde(deserialize_with = "null_default")]
    pub episodes: Vec<EpisodeServer>,
}

/// List item or detail item. List items simply leave the detail fields empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApiMovie {
    #[serde(rename = "_id", deserialize_with = "null_default")]
    pub id: String,
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    #[serde(deserialize_with = "null_default")]
    pub origin_name: String,
    #[serde(deserialize_with = "null_default")]
    pub slug: String,
    #[serde(deserialize_with = "null_default")]
    pub thumb_url: String,
    #[serde(deserialize_with = "null_default")]
    pub poster_url: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub year: Option<u32>,
    #[serde(deserialize_with = "null_default")]
    pub time: String,
    #[serde(deserialize_with = "null_default")]
    pub quality: String,
    #[serde(deserialize_with = "null_default")]
    pub lang: String,
    #[serde(deserialize_with = "null_default")]
    pub content: String,
    #[serde(deserialize_with = "string_or_list")]
    pub director: Vec<String>,
    #[serde(deserialize_with = "null_default")]
    pub category: Vec<NamedRef>,
    #[serde(deserialize_with = "null_default")]
    pub country: Vec<NamedRef>,
    #[serde(deserialize_with = "null_default")]
    pub episodes: Vec<EpisodeServer>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NamedRef {
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    #[serde(deserialize_with = "null_default")]
    pub slug: String,
}

/// One server group of episodes.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EpisodeServer {
    #[serde(deserialize_with = "null_default")]
    pub server_name: String,
    #[serde(deserialize_with = "null_default")]
    pub server_data: Vec<EpisodeEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EpisodeEntry {
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    #[serde(deserialize_with = "null_default")]
    pub slug: String,
    #[serde(deserialize_with = "null_default")]
    pub filename: String,
    #[serde(deserialize_with = "null_default")]
    pub link_embed: String,
    #[serde(deserialize_with = "null_default")]
    pub link_m3u8: String,
}

/// Genre/country listing envelope.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CategoryEnvelope {
    #[serde(deserialize_with = "null_default")]
    pub items: Vec<NamedRef>,
    #[serde(deserialize_with = "null_default")]
    pub data: CategoryData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CategoryData {
    #[serde(deserialize_with = "null_default")]
    pub items: Vec<NamedRef>,
}

fn non_empty_slice<T>(v: &[T]) -> Option<&[T]> {
    (!v.is_empty()).then_some(v)
}

fn item_chain<'e>() -> [Strategy<'e, &'e Envelope, &'e [ApiMovie]>; 2] {
    [
        Strategy::new("items", |env: &'e Envelope| non_empty_slice(&env.items)),
        Strategy::new("data.items", |env: &'e Envelope| {
            non_empty_slice(&env.data.items)
        }),
    ]
}

fn single_chain<'e>() -> [Strategy<'e, &'e Envelope, &'e ApiMovie>; 2] {
    [
        Strategy::new("movie", |env: &'e Envelope| {
            (!env.movie.slug.trim().is_empty()).then_some(&env.movie)
        }),
        Strategy::new("data.item", |env: &'e Envelope| Some(&env.data.item)),
    ]
}

fn episode_chain<'e>() -> [Strategy<'e, &'e Envelope, &'e [EpisodeServer]>; 3] {
    [
        Strategy::new("episodes", |env: &'e Envelope| non_empty_slice(&env.episodes)),
        Strategy::new("data.episodes", |env: &'e Envelope| {
            non_empty_slice(&env.data.episodes)
        }),
        Strategy::new("item.episodes", |env: &'e Envelope| {
            let item = resolve_single(env).value;
            non_empty_slice(&item.episodes)
        }),
    ]
}

/// Items of a listing: `items`, else `data.items`, else empty.
pub fn resolve_items(env: &Envelope) -> Found<&[ApiMovie]> {
    first_found(env, &item_chain()).unwrap_or(Found {
        strategy: "empty",
        value: &[],
    })
}

/// Detail item: `movie` when it carries a slug, else `data.item`.
///
/// The fallback is returned even if its slug is empty; callers decide whether
/// that means "not found".
pub fn resolve_single(env: &Envelope) -> Found<&ApiMovie> {
    first_found(env, &single_chain()).unwrap_or(Found {
        strategy: "data.item",
        value: &env.data.item,
    })
}

/// Episode server groups: `episodes`, else `data.episodes`, else the resolved
/// item's own `episodes`, else empty.
pub fn resolve_episode_groups(env: &Envelope) -> Found<&[EpisodeServer]> {
    first_found(env, &episode_chain()).unwrap_or(Found {
        strategy: "empty",
        value: &[],
    })
}

/// Category entries: `data.items`, else `items`.
pub fn resolve_categories<'e>(env: &'e CategoryEnvelope) -> &'e [NamedRef] {
    let chain = [
        Strategy::new("data.items", |env: &'e CategoryEnvelope| {
            non_empty_slice(&env.data.items)
        }),
        Strategy::new("items", |env: &'e CategoryEnvelope| {
            non_empty_slice(&env.items)
        }),
    ];
    first_found(env, &chain).map(|f| f.value).unwrap_or(&[])
}
