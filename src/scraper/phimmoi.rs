//! Rendered-HTML adapter (phimmoichill family).
//!
//! Markup differs between list, search and detail pages and changes without
//! notice, so every field is read through an ordered [`Strategy`] chain:
//! primary selector, fallback selector, attribute pattern, then a default.

use crate::model::{CanonicalMovie, Category, Episode};
use crate::scraper::chain::{first_found, non_empty, resolve_or, Strategy};
use crate::scraper::normalize::{
    episode_number_from_href, finalize_episodes, first_year, normalize_url, parenthesized_year,
    slug_from_href, title_from_slug, url_from_style,
};
use crate::scraper::{
    route_category, CategoryKind, Fetch, HttpClient, ListRoute, ScraperError, SourceAdapter,
};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info};

const DEFAULT_QUALITY: &str = "HD";

/// Parse a CSS selector or return a selector error (avoids panics from Selector::parse).
fn parse_selector(sel: &str) -> Result<Selector, ScraperError> {
    Selector::parse(sel).map_err(|e| ScraperError::InvalidSelector {
        selector: sel.to_string(),
        reason: e.to_string(),
    })
}

/// Compiled selectors for every page type of the site.
struct Selectors {
    card: Selector,
    card_link: Selector,
    card_link_fallback: Selector,
    card_title: Selector,
    card_img: Selector,
    card_quality: Selector,
    card_subtitle: Selector,
    detail_quality: Selector,
    detail_title: Selector,
    page_heading: Selector,
    meta_description: Selector,
    body_description: Selector,
    og_image: Selector,
    poster_img: Selector,
    info_items: Selector,
    anchors: Selector,
    episode_links: Selector,
    genre_links: Selector,
    country_links: Selector,
}

impl Selectors {
    fn new() -> Result<Self, ScraperError> {
        Ok(Self {
            card: parse_selector(".myui-vodlist__box")?,
            card_link: parse_selector("a.myui-vodlist__thumb")?,
            card_link_fallback: parse_selector("a[href*='/phim/']")?,
            card_title: parse_selector("h4.title a, h4 a, .title a")?,
            card_img: parse_selector("img")?,
            card_quality: parse_selector(".pic-tag, .quality, .label")?,
            card_subtitle: parse_selector(".text-muted")?,
            detail_quality: parse_selector(
                ".movie-info .quality, .movie-info .label, .film-info .quality, \
                 .film-info .label, .movie-l-img .pic-tag",
            )?,
            detail_title: parse_selector("h1.movie-title")?,
            page_heading: parse_selector("h1")?,
            meta_description: parse_selector("meta[name='description']")?,
            body_description: parse_selector(
                ".description, .content, .film-description, .entry-content",
            )?,
            og_image: parse_selector("meta[property='og:image']")?,
            poster_img: parse_selector(".movie-l-img img, .thumb img")?,
            info_items: parse_selector(".movie-info li, .film-info li")?,
            anchors: parse_selector("a")?,
            episode_links: parse_selector("a[href*='/tap-'], a[href*='episode'], .episode-list a")?,
            genre_links: parse_selector("a[href*='/the-loai/']")?,
            country_links: parse_selector("a[href*='/quoc-gia/']")?,
        })
    }
}

/// Element text with runs of whitespace collapsed; `None` if blank.
fn text_of(el: ElementRef<'_>) -> Option<String> {
    let joined = el.text().collect::<Vec<_>>().join(" ");
    non_empty(joined.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn attr_of(el: ElementRef<'_>, name: &str) -> Option<String> {
    el.value().attr(name).and_then(non_empty)
}

fn first_text(scope: ElementRef<'_>, sel: &Selector) -> Option<String> {
    scope.select(sel).find_map(text_of)
}

/// Lazy-load stand-ins: inline `data:` URIs and loading spinners.
fn is_placeholder(src: &str) -> bool {
    let lower = src.to_ascii_lowercase();
    lower.starts_with("data:") || lower.contains("loading") || lower.contains("placeholder")
}

/// Canonical movie from one grid card, or `None` when the card has no usable link.
fn parse_card<'a>(card: ElementRef<'a>, sel: &Selectors, base: &str) -> Option<CanonicalMovie> {
    let link_chain = [
        Strategy::new("a.myui-vodlist__thumb", |c: ElementRef<'a>| {
            c.select(&sel.card_link).next()
        }),
        Strategy::new("a[href*='/phim/']", |c: ElementRef<'a>| {
            c.select(&sel.card_link_fallback).next()
        }),
    ];
    let link = first_found(card, &link_chain)?.value;
    let slug = attr_of(link, "href").as_deref().and_then(slug_from_href)?;

    let title_chain = [
        Strategy::new("link[title]", |_: ElementRef<'a>| attr_of(link, "title")),
        Strategy::new("card title", |c: ElementRef<'a>| first_text(c, &sel.card_title)),
    ];
    let title = resolve_or(card, &title_chain, title_from_slug(&slug));

    let thumb_chain = [
        Strategy::new("style url()", |_: ElementRef<'a>| {
            attr_of(link, "style").as_deref().and_then(url_from_style)
        }),
        Strategy::new("img[src]", |c: ElementRef<'a>| {
            c.select(&sel.card_img)
                .find_map(|img| attr_of(img, "src").filter(|src| !is_placeholder(src)))
        }),
        Strategy::new("img[data-src]", |c: ElementRef<'a>| {
            c.select(&sel.card_img).find_map(|img| attr_of(img, "data-src"))
        }),
    ];
    let thumbnail = resolve_or(card, &thumb_chain, String::new());

    let quality =
        first_text(card, &sel.card_quality).unwrap_or_else(|| DEFAULT_QUALITY.to_string());
    let original_title = first_text(card, &sel.card_subtitle);
    let year = original_title.as_deref().and_then(parenthesized_year);
    let lower = quality.to_lowercase();
    let category = if lower.contains("tập") || lower.contains("ep") {
        "series"
    } else {
        "movies"
    };

    Some(CanonicalMovie {
        id: slug.clone(),
        slug,
        title,
        original_title,
        thumbnail_url: normalize_url(&thumbnail, base),
        year,
        quality,
        category: category.to_string(),
        ..Default::default()
    })
}

/// Movie cards in document order, at most `limit` of them. Cards without a
/// usable link are skipped; the scan stops once `limit` movies are collected.
fn parse_grid(doc: &Html, sel: &Selectors, base: &str, limit: usize) -> Vec<CanonicalMovie> {
    let mut movies = Vec::with_capacity(limit.min(64));
    for card in doc.select(&sel.card) {
        if movies.len() >= limit {
            break;
        }
        match parse_card(card, sel, base) {
            Some(movie) => movies.push(movie),
            None => debug!("skipping movie card without a usable link"),
        }
    }
    movies
}

/// Value after the label of an info row: anchor texts joined, else the text after ':'.
fn info_value(item: ElementRef<'_>, sel: &Selectors) -> Option<String> {
    let names: Vec<String> = item.select(&sel.anchors).filter_map(text_of).collect();
    if !names.is_empty() {
        return Some(names.join(", "));
    }
    let text = text_of(item)?;
    let value = text.split_once(':').map(|(_, v)| v).unwrap_or(text.as_str());
    non_empty(value)
}

/// Labelled info rows ("Năm phát hành: 2021", "Quốc gia: ...").
#[derive(Debug, Default)]
struct InfoRows {
    year: Option<u32>,
    country: Option<String>,
    genre: Option<String>,
    director: Option<String>,
}

fn parse_info_rows(doc: &Html, sel: &Selectors) -> InfoRows {
    let mut info = InfoRows::default();
    for item in doc.select(&sel.info_items) {
        let Some(text) = text_of(item) else { continue };
        if text.contains("Năm") || text.contains("Year") {
            if info.year.is_none() {
                info.year = first_year(&text);
            }
        } else if text.contains("Quốc gia") || text.contains("Country") {
            info.country = info.country.or_else(|| info_value(item, sel));
        } else if text.contains("Thể loại") || text.contains("Genre") {
            info.genre = info.genre.or_else(|| info_value(item, sel));
        } else if text.contains("Đạo diễn") || text.contains("Director") {
            info.director = info.director.or_else(|| info_value(item, sel));
        }
    }
    info
}

/// Episode anchors, numbered from their href (`.../tap-N`), de-duplicated and sorted.
fn parse_episode_links(doc: &Html, sel: &Selectors, base: &str) -> Vec<Episode> {
    let parsed = doc.select(&sel.episode_links).filter_map(|a| {
        let href = attr_of(a, "href")?;
        let number = episode_number_from_href(&href)?;
        Some(Episode {
            number,
            title: text_of(a).unwrap_or_else(|| format!("Tập {}", number)),
            url: normalize_url(&href, base),
        })
    });
    finalize_episodes(parsed)
}

fn meta_content(doc: &Html, sel: &Selector) -> Option<String> {
    doc.select(sel).find_map(|m| attr_of(m, "content"))
}

/// Canonical movie from a detail page. Missing fields stay empty.
fn parse_detail(doc: &Html, sel: &Selectors, base: &str, slug: &str) -> CanonicalMovie {
    let title_chain = [
        Strategy::new("h1.movie-title", |d: &Html| d.select(&sel.detail_title).find_map(text_of)),
        Strategy::new("h1", |d: &Html| d.select(&sel.page_heading).find_map(text_of)),
    ];
    let title = resolve_or(doc, &title_chain, title_from_slug(slug));

    let description_chain = [
        Strategy::new("meta description", |d: &Html| meta_content(d, &sel.meta_description)),
        Strategy::new("body description", |d: &Html| {
            d.select(&sel.body_description).find_map(text_of)
        }),
    ];
    let description = first_found(doc, &description_chain);
    if let Some(found) = &description {
        debug!(slug, strategy = found.strategy, "description resolved");
    }

    let poster_chain = [
        Strategy::new("og:image", |d: &Html| meta_content(d, &sel.og_image)),
        Strategy::new("poster img", |d: &Html| {
            d.select(&sel.poster_img).find_map(|img| attr_of(img, "src"))
        }),
    ];
    let poster = resolve_or(doc, &poster_chain, String::new());

    let info = parse_info_rows(doc, sel);
    let episodes = parse_episode_links(doc, sel, base);
    let quality = doc
        .select(&sel.detail_quality)
        .find_map(text_of)
        .unwrap_or_else(|| DEFAULT_QUALITY.to_string());

    CanonicalMovie {
        id: slug.to_string(),
        slug: slug.to_string(),
        title,
        thumbnail_url: normalize_url(&poster, base),
        year: info.year,
        quality,
        genre: info.genre.unwrap_or_default(),
        country: info.country.unwrap_or_default(),
        director: info.director.unwrap_or_default(),
        description: description.map(|f| f.value).unwrap_or_default(),
        category: if episodes.len() > 1 { "series" } else { "movies" }.to_string(),
        episodes,
        ..Default::default()
    }
}

/// Genre or country links from the site navigation, first occurrence per slug.
fn parse_categories(doc: &Html, sel: &Selectors, kind: CategoryKind) -> Vec<Category> {
    let links = match kind {
        CategoryKind::Genre => &sel.genre_links,
        CategoryKind::Country => &sel.country_links,
    };
    let mut seen = HashSet::new();
    doc.select(links)
        .filter_map(|a| {
            let slug = attr_of(a, "href").as_deref().and_then(slug_from_href)?;
            let name = text_of(a)?;
            Some(Category { name, slug })
        })
        .filter(|c| seen.insert(c.slug.clone()))
        .collect()
}

/// HTML adapter. Generic over the transport so tests can feed canned pages.
pub struct PhimmoiAdapter<F: Fetch = HttpClient> {
    fetch: F,
    base: String,
    grid_limit: usize,
    selectors: Selectors,
}

impl<F: Fetch> PhimmoiAdapter<F> {
    pub fn new(fetch: F, site_base: &str, grid_limit: usize) -> Result<Self, ScraperError> {
        reqwest::Url::parse(site_base).map_err(|e| ScraperError::InvalidUrl {
            input: site_base.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            fetch,
            base: site_base.trim_end_matches('/').to_string(),
            grid_limit,
            selectors: Selectors::new()?,
        })
    }

    pub fn list_url(&self, category: &str, page: u32) -> String {
        let path = match route_category(category) {
            ListRoute::Home => "danh-sach/phim-le".to_string(),
            ListRoute::List(token) => format!("danh-sach/{}", token),
            ListRoute::Genre(token) => format!("the-loai/{}", urlencoding::encode(&token)),
        };
        if page > 1 {
            format!("{}/{}/page/{}", self.base, path, page)
        } else {
            format!("{}/{}", self.base, path)
        }
    }

    pub fn search_url(&self, query: &str, page: u32) -> String {
        let mut url = format!(
            "{}/tim-kiem?keyword={}",
            self.base,
            urlencoding::encode(query.trim())
        );
        if page > 1 {
            url.push_str(&format!("&page={}", page));
        }
        url
    }

    pub fn detail_url(&self, slug: &str) -> String {
        format!("{}/phim/{}", self.base, urlencoding::encode(slug.trim()))
    }

    fn fetch_document(&self, url: &str, context: &str) -> Result<Html, ScraperError> {
        let body = self.fetch.get_text(url, context)?;
        Ok(Html::parse_document(&body))
    }

    fn fetch_grid(&self, url: &str, context: &str) -> Result<Vec<CanonicalMovie>, ScraperError> {
        let doc = self.fetch_document(url, context)?;
        let movies = parse_grid(&doc, &self.selectors, &self.base, self.grid_limit);
        info!(url, count = movies.len(), "parsed movie grid");
        Ok(movies)
    }
}

impl<F: Fetch> SourceAdapter for PhimmoiAdapter<F> {
    fn name(&self) -> &'static str {
        "phimmoi"
    }

    fn fetch_list(&self, category: &str, page: u32) -> Result<Vec<CanonicalMovie>, ScraperError> {
        let url = self.list_url(category, page);
        self.fetch_grid(&url, "list page")
    }

    fn fetch_detail(&self, slug: &str) -> Result<CanonicalMovie, ScraperError> {
        let url = self.detail_url(slug);
        let doc = self.fetch_document(&url, "detail page")?;
        let movie = parse_detail(&doc, &self.selectors, &self.base, slug.trim());
        info!(slug = %movie.slug, episodes = movie.episodes.len(), "parsed movie detail");
        Ok(movie)
    }

    fn search(&self, query: &str, page: u32) -> Result<Vec<CanonicalMovie>, ScraperError> {
        let url = self.search_url(query, page);
        self.fetch_grid(&url, "search page")
    }

    fn fetch_categories(&self, kind: CategoryKind) -> Result<Vec<Category>, ScraperError> {
        let url = format!("{}/", self.base);
        let doc = self.fetch_document(&url, "home page")?;
        Ok(parse_categories(&doc, &self.selectors, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::stub::StubFetch;

    const BASE: &str = "https://phimmoichill.network";

    fn selectors() -> Selectors {
        Selectors::new().expect("selectors must compile")
    }

    fn card(slug: &str, title: &str) -> String {
        format!(
            r#"<div class="myui-vodlist__box">
                 <a class="myui-vodlist__thumb" href="/phim/{slug}" title="{title}"
                    style="background-image: url('//img.example/{slug}.jpg')">
                   <span class="pic-tag">FHD</span>
                 </a>
                 <p class="text-muted">{title} EN (2020)</p>
               </div>"#
        )
    }

    fn grid_page(cards: &[String]) -> String {
        format!(
            "<html><body><div class=\"myui-vodlist\">{}</div></body></html>",
            cards.join("\n")
        )
    }

    #[test]
    fn grid_respects_limit_and_document_order() {
        let cards: Vec<String> = (1..=5)
            .map(|i| card(&format!("phim-{}", i), &format!("Phim {}", i)))
            .collect();
        let doc = Html::parse_document(&grid_page(&cards));
        let movies = parse_grid(&doc, &selectors(), BASE, 3);
        let slugs: Vec<&str> = movies.iter().map(|m| m.slug.as_str()).collect();
        assert_eq!(slugs, vec!["phim-1", "phim-2", "phim-3"]);
        assert_eq!(movies[0].title, "Phim 1");
        assert_eq!(movies[0].thumbnail_url, "https://img.example/phim-1.jpg");
        assert_eq!(movies[0].quality, "FHD");
        assert_eq!(movies[0].original_title.as_deref(), Some("Phim 1 EN (2020)"));
        assert_eq!(movies[0].year, Some(2020));
    }

    #[test]
    fn grid_uses_fallbacks_and_skips_linkless_cards() {
        let html = r#"<html><body>
            <div class="myui-vodlist__box"><span>no link here</span></div>
            <div class="myui-vodlist__box">
              <a href="https://phimmoichill.network/phim/tap-doan-x"><img data-src="/img/x.png"></a>
              <h4 class="title"><a>Tập Đoàn X</a></h4>
              <span class="label">Tập 12</span>
            </div>
            <div class="myui-vodlist__box">
              <a class="myui-vodlist__thumb" href="/phim/khong-ten/"><img src="/img/y.png"></a>
            </div>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let movies = parse_grid(&doc, &selectors(), BASE, 10);
        assert_eq!(movies.len(), 2);

        let x = &movies[0];
        assert_eq!(x.slug, "tap-doan-x");
        assert_eq!(x.title, "Tập Đoàn X");
        assert_eq!(x.thumbnail_url, "https://phimmoichill.network/img/x.png");
        assert_eq!(x.quality, "Tập 12");
        assert_eq!(x.category, "series");

        let y = &movies[1];
        assert_eq!(y.slug, "khong-ten");
        assert_eq!(y.title, "Khong Ten");
        assert_eq!(y.thumbnail_url, "https://phimmoichill.network/img/y.png");
        assert_eq!(y.quality, "HD");
        assert_eq!(y.category, "movies");
    }

    #[test]
    fn lazy_loaded_card_reads_data_src_over_placeholder() {
        let html = r#"<html><body>
            <div class="myui-vodlist__box">
              <a href="/phim/abc"><img src="data:image/gif;base64,R0lGODlh" data-src="/uploads/abc.jpg"></a>
            </div>
            <div class="myui-vodlist__box">
              <a href="/phim/def"><img src="/images/loading.gif" data-src="/uploads/def.jpg"></a>
            </div>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let movies = parse_grid(&doc, &selectors(), BASE, 10);
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].thumbnail_url, "https://phimmoichill.network/uploads/abc.jpg");
        assert_eq!(movies[1].thumbnail_url, "https://phimmoichill.network/uploads/def.jpg");
    }

    const DETAIL_PAGE: &str = r#"<html><head>
        <meta property="og:image" content="//img.example/poster.jpg">
        <meta property="og:description" content="Share card text">
        </head><body>
        <h1>Fallback Heading</h1>
        <div class="description"><p>Một bộ phim  hay.</p></div>
        <ul class="movie-info">
          <li>Trạng thái: Hoàn tất</li>
          <li>Năm phát hành: <a href="/nam/2019">2019</a></li>
          <li>Quốc gia: <a href="/quoc-gia/han-quoc">Hàn Quốc</a></li>
          <li>Thể loại: <a href="/the-loai/tinh-cam">Tình Cảm</a>, <a href="/the-loai/hai">Hài</a></li>
          <li>Đạo diễn: Kim A</li>
        </ul>
        <div class="episode-list">
          <a href="/xem-phim/abc/tap-2">Tập 2</a>
          <a href="/xem-phim/abc/tap-1">Tập 1</a>
          <a href="/xem-phim/abc/tap-2">Tập 2 (server 2)</a>
          <a href="/xem-phim/abc/trailer">Trailer</a>
        </div>
        </body></html>"#;

    #[test]
    fn detail_falls_back_to_body_description_and_heading() {
        let doc = Html::parse_document(DETAIL_PAGE);
        let movie = parse_detail(&doc, &selectors(), BASE, "abc");
        assert_eq!(movie.slug, "abc");
        assert_eq!(movie.title, "Fallback Heading");
        assert_eq!(movie.description, "Một bộ phim hay.");
        assert_eq!(movie.thumbnail_url, "https://img.example/poster.jpg");
        assert_eq!(movie.year, Some(2019));
        assert_eq!(movie.country, "Hàn Quốc");
        assert_eq!(movie.genre, "Tình Cảm, Hài");
        assert_eq!(movie.director, "Kim A");
        let numbers: Vec<u32> = movie.episodes.iter().map(|e| e.number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(movie.episodes[1].title, "Tập 2");
        assert_eq!(
            movie.episodes[0].url,
            "https://phimmoichill.network/xem-phim/abc/tap-1"
        );
        assert_eq!(movie.category, "series");
    }

    #[test]
    fn detail_prefers_primary_title_and_meta_description() {
        let html = r#"<html><head>
            <meta name="description" content="From meta">
            </head><body>
            <h1 class="movie-title">Primary</h1><h1>Other</h1>
            <div class="description">From body</div>
            </body></html>"#;
        let doc = Html::parse_document(html);
        let movie = parse_detail(&doc, &selectors(), BASE, "p");
        assert_eq!(movie.title, "Primary");
        assert_eq!(movie.description, "From meta");
        assert!(movie.episodes.is_empty());
        assert_eq!(movie.category, "movies");
        assert_eq!(movie.thumbnail_url, "");
    }

    #[test]
    fn detail_quality_ignores_badges_outside_info_block() {
        let html = r#"<html><body>
            <span class="label">Hot</span>
            <h1 class="movie-title">Q</h1>
            <div class="movie-info"><span class="quality">FHD</span></div>
            </body></html>"#;
        let doc = Html::parse_document(html);
        assert_eq!(parse_detail(&doc, &selectors(), BASE, "q").quality, "FHD");

        let html = r#"<html><body><span class="label">Hot</span><h1>R</h1></body></html>"#;
        let doc = Html::parse_document(html);
        assert_eq!(parse_detail(&doc, &selectors(), BASE, "r").quality, "HD");
    }

    #[test]
    fn empty_page_is_partial_result_not_error() {
        let doc = Html::parse_document("<html><body></body></html>");
        let movie = parse_detail(&doc, &selectors(), BASE, "la-la");
        assert_eq!(movie.title, "La La");
        assert_eq!(movie.description, "");
        assert_eq!(movie.year, None);
        assert!(parse_grid(&doc, &selectors(), BASE, 5).is_empty());
    }

    #[test]
    fn urls_per_page_type() -> Result<(), ScraperError> {
        let adapter = PhimmoiAdapter::new(StubFetch::new(), "https://phimmoichill.network/", 24)?;
        assert_eq!(adapter.list_url("home", 1), "https://phimmoichill.network/danh-sach/phim-le");
        assert_eq!(
            adapter.list_url("phim-bo", 3),
            "https://phimmoichill.network/danh-sach/phim-bo/page/3"
        );
        assert_eq!(
            adapter.list_url("hanh-dong", 1),
            "https://phimmoichill.network/the-loai/hanh-dong"
        );
        assert_eq!(
            adapter.search_url("cô dâu", 2),
            "https://phimmoichill.network/tim-kiem?keyword=c%C3%B4%20d%C3%A2u&page=2"
        );
        assert_eq!(adapter.detail_url("abc"), "https://phimmoichill.network/phim/abc");
        Ok(())
    }

    #[test]
    fn end_to_end_detail_through_adapter() -> Result<(), ScraperError> {
        let fetch = StubFetch::new().with("https://phimmoichill.network/phim/abc", DETAIL_PAGE);
        let adapter = PhimmoiAdapter::new(fetch, BASE, 24)?;
        let movie = adapter.fetch_detail("abc")?;
        assert_eq!(movie.description, "Một bộ phim hay.");
        assert_eq!(movie.episodes.len(), 2);
        Ok(())
    }

    #[test]
    fn end_to_end_list_applies_configured_limit() -> Result<(), ScraperError> {
        let cards: Vec<String> = (1..=5).map(|i| card(&format!("m{}", i), "M")).collect();
        let fetch = StubFetch::new().with(
            "https://phimmoichill.network/danh-sach/phim-le",
            &grid_page(&cards),
        );
        let adapter = PhimmoiAdapter::new(fetch, BASE, 3)?;
        assert_eq!(adapter.fetch_list("", 1)?.len(), 3);
        Ok(())
    }

    #[test]
    fn status_failure_aborts_call() -> Result<(), ScraperError> {
        let fetch = StubFetch::new().with_status("https://phimmoichill.network/phim/gone", 403);
        let adapter = PhimmoiAdapter::new(fetch, BASE, 24)?;
        assert_eq!(adapter.fetch_detail("gone").err().and_then(|e| e.status()), Some(403));
        Ok(())
    }

    #[test]
    fn navigation_categories_are_deduplicated() -> Result<(), ScraperError> {
        let home = r#"<html><body><nav>
            <a href="/the-loai/hanh-dong">Hành Động</a>
            <a href="/the-loai/hanh-dong">Hành Động</a>
            <a href="/the-loai/vien-tuong/">Viễn Tưởng</a>
            <a href="/quoc-gia/trung-quoc">Trung Quốc</a>
        </nav></body></html>"#;
        let fetch = StubFetch::new().with("https://phimmoichill.network/", home);
        let adapter = PhimmoiAdapter::new(fetch, BASE, 24)?;
        let genres = adapter.fetch_categories(CategoryKind::Genre)?;
        let slugs: Vec<&str> = genres.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["hanh-dong", "vien-tuong"]);
        let countries = adapter.fetch_categories(CategoryKind::Country)?;
        assert_eq!(countries[0].name, "Trung Quốc");
        Ok(())
    }
}
