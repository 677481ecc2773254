//! Text heuristics shared by all adapters: URL anchoring, episode ordinals,
//! episode de-duplication, running time, and slug helpers.

use crate::model::Episode;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").unwrap());

/// `<word> <n>` episode labels. Tokens cover Vietnamese (with and without
/// diacritics) and English.
static EPISODE_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(?:tập|tap|episode|ep)\.?\s*(\d+)").unwrap());

static EPISODE_HREF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"tap-(\d+)").unwrap());

static HOURS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\d+)\s*(?:h|giờ|gio)").unwrap());

static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").unwrap());

static PAREN_YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((\d{4})\)").unwrap());

static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/phim/([^/?#]+)").unwrap());

static CSS_URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"url\(([^)]+)\)").unwrap());

/// Anchor a URL fragment at `base`.
///
/// Empty stays empty, `//host/..` gets `https:`, `/path` gets `base`, anything
/// with a scheme is returned unchanged, a bare relative path is joined under
/// `base`. Idempotent: the output always has a scheme or is empty.
pub fn normalize_url(raw: &str, base: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    if SCHEME_RE.is_match(raw) {
        return raw.to_string();
    }
    if let Some(rest) = raw.strip_prefix("//") {
        return format!("https://{}", rest);
    }
    let base = base.trim_end_matches('/');
    if raw.starts_with('/') {
        format!("{}{}", base, raw)
    } else {
        format!("{}/{}", base, raw)
    }
}

/// Image fields from the JSON API: bare file names live under `image_prefix`,
/// root-relative paths under the image host's origin.
pub fn normalize_image_url(raw: &str, image_prefix: &str, image_origin: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('/') || SCHEME_RE.is_match(raw) {
        return normalize_url(raw, image_origin);
    }
    normalize_url(raw, image_prefix)
}

/// Ordinal for an upstream episode label.
///
/// 1. the whole label is a positive integer ("12")
/// 2. a locale word followed by digits ("Tập 5", "Tap 5", "Episode 07")
/// 3. otherwise 1, the single-episode convention ("Full", "Tap Full")
pub fn resolve_episode_number(label: &str) -> u32 {
    if let Ok(n) = label.trim().parse::<u32>() {
        if n > 0 {
            return n;
        }
    }
    if let Some(n) = EPISODE_WORD_RE
        .captures(label)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|n| *n > 0)
    {
        return n;
    }
    tracing::debug!(label, "no ordinal in episode label, defaulting to 1");
    1
}

/// Ordinal from an episode page href (`.../tap-7`). HTML labels are not trusted.
pub fn episode_number_from_href(href: &str) -> Option<u32> {
    EPISODE_HREF_RE
        .captures(href)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|n| *n > 0)
}

/// Keep the first episode seen for each number, in first-seen order.
pub fn dedupe_episodes(episodes: impl IntoIterator<Item = Episode>) -> Vec<Episode> {
    let mut seen = HashSet::new();
    episodes
        .into_iter()
        .filter(|ep| seen.insert(ep.number))
        .collect()
}

/// De-duplicate then sort ascending by number. Sort is stable.
pub fn finalize_episodes(episodes: impl IntoIterator<Item = Episode>) -> Vec<Episode> {
    let mut unique = dedupe_episodes(episodes);
    unique.sort_by_key(|ep| ep.number);
    unique
}

/// Minutes from a running-time label ("90 phút", "45 phút/tập", "1h 30m", "2 giờ").
pub fn parse_duration_minutes(raw: &str) -> Option<u32> {
    let minutes = if let Some(caps) = HOURS_RE.captures(raw) {
        let hours: u32 = caps.get(1)?.as_str().parse().ok()?;
        let rest = &raw[caps.get(0)?.end()..];
        let extra = DIGITS_RE
            .find(rest)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(0);
        hours.checked_mul(60)?.checked_add(extra)?
    } else {
        DIGITS_RE.find(raw)?.as_str().parse().ok()?
    };
    (minutes > 0).then_some(minutes)
}

/// First four-digit run in `text`.
pub fn first_year(text: &str) -> Option<u32> {
    YEAR_RE
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
        .filter(|y| *y > 0)
}

/// Year written as "(2021)" inside a subtitle.
pub fn parenthesized_year(text: &str) -> Option<u32> {
    PAREN_YEAR_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Slug from a detail link: `/phim/<slug>`, else the last path segment.
pub fn slug_from_href(href: &str) -> Option<String> {
    if let Some(slug) = SLUG_RE.captures(href).and_then(|c| c.get(1)) {
        return Some(slug.as_str().to_string());
    }
    let path = href.split(['?', '#']).next().unwrap_or_default();
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty() && !s.contains(':'))
        .map(String::from)
}

/// "cuoc-chien-thuong-luu" -> "Cuoc Chien Thuong Luu".
pub fn title_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Image URL inside a `background-image: url(...)` style attribute.
pub fn url_from_style(style: &str) -> Option<String> {
    CSS_URL_RE
        .captures(style)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().trim_matches(|c| c == '\'' || c == '"').to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ep(number: u32, title: &str) -> Episode {
        Episode {
            number,
            title: title.to_string(),
            url: format!("https://cdn.example/{}/{}.m3u8", number, title),
        }
    }

    #[test]
    fn normalize_url_forms() {
        let base = "https://base.example";
        assert_eq!(
            normalize_url("//img.example.com/a.jpg", base),
            "https://img.example.com/a.jpg"
        );
        assert_eq!(normalize_url("/p/x", base), "https://base.example/p/x");
        assert_eq!(normalize_url("/p/x", "https://base.example/"), "https://base.example/p/x");
        assert_eq!(normalize_url("", base), "");
        assert_eq!(normalize_url("   ", base), "");
        assert_eq!(
            normalize_url("http://other.example/a", base),
            "http://other.example/a"
        );
        assert_eq!(normalize_url("a.jpg", base), "https://base.example/a.jpg");
        for opaque in [
            "data:image/gif;base64,R0lGODlh",
            "mailto:admin@example.com",
            "javascript:void(0)",
        ] {
            assert_eq!(normalize_url(opaque, base), opaque);
        }
    }

    #[test]
    fn normalize_url_is_idempotent() {
        let base = "https://base.example";
        for raw in [
            "",
            "//img.example.com/a.jpg",
            "/p/x",
            "https://x.example/y?z=1",
            "relative/path.png",
            "  /spaced ",
            "data:image/gif;base64,R0lGODlh",
            "mailto:admin@example.com",
            "javascript:void(0)",
        ] {
            let once = normalize_url(raw, base);
            assert_eq!(normalize_url(&once, base), once, "input {:?}", raw);
        }
    }

    #[test]
    fn normalize_image_url_uses_prefix_for_bare_names() {
        let prefix = "https://img.ophim1.com/uploads/movies/";
        let origin = "https://img.ophim1.com";
        assert_eq!(
            normalize_image_url("abc-thumb.jpg", prefix, origin),
            "https://img.ophim1.com/uploads/movies/abc-thumb.jpg"
        );
        assert_eq!(
            normalize_image_url("/uploads/movies/abc.jpg", prefix, origin),
            "https://img.ophim1.com/uploads/movies/abc.jpg"
        );
        assert_eq!(
            normalize_image_url("https://cdn.example/p.jpg", prefix, origin),
            "https://cdn.example/p.jpg"
        );
        assert_eq!(normalize_image_url("", prefix, origin), "");
    }

    #[test]
    fn episode_label_heuristics() {
        assert_eq!(resolve_episode_number("12"), 12);
        assert_eq!(resolve_episode_number("Tap 5"), 5);
        assert_eq!(resolve_episode_number("Tập 3"), 3);
        assert_eq!(resolve_episode_number("TẬP 4"), 4);
        assert_eq!(resolve_episode_number("Full"), 1);
        assert_eq!(resolve_episode_number("Tap Full"), 1);
        assert_eq!(resolve_episode_number("Episode 07"), 7);
        assert_eq!(resolve_episode_number(" 08 "), 8);
        assert_eq!(resolve_episode_number("0"), 1);
        assert_eq!(resolve_episode_number(""), 1);
    }

    #[test]
    fn partial_numeric_label_is_not_read_by_whole_string_step() {
        // "5 Tap" is not a whole integer and does not start with a word token.
        assert_eq!(resolve_episode_number("5 Tap"), 1);
    }

    #[test]
    fn href_ordinal() {
        assert_eq!(
            episode_number_from_href("https://site.example/xem-phim/abc/tap-12"),
            Some(12)
        );
        assert_eq!(episode_number_from_href("/xem-phim/abc/full"), None);
        assert_eq!(episode_number_from_href("/xem-phim/abc/tap-0"), None);
    }

    #[test]
    fn dedupe_keeps_first_occurrence_in_order() {
        let input = vec![ep(1, "a"), ep(2, "b"), ep(2, "c"), ep(3, "d"), ep(1, "e")];
        let out = dedupe_episodes(input);
        let numbers: Vec<u32> = out.iter().map(|e| e.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(out[0].title, "a");
        assert_eq!(out[1].title, "b");
    }

    #[test]
    fn finalize_sorts_after_dedupe() {
        let out = finalize_episodes(vec![ep(3, "x"), ep(1, "y"), ep(3, "z"), ep(2, "w")]);
        let titles: Vec<&str> = out.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["y", "w", "x"]);
    }

    #[test]
    fn duration_labels() {
        assert_eq!(parse_duration_minutes("90 phút"), Some(90));
        assert_eq!(parse_duration_minutes("90 phut"), Some(90));
        assert_eq!(parse_duration_minutes("45 phút/tập"), Some(45));
        assert_eq!(parse_duration_minutes("1h 30m"), Some(90));
        assert_eq!(parse_duration_minutes("2 giờ"), Some(120));
        assert_eq!(parse_duration_minutes("N/A"), None);
        assert_eq!(parse_duration_minutes(""), None);
    }

    #[test]
    fn year_helpers() {
        assert_eq!(first_year("Năm phát hành: 2021"), Some(2021));
        assert_eq!(first_year("Year: unknown"), None);
        assert_eq!(parenthesized_year("The War (2019)"), Some(2019));
        assert_eq!(parenthesized_year("The War"), None);
    }

    #[test]
    fn slug_helpers() {
        assert_eq!(
            slug_from_href("https://site.example/phim/cuoc-chien?ref=home"),
            Some("cuoc-chien".to_string())
        );
        assert_eq!(
            slug_from_href("/info/cuoc-chien/"),
            Some("cuoc-chien".to_string())
        );
        assert_eq!(slug_from_href(""), None);
        assert_eq!(title_from_slug("cuoc-chien-thuong-luu"), "Cuoc Chien Thuong Luu");
    }

    #[test]
    fn style_url_extraction() {
        assert_eq!(
            url_from_style("background-image: url('//img.example/a.jpg');"),
            Some("//img.example/a.jpg".to_string())
        );
        assert_eq!(
            url_from_style("background: url(\"/a.png\")"),
            Some("/a.png".to_string())
        );
        assert_eq!(url_from_style("color: red"), None);
    }
}
