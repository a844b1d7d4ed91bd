//! Helpers shared by every scraper implementation.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use scraper::Html;

use nzn_core::{Article, Error, Result};

use super::SourceConfig;

/// Build an article from raw extracted fields, trimming text and filling
/// source/category defaults from the scraper's configuration.
pub fn create_article(
    config: &SourceConfig,
    title: &str,
    description: &str,
    url: &str,
    published_date: Option<DateTime<Utc>>,
    category: Option<String>,
) -> Article {
    Article::new(
        title.trim(),
        description.trim(),
        url,
        config.source.clone(),
        category.unwrap_or_else(|| config.category.clone()),
        published_date,
    )
}

/// Minimum bar every scraper applies before emitting an article.
pub fn is_valid_article(title: &str, url: &str) -> bool {
    !title.trim().is_empty() && !url.trim().is_empty()
}

/// Parse a date string into a UTC instant. Accepts RFC 3339 (including a
/// literal `Z` suffix), RFC 2822 feed dates, and naive ISO timestamps which
/// are assumed UTC. Returns `None` rather than erroring; a missing date is
/// filled with "now" at article construction.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    None
}

/// Reduce an HTML fragment (a feed summary, usually) to its visible text
/// with whitespace collapsed.
pub fn strip_html(fragment: &str) -> String {
    let html = Html::parse_fragment(fragment);
    let text = html.root_element().text().collect::<Vec<_>>().join(" ");
    collapse_ws(&text)
}

/// One URL-path classification rule. Tables are per-source data, ordered by
/// the source's own conventions.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub pattern: &'static str,
    pub category: &'static str,
}

/// First matching rule wins; no match keeps the default.
pub fn categorize(url: &str, rules: &[CategoryRule], default: &str) -> String {
    let url = url.to_lowercase();
    rules
        .iter()
        .find(|rule| url.contains(rule.pattern))
        .map(|rule| rule.category.to_string())
        .unwrap_or_else(|| default.to_string())
}

/// Longest matching rule wins, so `/sport/rugby/` beats `/sport/`.
pub fn categorize_longest(url: &str, rules: &[CategoryRule], default: &str) -> String {
    let url = url.to_lowercase();
    rules
        .iter()
        .filter(|rule| url.contains(rule.pattern))
        .max_by_key(|rule| rule.pattern.len())
        .map(|rule| rule.category.to_string())
        .unwrap_or_else(|| default.to_string())
}

pub(crate) fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

pub(crate) fn build_client(timeout: std::time::Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: [CategoryRule; 3] = [
        CategoryRule { pattern: "/sport/", category: "Sport" },
        CategoryRule { pattern: "/sport/rugby/", category: "Rugby" },
        CategoryRule { pattern: "/world/", category: "World" },
    ];

    #[test]
    fn valid_article_requires_trimmed_title_and_url() {
        assert!(is_valid_article("Title", "https://example.co.nz/a"));
        assert!(!is_valid_article("", "https://example.co.nz/a"));
        assert!(!is_valid_article("   ", "https://example.co.nz/a"));
        assert!(!is_valid_article("Title", ""));
        assert!(!is_valid_article("Title", "  \t "));
        assert!(!is_valid_article("", ""));
    }

    #[test]
    fn parse_date_accepts_zulu_suffix() {
        let parsed = parse_date("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn parse_date_accepts_rfc2822_feed_dates() {
        let parsed = parse_date("Mon, 01 Jan 2024 12:30:00 GMT").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-01-01T12:30:00+00:00");
    }

    #[test]
    fn parse_date_assumes_utc_for_naive_timestamps() {
        let parsed = parse_date("2024-01-01T05:00:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-01-01T05:00:00+00:00");
    }

    #[test]
    fn parse_date_swallows_garbage() {
        assert!(parse_date("not a date").is_none());
        assert!(parse_date("").is_none());
        assert!(parse_date("  ").is_none());
    }

    #[test]
    fn strip_html_keeps_visible_text_only() {
        assert_eq!(
            strip_html("<p>Rich <b>text</b>   summary</p>"),
            "Rich text summary"
        );
        assert_eq!(strip_html("plain text"), "plain text");
    }

    #[test]
    fn categorize_takes_first_match() {
        assert_eq!(
            categorize("https://x.co.nz/sport/rugby/match", &RULES, "General"),
            "Sport"
        );
        assert_eq!(
            categorize("https://x.co.nz/world/story", &RULES, "General"),
            "World"
        );
        assert_eq!(categorize("https://x.co.nz/other", &RULES, "General"), "General");
    }

    #[test]
    fn categorize_longest_prefers_specific_rules() {
        assert_eq!(
            categorize_longest("https://x.co.nz/sport/rugby/match", &RULES, "General"),
            "Rugby"
        );
        assert_eq!(
            categorize_longest("https://x.co.nz/sport/cricket", &RULES, "General"),
            "Sport"
        );
    }

    #[test]
    fn create_article_trims_and_fills_defaults() {
        let config = SourceConfig::new("Test", "https://example.co.nz/rss", "General");
        let article = create_article(
            &config,
            "  Title  ",
            " Description ",
            "https://example.co.nz/a",
            None,
            None,
        );
        assert_eq!(article.title, "Title");
        assert_eq!(article.description, "Description");
        assert_eq!(article.source, "Test");
        assert_eq!(article.category, "General");

        let categorized = create_article(
            &config,
            "Title",
            "Description",
            "https://example.co.nz/a",
            None,
            Some("Sport".to_string()),
        );
        assert_eq!(categorized.category, "Sport");
    }
}
