//! Syndication-feed plumbing shared by the feed-based scrapers.

use std::collections::HashSet;

use feed_rs::model::{Entry, Feed};
use nzn_core::{Article, Error, Result};

use super::support::{self, CategoryRule};
use super::SourceConfig;

pub(crate) async fn fetch_feed(client: &reqwest::Client, url: &str) -> Result<Feed> {
    let bytes = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    feed_rs::parser::parse(&bytes[..]).map_err(|e| Error::Feed(e.to_string()))
}

/// Pick the entry link the way feed readers do: a rel-less or
/// rel="alternate" link first, any non-empty link otherwise.
pub(crate) fn entry_link(entry: &Entry) -> Option<String> {
    for link in &entry.links {
        let href = link.href.trim();
        if href.is_empty() {
            continue;
        }
        let rel = link.rel.as_deref().unwrap_or("");
        if rel.is_empty() || rel.eq_ignore_ascii_case("alternate") {
            return Some(href.to_string());
        }
    }
    entry
        .links
        .iter()
        .map(|link| link.href.trim())
        .find(|href| !href.is_empty())
        .map(str::to_string)
}

/// Normalize feed entries into articles: at most `max_articles` entries in
/// feed order, entries without a usable title or link skipped, markup
/// stripped from summaries, and URLs deduplicated within the run.
/// `resolve_link` lets a source rewrite the entry link (e.g. unwrap an
/// aggregator redirect) before it becomes the article URL.
pub(crate) fn entries_to_articles<F>(
    config: &SourceConfig,
    feed: Feed,
    rules: &[CategoryRule],
    resolve_link: F,
) -> Vec<Article>
where
    F: Fn(&Entry, String) -> String,
{
    let mut articles = Vec::new();
    let mut seen = HashSet::new();

    for entry in feed.entries.into_iter().take(config.max_articles) {
        let title = entry
            .title
            .as_ref()
            .map(|t| t.content.trim().to_string())
            .unwrap_or_default();
        let Some(link) = entry_link(&entry) else {
            continue;
        };
        let url = resolve_link(&entry, link);
        if !support::is_valid_article(&title, &url) {
            continue;
        }
        if !seen.insert(url.clone()) {
            continue;
        }

        let mut description = entry
            .summary
            .as_ref()
            .map(|s| s.content.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| title.clone());
        if description.contains('<') {
            description = support::strip_html(&description);
        }

        let published = entry.published.or(entry.updated);
        let category = support::categorize(&url, rules, &config.category);
        articles.push(support::create_article(
            config,
            &title,
            &description,
            &url,
            published,
            Some(category),
        ));
    }

    articles
}
