use async_trait::async_trait;
use feed_rs::model::Entry;
use tracing::{info, warn};

use nzn_core::{Article, Result};

use crate::scrapers::support::{self, CategoryRule};
use crate::scrapers::{feed, Scraper, SourceConfig};

/// 1News has no feed of its own, so this scraper reads a Google News query
/// feed scoped to 1news.co.nz and unwraps the aggregator's redirect links.
pub struct OneNewsScraper {
    config: SourceConfig,
    client: reqwest::Client,
}

const FEED_URL: &str =
    "https://news.google.com/rss/search?q=site:1news.co.nz&hl=en-NZ&gl=NZ&ceid=NZ:en";
const TARGET_DOMAIN: &str = "1news.co.nz";

const RULES: [CategoryRule; 4] = [
    CategoryRule { pattern: "/new-zealand/", category: "New Zealand" },
    CategoryRule { pattern: "/world/", category: "World" },
    CategoryRule { pattern: "/politics/", category: "Politics" },
    CategoryRule { pattern: "/sport/", category: "Sport" },
];

impl OneNewsScraper {
    pub fn new() -> Result<Self> {
        let config = SourceConfig::new("1News NZ", FEED_URL, "Latest");
        let client = support::build_client(config.timeout)?;
        Ok(Self { config, client })
    }
}

/// Google News links point back at the aggregator; when the entry also
/// carries a direct 1news.co.nz link, prefer it.
fn resolve_aggregator_link(entry: &Entry, link: String) -> String {
    if !link.contains("news.google.com") {
        return link;
    }
    entry
        .links
        .iter()
        .find(|l| l.href.contains(TARGET_DOMAIN))
        .map(|l| l.href.clone())
        .unwrap_or(link)
}

#[async_trait]
impl Scraper for OneNewsScraper {
    fn config(&self) -> &SourceConfig {
        &self.config
    }

    async fn scrape(&self) -> Result<Vec<Article>> {
        let parsed = feed::fetch_feed(&self.client, &self.config.base_url).await?;
        if parsed.entries.is_empty() {
            warn!(source = %self.config.source, "no entries found in feed");
            return Ok(Vec::new());
        }
        let articles =
            feed::entries_to_articles(&self.config, parsed, &RULES, resolve_aggregator_link);
        info!(source = %self.config.source, count = articles.len(), "scraped articles");
        Ok(articles)
    }
}
