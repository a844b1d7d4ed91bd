use async_trait::async_trait;
use tracing::{info, warn};

use nzn_core::{Article, Result};

use crate::scrapers::support::{self, CategoryRule};
use crate::scrapers::{feed, Scraper, SourceConfig};

/// RNZ news feed.
pub struct RnzScraper {
    config: SourceConfig,
    client: reqwest::Client,
}

const RULES: [CategoryRule; 5] = [
    CategoryRule { pattern: "/national/", category: "National" },
    CategoryRule { pattern: "/world/", category: "World" },
    CategoryRule { pattern: "/political/", category: "Politics" },
    CategoryRule { pattern: "/business/", category: "Business" },
    CategoryRule { pattern: "/sport/", category: "Sport" },
];

impl RnzScraper {
    pub fn new() -> Result<Self> {
        let config = SourceConfig::new("RNZ", "https://www.rnz.co.nz/rss/news", "News");
        let client = support::build_client(config.timeout)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl Scraper for RnzScraper {
    fn config(&self) -> &SourceConfig {
        &self.config
    }

    async fn scrape(&self) -> Result<Vec<Article>> {
        let parsed = feed::fetch_feed(&self.client, &self.config.base_url).await?;
        if parsed.entries.is_empty() {
            warn!(source = %self.config.source, "no entries found in feed");
            return Ok(Vec::new());
        }
        let articles = feed::entries_to_articles(&self.config, parsed, &RULES, |_, link| link);
        info!(source = %self.config.source, count = articles.len(), "scraped articles");
        Ok(articles)
    }
}
