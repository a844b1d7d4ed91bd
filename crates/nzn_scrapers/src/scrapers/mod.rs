use std::time::Duration;

use async_trait::async_trait;
use nzn_core::{Article, Result};

pub(crate) mod feed;
pub mod nz;
pub mod support;

/// Configuration every scraper carries, whatever its extraction strategy.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Name of the news source (e.g. "RNZ").
    pub source: String,
    /// Feed URL or listing page for the source.
    pub base_url: String,
    /// Default category when no URL rule matches.
    pub category: String,
    /// Cap on articles returned per run.
    pub max_articles: usize,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl SourceConfig {
    pub fn new(source: &str, base_url: &str, category: &str) -> Self {
        Self {
            source: source.to_string(),
            base_url: base_url.to_string(),
            category: category.to_string(),
            max_articles: 20,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_max_articles(mut self, max_articles: usize) -> Self {
        self.max_articles = max_articles;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A source-specific extractor producing normalized articles.
///
/// Implementations may return an error on total failure (network down, feed
/// unparsable); the orchestrator logs it and continues with the remaining
/// sources. An empty result is a soft warning, not an error.
#[async_trait]
pub trait Scraper: Send + Sync {
    fn config(&self) -> &SourceConfig;

    fn source(&self) -> &str {
        &self.config().source
    }

    async fn scrape(&self) -> Result<Vec<Article>>;
}
