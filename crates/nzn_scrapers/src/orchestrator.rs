use std::sync::Arc;

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use nzn_core::util::truncate_for_log;
use nzn_core::{Article, ArticleSink, BatchOutcome, Error, Result};
use nzn_enrich::{ContentExtractor, SentimentAnalyzer};

use crate::scrapers::Scraper;

const ERROR_SAMPLE_SIZE: usize = 5;
const ERROR_SAMPLE_BUDGET: usize = 1000;

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Fetch full article bodies for articles that arrive without content.
    pub extract_content: bool,
    /// Upper bound on concurrent enrichment calls across all sources.
    pub enrich_concurrency: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self { extract_content: true, enrich_concurrency: 8 }
    }
}

/// Aggregate counters for one scraping cycle. The only required success
/// signal of a run; everything else is diagnostic logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub scraped: u64,
    pub added: u64,
    pub skipped: u64,
}

/// Runs every registered scraper, enriches what they produce, and submits
/// one batch per source. A failing source (scrape error, empty result,
/// rejected batch) never blocks the others.
pub struct Orchestrator {
    scrapers: Vec<Box<dyn Scraper>>,
    analyzer: Arc<SentimentAnalyzer>,
    extractor: Arc<ContentExtractor>,
    sink: Arc<dyn ArticleSink>,
    semaphore: Arc<Semaphore>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        scrapers: Vec<Box<dyn Scraper>>,
        analyzer: SentimentAnalyzer,
        extractor: ContentExtractor,
        sink: Arc<dyn ArticleSink>,
        config: OrchestratorConfig,
    ) -> Result<Self> {
        if scrapers.is_empty() {
            return Err(Error::Config("no scrapers registered".to_string()));
        }
        let semaphore = Arc::new(Semaphore::new(config.enrich_concurrency.max(1)));
        Ok(Self {
            scrapers,
            analyzer: Arc::new(analyzer),
            extractor: Arc::new(extractor),
            sink,
            semaphore,
            config,
        })
    }

    /// One full pass over every source. Sources run concurrently; the
    /// summary is folded from per-source results after all of them finish,
    /// so completion order cannot affect the sums.
    pub async fn run_cycle(&self) -> RunSummary {
        info!("starting scraping cycle");

        let results =
            join_all(self.scrapers.iter().map(|scraper| self.process_source(scraper.as_ref())))
                .await;

        let mut summary = RunSummary::default();
        for (scraped, outcome) in results {
            summary.scraped += scraped;
            summary.added += outcome.added;
            summary.skipped += outcome.skipped;
        }

        info!(
            scraped = summary.scraped,
            added = summary.added,
            skipped = summary.skipped,
            "scraping cycle completed"
        );
        summary
    }

    async fn process_source(&self, scraper: &dyn Scraper) -> (u64, BatchOutcome) {
        let source = scraper.source().to_string();
        info!(source = %source, "running scraper");

        let articles = match scraper.scrape().await {
            Ok(articles) => articles,
            Err(e) => {
                error!(source = %source, error = %e, "scraper failed");
                return (0, BatchOutcome::default());
            }
        };
        if articles.is_empty() {
            warn!(source = %source, "no articles found");
            return (0, BatchOutcome::default());
        }
        let scraped = articles.len() as u64;

        let articles: Vec<Article> = stream::iter(articles)
            .map(|article| self.enrich(article))
            .buffer_unordered(self.config.enrich_concurrency.max(1))
            .collect()
            .await;

        let outcome = self.sink.submit_batch(&articles).await;
        info!(
            source = %source,
            scraped,
            added = outcome.added,
            skipped = outcome.skipped,
            "submitted batch"
        );
        if !outcome.errors.is_empty() {
            let sample = outcome
                .errors
                .iter()
                .take(ERROR_SAMPLE_SIZE)
                .cloned()
                .collect::<Vec<_>>()
                .join("; ");
            warn!(
                source = %source,
                errors = outcome.errors.len(),
                sample = %truncate_for_log(&sample, ERROR_SAMPLE_BUDGET),
                "batch reported errors"
            );
        }

        (scraped, outcome)
    }

    /// Sentiment always runs; content extraction is gated by configuration,
    /// only fills an empty content field, and swallows failures per article.
    async fn enrich(&self, mut article: Article) -> Article {
        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                error!(error = %Error::External(e.into()), "enrichment semaphore closed");
                return article;
            }
        };

        let sentiment = self.analyzer.analyze(&article.title, &article.description).await;
        article.sentiment_label = sentiment.label;
        article.sentiment_score = sentiment.score;
        article.sentiment_confidence = sentiment.confidence;
        article.positive_words = sentiment.positive_words;
        article.negative_words = sentiment.negative_words;

        if self.config.extract_content && article.content.is_empty() {
            if let Some(content) = self.extractor.extract(&article.url).await {
                article.content = content;
            }
        }

        article
    }
}
