mod config;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use dotenv::dotenv;
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use nzn_api::ArticleClient;
use nzn_core::{Error, Result};
use nzn_enrich::{
    ContentExtractor, DummyProvider, HuggingFaceProvider, InferenceProvider, SentimentAnalyzer,
};
use nzn_scrapers::scrapers::nz;
use nzn_scrapers::{Orchestrator, OrchestratorConfig};

use config::AppConfig;

const POLL_INTERVAL: Duration = Duration::from_secs(60);
const CONTENT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(author, version, about = "NZ news scraper orchestrator", long_about = None)]
struct Cli {
    /// Keep running on a fixed schedule instead of a single pass
    #[arg(long)]
    scheduled: bool,
    /// Override the schedule interval in minutes
    #[arg(long)]
    interval_minutes: Option<u64>,
    /// Inference backend: huggingface (default) or dummy for offline runs
    #[arg(long, default_value = "huggingface")]
    provider: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let mut app_config = AppConfig::from_env();
    if let Some(minutes) = cli.interval_minutes {
        app_config.interval_minutes = minutes;
    }

    let provider: Arc<dyn InferenceProvider> = match cli.provider.as_str() {
        "dummy" => Arc::new(DummyProvider::new()),
        "huggingface" => Arc::new(HuggingFaceProvider::new(
            &app_config.sentiment_model,
            &app_config.extraction_model,
            app_config.hf_token.clone(),
        )?),
        other => return Err(Error::Config(format!("unknown provider: {other}"))),
    };
    info!(provider = provider.name(), "inference provider initialized");

    let scrapers = nz::all_scrapers()?;
    let sources: Vec<&str> = scrapers.iter().map(|s| s.source()).collect();
    info!(count = scrapers.len(), sources = %sources.join(", "), "scrapers loaded");

    let analyzer = SentimentAnalyzer::new(provider);
    let extractor = ContentExtractor::new(CONTENT_FETCH_TIMEOUT)?;
    let sink = Arc::new(ArticleClient::new(
        &app_config.api_base_url,
        &app_config.api_articles_path,
    )?);

    let orchestrator = Orchestrator::new(
        scrapers,
        analyzer,
        extractor,
        sink,
        OrchestratorConfig {
            extract_content: app_config.extract_content,
            ..Default::default()
        },
    )?;

    if cli.scheduled {
        run_scheduled(&orchestrator, app_config.interval_minutes).await;
    } else {
        let summary = orchestrator.run_cycle().await;
        info!(
            scraped = summary.scraped,
            added = summary.added,
            skipped = summary.skipped,
            "run complete"
        );
    }

    Ok(())
}

/// Run immediately, then keep checking a coarse one-minute tick until the
/// configured interval has elapsed. Ctrl-C lands between ticks, so an
/// in-flight cycle and its batch submissions always complete before the
/// process stops.
async fn run_scheduled(orchestrator: &Orchestrator, interval_minutes: u64) {
    let interval = Duration::from_secs(interval_minutes.max(1) * 60);
    info!(interval_minutes, "running in scheduled mode");

    orchestrator.run_cycle().await;
    let mut next_run = Instant::now() + interval;

    loop {
        tokio::select! {
            _ = tokio::time::sleep(POLL_INTERVAL) => {
                if Instant::now() >= next_run {
                    orchestrator.run_cycle().await;
                    next_run = Instant::now() + interval;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received, stopping scheduler");
                break;
            }
        }
    }
}
