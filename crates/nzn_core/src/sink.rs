use async_trait::async_trait;
use serde::Deserialize;

use crate::article::Article;

/// Result of one batch submission. Transport failures and rejected payloads
/// are reported through `errors`, never as an error return; callers
/// distinguish "nothing sent", "all rejected" and "transport failed" from
/// the counts and error list alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BatchOutcome {
    #[serde(default)]
    pub added: u64,
    #[serde(default)]
    pub skipped: u64,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Destination for enriched article batches. Each source's batch is one
/// call; the orchestrator folds the outcomes into its run summary.
#[async_trait]
pub trait ArticleSink: Send + Sync {
    async fn submit_batch(&self, articles: &[Article]) -> BatchOutcome;
}
