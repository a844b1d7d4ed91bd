//! Client for the backend ingestion API.
//!
//! Submission never raises past this crate: single submits report a bool,
//! batch submits report counts and an error list. The caller tells
//! "nothing to send", "all rejected" and "transport failed" apart purely
//! from the returned values.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use nzn_core::util::truncate_for_log;
use nzn_core::{Article, ArticleSink, BatchOutcome, Result, WireArticle};

const SINGLE_TIMEOUT: Duration = Duration::from_secs(10);
const BATCH_TIMEOUT: Duration = Duration::from_secs(30);
const LOG_BUDGET: usize = 500;

pub struct ArticleClient {
    client: reqwest::Client,
    articles_url: String,
}

impl ArticleClient {
    pub fn new(base_url: &str, articles_path: &str) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(BATCH_TIMEOUT).build()?;
        Ok(Self {
            client,
            articles_url: format!("{}{}", base_url.trim_end_matches('/'), articles_path),
        })
    }

    /// Submit one article. 200/201 means accepted, 409 means the backend
    /// already has it (not an error). Anything else is logged with the
    /// payload and response truncated to a fixed budget, then reported as
    /// `false`.
    pub async fn create_article(&self, article: &Article) -> bool {
        let payload = article.to_wire();
        let response = match self
            .client
            .post(&self.articles_url)
            .timeout(SINGLE_TIMEOUT)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(url = %self.articles_url, error = %e, "request failed while creating article");
                return false;
            }
        };

        let status = response.status();
        match status {
            StatusCode::OK | StatusCode::CREATED => {
                info!(title = %truncate_for_log(&article.title, 50), "created article");
                true
            }
            StatusCode::CONFLICT => {
                debug!(url = %article.url, "article already exists (duplicate)");
                false
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                let payload_json = serde_json::to_string(&payload).unwrap_or_default();
                error!(
                    url = %self.articles_url,
                    status = %status,
                    payload = %truncate_for_log(&payload_json, LOG_BUDGET),
                    response = %truncate_for_log(&body, LOG_BUDGET),
                    "failed to create article"
                );
                false
            }
        }
    }

    /// Submit a whole batch in one POST to the `/batch` endpoint.
    pub async fn create_articles_batch(&self, articles: &[Article]) -> BatchOutcome {
        let batch_url = format!("{}/batch", self.articles_url);
        let payload: Vec<WireArticle> = articles.iter().map(Article::to_wire).collect();

        let response = match self.client.post(&batch_url).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => {
                error!(
                    url = %batch_url,
                    count = articles.len(),
                    error = %e,
                    "request failed while submitting batch"
                );
                return BatchOutcome {
                    errors: vec![format!("request error: {e}")],
                    ..Default::default()
                };
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status != StatusCode::OK {
            error!(
                url = %batch_url,
                status = %status,
                response = %truncate_for_log(&body, LOG_BUDGET),
                "batch submission rejected"
            );
            return BatchOutcome {
                errors: vec![truncate_for_log(&body, LOG_BUDGET)],
                ..Default::default()
            };
        }

        let outcome = parse_batch_body(&body);
        info!(
            url = %batch_url,
            added = outcome.added,
            skipped = outcome.skipped,
            errors = outcome.errors.len(),
            "batch import finished"
        );
        outcome
    }

    /// Read back everything the backend holds. Used for verification, not
    /// by the scraping pipeline itself.
    pub async fn get_articles(&self) -> Result<Vec<WireArticle>> {
        let response = self
            .client
            .get(&self.articles_url)
            .timeout(SINGLE_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ArticleSink for ArticleClient {
    async fn submit_batch(&self, articles: &[Article]) -> BatchOutcome {
        self.create_articles_batch(articles).await
    }
}

/// Interpret a 200 batch response body. Malformed JSON or a non-object body
/// counts as an empty result, not a failure.
fn parse_batch_body(body: &str) -> BatchOutcome {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => BatchOutcome {
            added: map.get("added").and_then(Value::as_u64).unwrap_or(0),
            skipped: map.get("skipped").and_then(Value::as_u64).unwrap_or(0),
            errors: map
                .get("errors")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| item.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default(),
        },
        Ok(_) => {
            warn!("batch response JSON is not an object; treating as empty result");
            BatchOutcome::default()
        }
        Err(e) => {
            error!(error = %e, "invalid JSON in batch response; treating as empty result");
            BatchOutcome::default()
        }
    }
}
