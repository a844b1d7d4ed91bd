use std::fmt;

use chrono::{DateTime, Utc};
use chrono_tz::Pacific::Auckland;
use serde::{Deserialize, Serialize};

/// Sentiment classification applied during enrichment. Articles start out
/// neutral and stay neutral when every enrichment tier fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl SentimentLabel {
    /// Map a classifier label onto the wire vocabulary. Anything the model
    /// emits outside positive/negative collapses to neutral.
    pub fn from_model_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "positive" => SentimentLabel::Positive,
            "negative" => SentimentLabel::Negative,
            _ => SentimentLabel::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical normalized article record.
///
/// Created by a scraper, mutated in place by the sentiment analyzer and the
/// content extractor, serialized once for submission, then discarded. `url`
/// is the identity key within a single scrape of one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub url: String,
    pub source: String,
    pub category: String,
    pub published_date: DateTime<Utc>,
    pub content: String,
    pub sentiment_label: SentimentLabel,
    pub sentiment_score: f64,
    pub sentiment_confidence: f64,
    pub positive_words: Vec<String>,
    pub negative_words: Vec<String>,
}

impl Article {
    /// A missing publish date defaults to "now" in UTC; sentiment fields
    /// start as neutral/zero placeholders until enrichment runs.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
        category: impl Into<String>,
        published_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            url: url.into(),
            source: source.into(),
            category: category.into(),
            published_date: published_date.unwrap_or_else(Utc::now),
            content: String::new(),
            sentiment_label: SentimentLabel::default(),
            sentiment_score: 0.0,
            sentiment_confidence: 0.0,
            positive_words: Vec::new(),
            negative_words: Vec::new(),
        }
    }

    /// Serialize for API submission. The backend expects localized
    /// timestamps, so `publishedDate` is rendered in Pacific/Auckland time
    /// with its live UTC offset (+13:00 during NZDT, +12:00 during NZST).
    pub fn to_wire(&self) -> WireArticle {
        let local = self.published_date.with_timezone(&Auckland);
        WireArticle {
            title: self.title.clone(),
            description: self.description.clone(),
            url: self.url.clone(),
            source: self.source.clone(),
            category: self.category.clone(),
            published_date: local.to_rfc3339(),
            content: self.content.clone(),
            sentiment_label: self.sentiment_label,
            sentiment_score: self.sentiment_score,
            sentiment_confidence: self.sentiment_confidence,
            positive_words: self.positive_words.clone(),
            negative_words: self.negative_words.clone(),
        }
    }
}

/// The JSON shape the ingestion API accepts and returns (camelCase keys).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireArticle {
    pub title: String,
    pub description: String,
    pub url: String,
    pub source: String,
    pub category: String,
    pub published_date: String,
    pub content: String,
    pub sentiment_label: SentimentLabel,
    pub sentiment_score: f64,
    pub sentiment_confidence: f64,
    pub positive_words: Vec<String>,
    pub negative_words: Vec<String>,
}
