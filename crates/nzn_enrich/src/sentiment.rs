use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use nzn_core::SentimentLabel;

use crate::provider::InferenceProvider;

/// Words that carry no sentiment signal on their own; skipped when picking
/// candidate words for the per-word fallback.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "that", "with", "this", "from", "have", "has", "had", "were", "was",
    "are", "is", "but", "not", "you", "your", "their", "they", "them", "our", "ours", "its",
    "his", "her", "him", "she", "who", "what", "when", "where", "why", "how", "after", "before",
    "into", "onto", "over", "under", "about", "between", "against", "during", "while", "would",
    "could", "should", "will", "just", "than", "then", "there", "here", "also", "more", "most",
    "some", "such", "only", "very", "much", "many", "few", "all", "any", "each", "both", "news",
    "said", "says", "say", "new", "report", "reports", "today", "yesterday", "tomorrow",
    "committee",
];

const WORD_PATTERN: &str = r"[a-zA-Z][a-zA-Z'-]{2,}";

/// Tuning knobs for the cascade. The defaults come from the behaviour the
/// backend was calibrated against; override at construction if a different
/// model needs different cut-offs.
#[derive(Debug, Clone)]
pub struct SentimentOptions {
    /// Minimum classifier confidence for a word to count in the fallback.
    pub word_confidence_threshold: f64,
    /// Cap on each returned term list.
    pub max_terms: usize,
    /// Cap on candidate words sent through the fallback classifier.
    pub max_candidates: usize,
    /// Token budget for the structured-extraction generation call.
    pub max_new_tokens: u32,
}

impl Default for SentimentOptions {
    fn default() -> Self {
        Self {
            word_confidence_threshold: 0.6,
            max_terms: 8,
            max_candidates: 30,
            max_new_tokens: 180,
        }
    }
}

/// Output of one analysis. Defaults are the "no signal" answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SentimentTerms {
    pub label: SentimentLabel,
    pub score: f64,
    pub confidence: f64,
    pub positive_words: Vec<String>,
    pub negative_words: Vec<String>,
}

/// Three-tier best-effort enrichment: classify the whole text, ask a
/// generative model for structured term lists, and only if that yields
/// nothing classify individual words. No tier ever propagates an error.
pub struct SentimentAnalyzer {
    provider: Arc<dyn InferenceProvider>,
    options: SentimentOptions,
    word_pattern: Regex,
}

impl SentimentAnalyzer {
    pub fn new(provider: Arc<dyn InferenceProvider>) -> Self {
        Self::with_options(provider, SentimentOptions::default())
    }

    pub fn with_options(provider: Arc<dyn InferenceProvider>, options: SentimentOptions) -> Self {
        Self {
            provider,
            options,
            word_pattern: Regex::new(WORD_PATTERN).unwrap(),
        }
    }

    pub async fn analyze(&self, title: &str, description: &str) -> SentimentTerms {
        let text = format!("{} {}", title.trim(), description.trim())
            .trim()
            .to_string();
        if text.is_empty() {
            return SentimentTerms::default();
        }

        let mut terms = SentimentTerms::default();

        match self.provider.classify(&text).await {
            Ok(ranked) => {
                if let Some(top) = ranked.first() {
                    terms.label = SentimentLabel::from_model_label(&top.label);
                    terms.score = top.score;
                    terms.confidence = top.score;
                }
            }
            Err(e) => {
                debug!(error = %e, "sentiment classification failed, keeping neutral defaults")
            }
        }

        let (positive, negative) = self.extract_terms(&text).await;
        if positive.is_empty() && negative.is_empty() {
            let (positive, negative) = self.classify_candidate_words(&text).await;
            terms.positive_words = positive;
            terms.negative_words = negative;
        } else {
            terms.positive_words = positive;
            terms.negative_words = negative;
        }

        terms
    }

    /// Tier two: prompt the generative model for strict JSON term lists and
    /// parse whatever object can be scavenged from its output.
    async fn extract_terms(&self, text: &str) -> (Vec<String>, Vec<String>) {
        let prompt = format!(
            "Extract sentiment-bearing words from this news text.\n\
             Return STRICT JSON only with keys: positive_words, negative_words.\n\
             Each value must be an array of unique lowercase words.\n\n\
             TEXT: {text}"
        );

        let generated = match self
            .provider
            .generate(&prompt, self.options.max_new_tokens)
            .await
        {
            Ok(generated) => generated,
            Err(e) => {
                debug!(error = %e, "structured term extraction failed");
                return (Vec::new(), Vec::new());
            }
        };

        let Some(data) = extract_json_object(&generated) else {
            return (Vec::new(), Vec::new());
        };
        (self.term_list(&data, "positive_words"), self.term_list(&data, "negative_words"))
    }

    fn term_list(&self, data: &Value, key: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut terms = Vec::new();
        let Some(items) = data.get(key).and_then(Value::as_array) else {
            return terms;
        };
        for item in items {
            let Some(word) = item.as_str() else { continue };
            let word = word.trim().to_lowercase();
            if word.is_empty() || !seen.insert(word.clone()) {
                continue;
            }
            terms.push(word);
            if terms.len() >= self.options.max_terms {
                break;
            }
        }
        terms
    }

    fn candidate_words(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let mut seen = HashSet::new();
        let mut words = Vec::new();
        for found in self.word_pattern.find_iter(&lowered) {
            let token = found.as_str();
            if STOP_WORDS.contains(&token) || !seen.insert(token.to_string()) {
                continue;
            }
            words.push(token.to_string());
            if words.len() >= self.options.max_candidates {
                break;
            }
        }
        words
    }

    /// Tier three: run each candidate word through the classifier, keep
    /// confident positives/negatives ranked by confidence.
    async fn classify_candidate_words(&self, text: &str) -> (Vec<String>, Vec<String>) {
        let mut positive: Vec<(f64, String)> = Vec::new();
        let mut negative: Vec<(f64, String)> = Vec::new();

        for word in self.candidate_words(text) {
            let ranked = match self.provider.classify(&word).await {
                Ok(ranked) => ranked,
                Err(_) => continue,
            };
            let Some(top) = ranked.first() else { continue };
            if top.score < self.options.word_confidence_threshold {
                continue;
            }
            match SentimentLabel::from_model_label(&top.label) {
                SentimentLabel::Positive => positive.push((top.score, word)),
                SentimentLabel::Negative => negative.push((top.score, word)),
                SentimentLabel::Neutral => {}
            }
        }

        (self.ranked_terms(positive), self.ranked_terms(negative))
    }

    fn ranked_terms(&self, mut scored: Vec<(f64, String)>) -> Vec<String> {
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        scored
            .into_iter()
            .take(self.options.max_terms)
            .map(|(_, word)| word)
            .collect()
    }
}

/// Scavenge the first JSON object out of free-form model output by matching
/// braces from the first `{`.
fn extract_json_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    for (offset, c) in text[start..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return serde_json::from_str(&text[start..start + offset + 1]).ok();
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nzn_core::{Error, Result};
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::provider::Classification;

    /// Scripted provider: per-word answers, a full-text answer, optional
    /// generation output, and a record of every classify call.
    #[derive(Default)]
    struct ScriptedProvider {
        full_text: Option<Classification>,
        words: HashMap<String, Classification>,
        generated: Option<String>,
        classify_calls: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn classification(label: &str, score: f64) -> Classification {
            Classification { label: label.to_string(), score }
        }
    }

    #[async_trait]
    impl InferenceProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn classify(&self, text: &str) -> Result<Vec<Classification>> {
            self.classify_calls.lock().unwrap().push(text.to_string());
            if let Some(hit) = self.words.get(text) {
                return Ok(vec![hit.clone()]);
            }
            match &self.full_text {
                Some(c) => Ok(vec![c.clone()]),
                None => Err(Error::Inference("scripted classify failure".to_string())),
            }
        }

        async fn generate(&self, _prompt: &str, _max_new_tokens: u32) -> Result<String> {
            match &self.generated {
                Some(g) => Ok(g.clone()),
                None => Err(Error::Inference("scripted generate failure".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn total_provider_failure_yields_neutral_defaults() {
        let analyzer = SentimentAnalyzer::new(Arc::new(ScriptedProvider::default()));
        let terms = analyzer.analyze("Bank collapses", "after fraud inquiry").await;
        assert_eq!(terms, SentimentTerms::default());
    }

    #[tokio::test]
    async fn empty_text_short_circuits_without_calls() {
        let provider = Arc::new(ScriptedProvider::default());
        let analyzer = SentimentAnalyzer::new(provider.clone());
        let terms = analyzer.analyze("   ", "").await;
        assert_eq!(terms, SentimentTerms::default());
        assert!(provider.classify_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn structured_extraction_wins_without_per_word_fallback() {
        let provider = Arc::new(ScriptedProvider {
            full_text: Some(ScriptedProvider::classification("positive", 0.98)),
            generated: Some(
                r#"Sure, here it is: {"positive_words": ["Growth", "record", "growth"], "negative_words": []}"#
                    .to_string(),
            ),
            ..Default::default()
        });
        let analyzer = SentimentAnalyzer::new(provider.clone());

        let terms = analyzer
            .analyze("Tech company reports strong growth", "record high revenue")
            .await;

        assert_eq!(terms.label, SentimentLabel::Positive);
        assert!((terms.score - 0.98).abs() < 1e-9);
        assert!((terms.confidence - 0.98).abs() < 1e-9);
        assert_eq!(terms.positive_words, vec!["growth", "record"]);
        assert!(terms.negative_words.is_empty());
        // Only the full-text classification ran; no per-word calls.
        assert_eq!(provider.classify_calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn per_word_fallback_ranks_and_filters_by_confidence() {
        let mut words = HashMap::new();
        words.insert("record".to_string(), ScriptedProvider::classification("positive", 0.7));
        words.insert("growth".to_string(), ScriptedProvider::classification("positive", 0.9));
        words.insert("crash".to_string(), ScriptedProvider::classification("negative", 0.95));
        words.insert("slump".to_string(), ScriptedProvider::classification("negative", 0.55));
        let provider = Arc::new(ScriptedProvider {
            full_text: Some(ScriptedProvider::classification("neutral", 0.9)),
            words,
            generated: None,
            ..Default::default()
        });
        let analyzer = SentimentAnalyzer::new(provider);

        let terms = analyzer
            .analyze("Growth and record profits", "despite crash slump fears")
            .await;

        assert_eq!(terms.positive_words, vec!["growth", "record"]);
        assert_eq!(terms.negative_words, vec!["crash"]);
    }

    #[tokio::test]
    async fn term_lists_respect_the_configured_cap() {
        let provider = Arc::new(ScriptedProvider {
            full_text: Some(ScriptedProvider::classification("positive", 0.9)),
            generated: Some(
                r#"{"positive_words": ["one", "two", "three"], "negative_words": []}"#.to_string(),
            ),
            ..Default::default()
        });
        let analyzer = SentimentAnalyzer::with_options(
            provider,
            SentimentOptions { max_terms: 2, ..Default::default() },
        );

        let terms = analyzer.analyze("Some headline", "some description").await;
        assert_eq!(terms.positive_words, vec!["one", "two"]);
    }

    #[test]
    fn candidate_words_skip_stop_words_and_dedupe() {
        let analyzer = SentimentAnalyzer::new(Arc::new(ScriptedProvider::default()));
        let words =
            analyzer.candidate_words("The growth and the growth of committee business");
        assert_eq!(words, vec!["growth", "business"]);
    }

    #[test]
    fn candidate_words_are_capped() {
        let analyzer = SentimentAnalyzer::with_options(
            Arc::new(ScriptedProvider::default()),
            SentimentOptions { max_candidates: 3, ..Default::default() },
        );
        let words = analyzer.candidate_words("alpha bravo charlie delta echo foxtrot");
        assert_eq!(words.len(), 3);
    }

    #[test]
    fn json_objects_are_scavenged_from_prose() {
        let value = extract_json_object(r#"text before {"a": {"b": 1}} text after"#).unwrap();
        assert_eq!(value["a"]["b"], 1);

        assert!(extract_json_object("no json here").is_none());
        assert!(extract_json_object("{\"unterminated\": ").is_none());
    }
}
