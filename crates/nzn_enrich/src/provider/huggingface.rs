use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use nzn_core::{Error, Result};

use super::{Classification, InferenceProvider};

const API_BASE_URL: &str = "https://api-inference.huggingface.co/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Hosted inference API backend. Routes classification to the sentiment
/// model and generation to the extraction model.
pub struct HuggingFaceProvider {
    client: reqwest::Client,
    base_url: String,
    sentiment_model: String,
    extraction_model: String,
    token: Option<String>,
}

impl fmt::Debug for HuggingFaceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HuggingFaceProvider")
            .field("sentiment_model", &self.sentiment_model)
            .field("extraction_model", &self.extraction_model)
            .field("token", &self.token.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

impl HuggingFaceProvider {
    pub fn new(
        sentiment_model: &str,
        extraction_model: &str,
        token: Option<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
            sentiment_model: sentiment_model.to_string(),
            extraction_model: extraction_model.to_string(),
            token,
        })
    }

    async fn post(&self, model: &str, body: Value) -> Result<Value> {
        let mut request = self
            .client
            .post(format!("{}/{}", self.base_url, model))
            .json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?.error_for_status()?;
        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl InferenceProvider for HuggingFaceProvider {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn classify(&self, text: &str) -> Result<Vec<Classification>> {
        let value = self
            .post(&self.sentiment_model, json!({ "inputs": text }))
            .await?;
        Ok(parse_classifications(&value))
    }

    async fn generate(&self, prompt: &str, max_new_tokens: u32) -> Result<String> {
        let value = self
            .post(
                &self.extraction_model,
                json!({
                    "inputs": prompt,
                    "parameters": { "max_new_tokens": max_new_tokens }
                }),
            )
            .await?;
        parse_generated_text(&value)
            .ok_or_else(|| Error::Inference("no generated_text in response".to_string()))
    }
}

/// The API wraps classification output either as `[[{label, score}, ..]]`
/// or `[{label, score}, ..]` depending on the model; accept both and drop
/// anything malformed.
fn parse_classifications(value: &Value) -> Vec<Classification> {
    let list = match value.as_array() {
        Some(outer) if outer.first().map_or(false, Value::is_array) => {
            outer[0].as_array().cloned().unwrap_or_default()
        }
        Some(outer) => outer.clone(),
        None => Vec::new(),
    };

    list.iter()
        .filter_map(|item| {
            Some(Classification {
                label: item.get("label")?.as_str()?.to_string(),
                score: item.get("score")?.as_f64()?,
            })
        })
        .collect()
}

fn parse_generated_text(value: &Value) -> Option<String> {
    if let Some(text) = value
        .as_array()
        .and_then(|arr| arr.first())
        .and_then(|item| item.get("generated_text"))
        .and_then(Value::as_str)
    {
        return Some(text.to_string());
    }
    value
        .get("generated_text")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_classification_output() {
        let value: Value = serde_json::from_str(
            r#"[[{"label": "positive", "score": 0.98}, {"label": "neutral", "score": 0.01}]]"#,
        )
        .unwrap();
        let parsed = parse_classifications(&value);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].label, "positive");
        assert!((parsed[0].score - 0.98).abs() < 1e-9);
    }

    #[test]
    fn parses_flat_classification_output() {
        let value: Value =
            serde_json::from_str(r#"[{"label": "negative", "score": 0.7}]"#).unwrap();
        let parsed = parse_classifications(&value);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].label, "negative");
    }

    #[test]
    fn malformed_classification_entries_are_dropped() {
        let value: Value = serde_json::from_str(
            r#"[{"label": "positive", "score": 0.5}, {"score": 0.4}, {"label": 3, "score": "x"}]"#,
        )
        .unwrap();
        assert_eq!(parse_classifications(&value).len(), 1);
        assert_eq!(parse_classifications(&json!({"error": "loading"})), vec![]);
    }

    #[test]
    fn generated_text_is_unwrapped_from_either_shape() {
        let wrapped: Value =
            serde_json::from_str(r#"[{"generated_text": "{\"positive_words\": []}"}]"#).unwrap();
        assert_eq!(
            parse_generated_text(&wrapped).unwrap(),
            "{\"positive_words\": []}"
        );

        let bare = json!({"generated_text": "hello"});
        assert_eq!(parse_generated_text(&bare).unwrap(), "hello");

        assert!(parse_generated_text(&json!({"error": "busy"})).is_none());
    }
}
