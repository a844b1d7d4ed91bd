use async_trait::async_trait;

use nzn_core::{Error, Result};

use super::{Classification, InferenceProvider};

/// Offline stand-in for the remote provider. Every text classifies as
/// neutral with zero confidence and generation always fails, so enrichment
/// degrades to its documented defaults without touching the network.
#[derive(Debug, Default)]
pub struct DummyProvider;

impl DummyProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl InferenceProvider for DummyProvider {
    fn name(&self) -> &str {
        "dummy"
    }

    async fn classify(&self, _text: &str) -> Result<Vec<Classification>> {
        Ok(vec![Classification { label: "neutral".to_string(), score: 0.0 }])
    }

    async fn generate(&self, _prompt: &str, _max_new_tokens: u32) -> Result<String> {
        Err(Error::Inference("dummy provider does not generate text".to_string()))
    }
}
