use async_trait::async_trait;
use nzn_core::Result;

pub mod dummy;
pub mod huggingface;

pub use dummy::DummyProvider;
pub use huggingface::HuggingFaceProvider;

/// One label/score pair from a text classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub score: f64,
}

/// Remote inference capability behind the sentiment analyzer. Callers treat
/// every failure as "no signal" and fall back to their defaults; errors from
/// here never cross the enrichment boundary.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Classify a piece of text. Results are ranked best-first.
    async fn classify(&self, text: &str) -> Result<Vec<Classification>>;

    /// Free-form text generation for structured extraction prompts.
    async fn generate(&self, prompt: &str, max_new_tokens: u32) -> Result<String>;
}
