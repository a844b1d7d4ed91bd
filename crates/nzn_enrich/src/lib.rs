pub mod content;
pub mod provider;
pub mod sentiment;

pub use content::ContentExtractor;
pub use provider::{Classification, DummyProvider, HuggingFaceProvider, InferenceProvider};
pub use sentiment::{SentimentAnalyzer, SentimentOptions, SentimentTerms};
