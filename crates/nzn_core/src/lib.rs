pub mod article;
pub mod error;
pub mod sink;
pub mod util;

pub use article::{Article, SentimentLabel, WireArticle};
pub use error::{Error, Result};
pub use sink::{ArticleSink, BatchOutcome};
