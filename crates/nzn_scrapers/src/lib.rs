pub mod orchestrator;
pub mod scrapers;

pub use orchestrator::{Orchestrator, OrchestratorConfig, RunSummary};
pub use scrapers::{Scraper, SourceConfig};
