//! New Zealand news sources.
//!
//! To add a source: implement [`Scraper`](crate::scrapers::Scraper) in a new
//! file here and register it in [`all_scrapers`].

pub mod nzherald;
pub mod onenews;
pub mod rnz;
pub mod stuff;

pub use nzherald::{LinkHeuristics, NzHeraldScraper};
pub use onenews::OneNewsScraper;
pub use rnz::RnzScraper;
pub use stuff::StuffScraper;

use nzn_core::Result;

use super::Scraper;

/// The registered scraper set, built once at startup.
pub fn all_scrapers() -> Result<Vec<Box<dyn Scraper>>> {
    Ok(vec![
        Box::new(StuffScraper::new()?),
        Box::new(RnzScraper::new()?),
        Box::new(OneNewsScraper::new()?),
        Box::new(NzHeraldScraper::new()?),
    ])
}
