pub mod json_file;
pub mod usms_scraper;

pub use json_file::JsonFileSupplier;
pub use usms_scraper::{UsmsPageParser, UsmsScraper};

use crate::domain::ScrapedResults;
use crate::errors::SupplyError;

/// Anything that can turn a swimmer link into a list of race results
#[allow(async_fn_in_trait)]
pub trait ResultsSupplier {
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn fetch(&self, link: &str) -> Result<ScrapedResults, SupplyError>;
}
