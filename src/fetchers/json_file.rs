use log::info;
use std::path::{Path, PathBuf};

use crate::domain::ScrapedResults;
use crate::errors::{SupplyError, with_parse_context};
use crate::fetchers::ResultsSupplier;

/// Reads a `ScrapedResults` document from disk.
///
/// With a fixed path the link is ignored, which is how the fallback dataset
/// is served when the results site is down.
pub struct JsonFileSupplier {
    fixed_path: Option<PathBuf>,
}

impl JsonFileSupplier {
    /// Treat every link as a path to a JSON file
    pub fn new() -> Self {
        Self { fixed_path: None }
    }

    /// Always serve the same file, whatever the link
    pub fn fixed<P: AsRef<Path>>(path: P) -> Self {
        Self {
            fixed_path: Some(path.as_ref().to_path_buf()),
        }
    }

    fn resolve(&self, link: &str) -> Result<PathBuf, SupplyError> {
        match &self.fixed_path {
            Some(path) => Ok(path.clone()),
            None if link.trim().is_empty() => Err(SupplyError::InvalidLink(link.to_string())),
            None => Ok(PathBuf::from(link.trim())),
        }
    }
}

impl Default for JsonFileSupplier {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultsSupplier for JsonFileSupplier {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn fetch(&self, link: &str) -> Result<ScrapedResults, SupplyError> {
        let path = self.resolve(link)?;

        let json = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| SupplyError::UpstreamUnavailable(format!("{}: {}", path.display(), e)))?;
        let scraped: ScrapedResults = with_parse_context(serde_json::from_str(&json), "results file")
            .map_err(|e| SupplyError::Malformed(format!("{:#}", e)))?;

        if scraped.results.is_empty() {
            return Err(SupplyError::NoResults(path.display().to_string()));
        }

        info!(
            "Loaded {} results for {} from {}",
            scraped.results.len(),
            scraped.swimmer.name,
            path.display()
        );
        Ok(scraped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SAMPLE: &str = r#"{
        "swimmer": {"name": "Jane Doe", "age": 31},
        "results": [
            {"event": "50 Free", "time": "25.10", "date": "2024-02-18", "meet": "Viking", "courseType": "SCY", "place": 2}
        ]
    }"#;

    #[tokio::test]
    async fn test_reads_results_from_link_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jane.json");
        fs::write(&path, SAMPLE).unwrap();

        let scraped = JsonFileSupplier::new().fetch(path.to_str().unwrap()).await.unwrap();

        assert_eq!(scraped.swimmer.name, "Jane Doe");
        assert_eq!(scraped.results.len(), 1);
        assert_eq!(scraped.results[0].place, Some(2));
    }

    #[tokio::test]
    async fn test_fixed_path_ignores_link() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fallback.json");
        fs::write(&path, SAMPLE).unwrap();

        let scraped = JsonFileSupplier::fixed(&path).fetch("AB12C").await.unwrap();

        assert_eq!(scraped.swimmer.age, Some(31));
    }

    #[tokio::test]
    async fn test_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.json");
        fs::write(&broken, "[1, 2").unwrap();

        let missing = JsonFileSupplier::new()
            .fetch(dir.path().join("nope.json").to_str().unwrap())
            .await;
        let malformed = JsonFileSupplier::new().fetch(broken.to_str().unwrap()).await;

        assert!(matches!(missing, Err(SupplyError::UpstreamUnavailable(_))));
        assert!(matches!(malformed, Err(SupplyError::Malformed(_))));
        assert!(matches!(
            JsonFileSupplier::new().fetch("  ").await,
            Err(SupplyError::InvalidLink(_))
        ));
    }
}
