use anyhow::Result;
use log::{info, warn};

use crate::analysis::analyze;
use crate::config::{AnalysisSettings, AppConfig};
use crate::domain::{AnalysisResult, RaceResult, ScrapedResults, SwimmerIdentity};
use crate::errors::SupplyError;
use crate::fetchers::{JsonFileSupplier, ResultsSupplier, UsmsScraper};

/// Fetches a swimmer's results and runs them through the analysis pipeline
pub struct AnalysisService {
    scraper: UsmsScraper,
    fallback: Option<JsonFileSupplier>,
    files: JsonFileSupplier,
    settings: AnalysisSettings,
}

impl AnalysisService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let fallback = config
            .scraper
            .fallback_results_path
            .as_ref()
            .map(JsonFileSupplier::fixed);

        Ok(Self {
            scraper: UsmsScraper::new(&config.scraper)?,
            fallback,
            files: JsonFileSupplier::new(),
            settings: config.analysis.clone(),
        })
    }

    /// Scrape a USMS link (SwimmerID or URL) and analyze the results
    pub async fn analyze_link(&self, link: &str) -> Result<AnalysisResult, SupplyError> {
        let scraped = fetch_with_fallback(&self.scraper, self.fallback.as_ref(), link).await?;
        Ok(self.analyze_scraped(&scraped))
    }

    /// Analyze a `ScrapedResults` JSON document on disk
    pub async fn analyze_file(&self, path: &str) -> Result<AnalysisResult, SupplyError> {
        let scraped = self.files.fetch(path).await?;
        Ok(self.analyze_scraped(&scraped))
    }

    /// Analyze results supplied directly by the caller
    pub fn analyze_records(&self, swimmer: &SwimmerIdentity, results: &[RaceResult]) -> AnalysisResult {
        analyze(results, swimmer, &self.settings)
    }

    fn analyze_scraped(&self, scraped: &ScrapedResults) -> AnalysisResult {
        self.analyze_records(&scraped.swimmer, &scraped.results)
    }
}

/// Ask the primary supplier, and the fallback when the primary had no data
pub async fn fetch_with_fallback<P, F>(
    primary: &P,
    fallback: Option<&F>,
    link: &str,
) -> Result<ScrapedResults, SupplyError>
where
    P: ResultsSupplier,
    F: ResultsSupplier,
{
    let err = match primary.fetch(link).await {
        Ok(scraped) => return Ok(scraped),
        Err(err) => err,
    };

    match fallback {
        Some(fallback) if err.allows_fallback() => {
            warn!("{} failed ({}), trying {}", primary.name(), err, fallback.name());
            let scraped = fallback.fetch(link).await?;
            info!("Served {} from {}", link, fallback.name());
            Ok(scraped)
        }
        _ => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScraperSettings;
    use std::fs;

    const SAMPLE: &str = r#"{
        "swimmer": {"name": "Fallback Swimmer", "age": 44},
        "results": [
            {"event": "100 Breast", "time": "1:20.00", "date": "2024-05-01", "meet": "Spring", "place": 3}
        ]
    }"#;

    fn config(dir: &std::path::Path, fallback: Option<std::path::PathBuf>) -> AppConfig {
        AppConfig {
            scraper: ScraperSettings {
                // nothing listens on port 9, so the scraper fails fast
                base_url: "http://127.0.0.1:9/indresults.php".to_string(),
                cache_dir: dir.join("cache"),
                use_cache: false,
                rate_limit_ms: 0,
                timeout_secs: 2,
                fallback_results_path: fallback,
                ..ScraperSettings::default()
            },
            ..AppConfig::new()
        }
    }

    #[tokio::test]
    async fn test_falls_back_when_site_unreachable() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join("fallback.json");
        fs::write(&fallback, SAMPLE).unwrap();
        let service = AnalysisService::new(&config(dir.path(), Some(fallback))).unwrap();

        let result = service.analyze_link("MZ99C").await.unwrap();

        assert_eq!(result.swimmer.name, "Fallback Swimmer");
        assert_eq!(result.swimmer.age, 44);
        assert_eq!(result.summary.total_points, 7);
    }

    #[tokio::test]
    async fn test_unreachable_site_without_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let service = AnalysisService::new(&config(dir.path(), None)).unwrap();

        let err = service.analyze_link("MZ99C").await.unwrap_err();

        assert!(matches!(err, SupplyError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_invalid_link_skips_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join("fallback.json");
        fs::write(&fallback, SAMPLE).unwrap();
        let service = AnalysisService::new(&config(dir.path(), Some(fallback))).unwrap();

        let err = service.analyze_link("definitely not a swimmer").await.unwrap_err();

        assert!(matches!(err, SupplyError::InvalidLink(_)));
    }

    #[tokio::test]
    async fn test_analyze_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("results.json");
        fs::write(&input, SAMPLE).unwrap();
        let service = AnalysisService::new(&config(dir.path(), None)).unwrap();

        let result = service.analyze_file(input.to_str().unwrap()).await.unwrap();

        assert_eq!(result.summary.total_events, 1);
        assert_eq!(result.meet_breakdown.meets[0].name, "Spring");
    }
}
