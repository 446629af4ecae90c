use std::env;
use std::path::PathBuf;

/// Knobs for the pure analysis pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub recent_per_event: usize,
    pub improvements_limit: usize,
    pub age_group_improvements_limit: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            recent_per_event: 5,
            improvements_limit: 6,
            age_group_improvements_limit: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScraperSettings {
    pub rate_limit_ms: u64,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub base_url: String,
    pub cache_dir: PathBuf,
    pub use_cache: bool,
    /// ScrapedResults JSON served when the live site has nothing for us
    pub fallback_results_path: Option<PathBuf>,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            rate_limit_ms: 1000, // 1 req/sec
            user_agent: "Mozilla/5.0 (compatible; SwimAnalytics/1.0)".to_string(),
            timeout_secs: 30,
            base_url: "https://www.usms.org/comp/meets/indresults.php".to_string(),
            cache_dir: PathBuf::from("cache"),
            use_cache: true,
            fallback_results_path: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub database_path: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            database_path: PathBuf::from("swim_sessions.db"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub analysis: AnalysisSettings,
    pub scraper: ScraperSettings,
    pub store: StoreSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            analysis: AnalysisSettings::default(),
            scraper: ScraperSettings::default(),
            store: StoreSettings::default(),
        }
    }

    /// Defaults with path overrides taken from the environment
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Ok(path) = env::var("DATABASE_PATH") {
            config.store.database_path = PathBuf::from(path);
        }
        if let Ok(dir) = env::var("CACHE_DIR") {
            config.scraper.cache_dir = PathBuf::from(dir);
        }
        if let Ok(path) = env::var("FALLBACK_RESULTS_PATH") {
            config.scraper.fallback_results_path = Some(PathBuf::from(path));
        }

        config
    }
}
