pub mod settings;

pub use settings::{AnalysisSettings, AppConfig, ScraperSettings, StoreBackend, StoreSettings};
