use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::cache_context;

/// File-based cache for results pages with two-tier system:
/// raw HTML as fetched, and the results parsed out of it
pub struct Cache {
    raw_dir: PathBuf,
    parsed_dir: PathBuf,
}

impl Cache {
    /// Create a new cache instance
    pub fn new<P: AsRef<Path>>(cache_dir: P) -> Result<Self> {
        let cache_dir = cache_dir.as_ref();
        let raw_dir = cache_dir.join("raw");
        let parsed_dir = cache_dir.join("parsed");

        fs::create_dir_all(&raw_dir).context("Failed to create raw cache directory")?;
        fs::create_dir_all(&parsed_dir).context("Failed to create parsed cache directory")?;

        Ok(Self { raw_dir, parsed_dir })
    }

    /// Save a fetched page to cache
    pub fn save_raw(&self, key: &str, html: &str) -> Result<()> {
        let file_path = self.build_raw_path(key);
        fs::write(&file_path, html).with_context(|| cache_context("write raw", key))?;
        info!("Saved raw page to cache: {}", file_path.display());
        Ok(())
    }

    /// Load a fetched page from cache
    pub fn load_raw(&self, key: &str) -> Result<Option<String>> {
        let file_path = self.build_raw_path(key);
        if !file_path.exists() {
            return Ok(None);
        }

        let html = fs::read_to_string(&file_path).with_context(|| cache_context("read raw", key))?;
        debug!("Loaded raw page from cache: {}", file_path.display());
        Ok(Some(html))
    }

    /// Save parsed data to cache
    pub fn save_parsed<T: Serialize>(&self, key: &str, data: &T) -> Result<()> {
        let file_path = self.build_parsed_path(key);
        self.write_json(&file_path, data)
            .with_context(|| cache_context("write parsed", key))?;
        info!("Saved parsed data to cache: {}", file_path.display());
        Ok(())
    }

    /// Load parsed data from cache
    pub fn load_parsed<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<Option<T>> {
        let file_path = self.build_parsed_path(key);
        self.read_json_opt(&file_path)
    }

    // --- Helper Methods ---

    fn build_raw_path(&self, key: &str) -> PathBuf {
        self.raw_dir.join(format!("{}.html", sanitize_key(key)))
    }

    fn build_parsed_path(&self, key: &str) -> PathBuf {
        self.parsed_dir.join(format!("{}.json", sanitize_key(key)))
    }

    fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        fs::write(path, json).context("Failed to write cache file")?;
        Ok(())
    }

    fn read_json_opt<T: for<'de> Deserialize<'de>>(&self, path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(path)?;
        let data = serde_json::from_str(&json).with_context(|| {
            let preview: String = json.chars().take(200).collect();
            format!("Failed to parse JSON from {:?}. First 200 chars: {}", path, preview)
        })?;
        Ok(Some(data))
    }
}

/// Cache keys come from links, so keep only filename-safe characters
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
