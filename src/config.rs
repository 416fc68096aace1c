// Runtime settings: a TOML file plus a few environment overrides.
//
// Lookup order for the file: `$CATALOG_REPRICER_CONFIG`, `./config.toml`,
// then `<config dir>/catalog-repricer/config.toml`. A missing file is
// fine as long as the base URL comes from the environment.

use crate::pipeline::{PipelineOptions, RankingMode};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_ENV: &str = "CATALOG_REPRICER_CONFIG";
const LOCAL_CONFIG: &str = "config.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogSettings {
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub ranking: RankingMode,
}

fn default_timeout_secs() -> u64 { 30 }
fn default_category() -> String { "smartphones".to_string() }
fn default_top_n() -> usize { 3 }

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            category: default_category(),
            top_n: default_top_n(),
            ranking: RankingMode::default(),
        }
    }
}

impl Settings {
    /// Locate, read and validate the settings for this process.
    pub fn load() -> Result<Self> {
        let mut settings = match config_path() {
            Some(path) => Self::from_file(&path)?,
            None => {
                tracing::info!("no config file found, using defaults");
                Settings::default()
            }
        };
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let settings = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::info!(path = %path.display(), "config loaded");
        Ok(settings)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config TOML")
    }

    /// Environment variables win over the file. `lookup` is `std::env::var`
    /// in production.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("CATALOG_API_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
        if let Some(category) = lookup("CATALOG_CATEGORY").filter(|v| !v.trim().is_empty()) {
            self.catalog.category = category.trim().to_string();
        }
        if let Some(n) = lookup("CATALOG_TOP_N") {
            self.catalog.top_n = n
                .trim()
                .parse()
                .with_context(|| format!("CATALOG_TOP_N is not a number: {:?}", n))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            bail!("API base URL is not configured (set api.base_url or CATALOG_API_BASE_URL)");
        }
        if self.catalog.top_n == 0 {
            bail!("catalog.top_n must be at least 1");
        }
        if self.catalog.category.trim().is_empty() {
            bail!("catalog.category must not be empty");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            category: self.catalog.category.clone(),
            top_n: self.catalog.top_n,
            ranking: self.catalog.ranking,
        }
    }
}

fn config_path() -> Option<PathBuf> {
    if let Ok(p) = std::env::var(CONFIG_ENV) {
        if !p.is_empty() {
            return Some(PathBuf::from(p));
        }
    }
    let local = PathBuf::from(LOCAL_CONFIG);
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("catalog-repricer").join(LOCAL_CONFIG))
        .filter(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn parses_full_file() {
        let settings = Settings::from_toml(
            r#"
            [api]
            base_url = "https://dummyjson.com"
            timeout_secs = 10

            [catalog]
            category = "laptops"
            top_n = 5
            ranking = "client"
            "#,
        )
        .unwrap();
        assert_eq!(settings.api.base_url, "https://dummyjson.com");
        assert_eq!(settings.timeout(), Duration::from_secs(10));
        assert_eq!(settings.catalog.category, "laptops");
        assert_eq!(settings.catalog.top_n, 5);
        assert_eq!(settings.catalog.ranking, RankingMode::Client);
        settings.validate().unwrap();
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let settings = Settings::from_toml("[api]\nbase_url = \"http://localhost:3000\"\n").unwrap();
        assert_eq!(settings.api.timeout_secs, 30);
        assert_eq!(settings.catalog.category, "smartphones");
        assert_eq!(settings.catalog.top_n, 3);
        assert_eq!(settings.catalog.ranking, RankingMode::Server);
    }

    #[test]
    fn base_url_is_required() {
        let settings = Settings::from_toml("").unwrap();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("base URL"));
    }

    #[test]
    fn zero_top_n_is_rejected() {
        let settings =
            Settings::from_toml("[api]\nbase_url = \"http://x\"\n[catalog]\ntop_n = 0\n").unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn unknown_ranking_mode_is_rejected() {
        assert!(Settings::from_toml("[catalog]\nranking = \"sideways\"\n").is_err());
    }

    #[test]
    fn environment_overrides_file() {
        let mut settings =
            Settings::from_toml("[api]\nbase_url = \"http://file\"\n").unwrap();
        settings
            .apply_overrides(env(&[
                ("CATALOG_API_BASE_URL", "https://dummyjson.com "),
                ("CATALOG_TOP_N", "4"),
                ("CATALOG_CATEGORY", "tablets"),
            ]))
            .unwrap();
        assert_eq!(settings.api.base_url, "https://dummyjson.com");
        assert_eq!(settings.catalog.top_n, 4);
        assert_eq!(settings.catalog.category, "tablets");
    }

    #[test]
    fn bad_top_n_override_is_an_error() {
        let mut settings = Settings::default();
        assert!(settings
            .apply_overrides(env(&[("CATALOG_TOP_N", "three")]))
            .is_err());
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let mut settings =
            Settings::from_toml("[api]\nbase_url = \"http://file\"\n").unwrap();
        settings
            .apply_overrides(env(&[("CATALOG_API_BASE_URL", "  ")]))
            .unwrap();
        assert_eq!(settings.api.base_url, "http://file");
    }
}
