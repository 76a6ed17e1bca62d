use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::model::Country;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub squadgraph: SquadgraphConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Storage and logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SquadgraphConfig {
    /// Root of the roster cache shared by the crawler and the graph loader.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for SquadgraphConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Crawler configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    pub base_url: String,
    /// First season crawled (start year).
    pub start_season: i32,
    /// Season at which the crawl stops (exclusive).
    pub end_season: i32,
    /// Source country codes; empty means every known country.
    pub countries: Vec<String>,
    pub request_timeout_secs: u64,
    pub max_retries: usize,
    /// First retry wait; doubled after every further failure.
    pub retry_backoff_ms: u64,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Team rosters of one league fetched concurrently; 1 fetches one page at a time.
    pub team_concurrency: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.footballsquads.co.uk".to_string(),
            start_season: 1999,
            end_season: 2023,
            countries: Vec::new(),
            request_timeout_secs: 30,
            max_retries: 3,
            retry_backoff_ms: 1000,
            min_delay_ms: 1000,
            max_delay_ms: 3000,
            team_concurrency: 1,
        }
    }
}

/// Search configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_target")]
    pub default_target: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_target: default_target(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./cache/data-files")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_target() -> String {
    "Zlatan Ibrahimovic".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in SQUADGRAPH_CONFIG environment variable (must exist)
    /// 2. ./config.toml in current directory
    /// 3. Built-in defaults when neither is present
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        let config = match std::env::var("SQUADGRAPH_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => {
                let path = PathBuf::from("config.toml");
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    log::debug!("No config.toml found, using defaults");
                    Config::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let crawler = &self.crawler;

        if crawler.start_season >= crawler.end_season {
            anyhow::bail!(
                "crawler.start_season ({}) must be before crawler.end_season ({})",
                crawler.start_season,
                crawler.end_season
            );
        }

        if crawler.min_delay_ms > crawler.max_delay_ms {
            anyhow::bail!("crawler.min_delay_ms must not exceed crawler.max_delay_ms");
        }

        if crawler.team_concurrency == 0 {
            anyhow::bail!("crawler.team_concurrency must be greater than 0");
        }

        url::Url::parse(&crawler.base_url)
            .with_context(|| format!("crawler.base_url is not a valid URL: {}", crawler.base_url))?;

        self.countries()?;

        Ok(())
    }

    /// Countries to crawl, resolved from their source codes.
    pub fn countries(&self) -> Result<Vec<Country>> {
        if self.crawler.countries.is_empty() {
            return Ok(Country::all().to_vec());
        }
        let countries = self
            .crawler
            .countries
            .iter()
            .map(|code| Country::from_code(code))
            .collect::<crate::Result<Vec<_>>>()?;
        Ok(countries)
    }

    pub fn cache_dir(&self) -> &Path {
        &self.squadgraph.cache_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    const TEST_CONFIG: &str = r#"
[squadgraph]
cache_dir = "/tmp/squads"
log_level = "debug"

[crawler]
start_season = 2004
end_season = 2006
countries = ["eng", "spain"]
min_delay_ms = 0
max_delay_ms = 10
team_concurrency = 4

[search]
default_target = "Thierry Henry"
"#;

    #[test]
    fn test_config_parse() {
        let config = Config::from_toml_str(TEST_CONFIG).unwrap();
        assert_eq!(config.squadgraph.log_level, "debug");
        assert_eq!(config.cache_dir(), Path::new("/tmp/squads"));
        assert_eq!(config.crawler.team_concurrency, 4);
        assert_eq!(config.crawler.max_retries, 3);
        assert_eq!(config.search.default_target, "Thierry Henry");
        assert_eq!(
            config.countries().unwrap(),
            vec![Country::England, Country::Spain]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.cache_dir(), Path::new("./cache/data-files"));
        assert_eq!(config.crawler.team_concurrency, 1);
        assert_eq!(config.crawler.retry_backoff_ms, 1000);
        assert_eq!(config.countries().unwrap().len(), Country::all().len());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_unknown_country() {
        let config = Config::from_toml_str("[crawler]\ncountries = [\"narnia\"]\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("narnia"));
    }

    #[test]
    fn test_config_rejects_empty_season_range() {
        let config =
            Config::from_toml_str("[crawler]\nstart_season = 2010\nend_season = 2010\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_load_from_env_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, TEST_CONFIG).unwrap();

        let original = std::env::var("SQUADGRAPH_CONFIG").ok();
        std::env::set_var("SQUADGRAPH_CONFIG", &config_path);
        let config = Config::load();
        std::env::remove_var("SQUADGRAPH_CONFIG");
        if let Some(v) = original {
            std::env::set_var("SQUADGRAPH_CONFIG", v);
        }

        let config = config.unwrap();
        assert_eq!(config.crawler.start_season, 2004);
    }

    #[test]
    fn test_config_invalid_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let original = std::env::var("SQUADGRAPH_CONFIG").ok();
        std::env::set_var("SQUADGRAPH_CONFIG", "nonexistent.toml");
        let config = Config::load();
        std::env::remove_var("SQUADGRAPH_CONFIG");
        if let Some(v) = original {
            std::env::set_var("SQUADGRAPH_CONFIG", v);
        }
        assert!(config.is_err());
    }
}
