//! Configuration infrastructure
//!
//! Contains configuration loading and management for the schedule scraper.
//!
//! Configuration is organized into three sections:
//! 1. Scrape settings (source page, keyword, target groups, HTTP tuning)
//! 2. Filesystem paths (data, database, hash file, HTML output, logs)
//! 3. Logging settings (level, optional file output)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// What to scrape and which groups to keep
    pub scrape: ScrapeConfig,

    /// Where downloads, the database and the rendered page live
    pub paths: PathsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Source-site and group-selection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Page listing all timetable PDFs
    pub source_page_url: String,

    /// Case-insensitive keyword identifying the right PDF link
    pub pdf_keyword: String,

    /// Group identifiers exactly as they appear on the PDF pages
    pub target_groups: Vec<String>,

    /// Timeout for HTTP requests in seconds
    pub request_timeout_secs: u64,

    /// Download attempts before giving up
    pub max_download_retries: u32,

    /// Base backoff in seconds, doubled on each retry
    pub retry_backoff_base_secs: u64,
}

/// Filesystem layout, all paths relative to the working directory by default
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
    pub pdf_dir: PathBuf,
    pub database_path: PathBuf,
    pub hash_path: PathBuf,
    pub output_html: PathBuf,
    pub log_dir: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level filter, overridable via RUST_LOG or --log-level
    pub level: String,

    /// Also write log output to a file under `paths.log_dir`
    pub file_output: bool,
}

/// Default configuration values
pub mod defaults {
    pub const SOURCE_PAGE_URL: &str =
        "https://san.edu.pl/plany-zajec-warszawa/studia-stacjonarne";
    pub const PDF_KEYWORD: &str = "zarządzanie";
    pub const TARGET_GROUPS: [&str; 3] = [
        "Zarządzanie II gr1",
        "Zarządzanie II gr2",
        "Zarządzanie II gr3",
    ];
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
    pub const MAX_DOWNLOAD_RETRIES: u32 = 3;
    pub const RETRY_BACKOFF_BASE_SECS: u64 = 2;

    pub const DATA_DIR: &str = "data";
    pub const PDF_DIR: &str = "data/pdfs";
    pub const DATABASE_PATH: &str = "data/schedule.db";
    pub const HASH_PATH: &str = "data/last_hash.txt";
    pub const OUTPUT_HTML: &str = "index.html";
    pub const LOG_DIR: &str = "logs";

    pub const LOG_LEVEL: &str = "info";
    pub const LOG_FILE_OUTPUT: bool = true;

    pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";
    pub const ACCEPT_LANGUAGE: &str = "pl-PL,pl;q=0.9,en-US;q=0.8";
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scrape: ScrapeConfig::default(),
            paths: PathsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            source_page_url: defaults::SOURCE_PAGE_URL.to_string(),
            pdf_keyword: defaults::PDF_KEYWORD.to_string(),
            target_groups: defaults::TARGET_GROUPS.iter().map(|s| s.to_string()).collect(),
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
            max_download_retries: defaults::MAX_DOWNLOAD_RETRIES,
            retry_backoff_base_secs: defaults::RETRY_BACKOFF_BASE_SECS,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(defaults::DATA_DIR),
            pdf_dir: PathBuf::from(defaults::PDF_DIR),
            database_path: PathBuf::from(defaults::DATABASE_PATH),
            hash_path: PathBuf::from(defaults::HASH_PATH),
            output_html: PathBuf::from(defaults::OUTPUT_HTML),
            log_dir: PathBuf::from(defaults::LOG_DIR),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            file_output: defaults::LOG_FILE_OUTPUT,
        }
    }
}

impl PathsConfig {
    /// sqlx connection URL for the schedule database
    pub fn database_url(&self) -> String {
        format!("sqlite://{}", self.database_path.display())
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Load configuration from file, creating a default file if missing
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!(
                "Configuration file not found, creating default: {:?}",
                self.config_path
            );
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .context("Failed to read configuration file")?;

        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid configuration JSON in {:?}", self.config_path))?;
        info!("Loaded configuration from: {:?}", self.config_path);
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create config directory")?;
            }
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;
        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;
        Ok(())
    }
}

impl AppConfig {
    /// Create the data directories the run will write into
    pub async fn ensure_directories(&self) -> Result<()> {
        let directories = [
            self.paths.data_dir.clone(),
            self.paths.pdf_dir.clone(),
            self.paths.log_dir.clone(),
        ];

        for dir in &directories {
            if !dir.exists() {
                fs::create_dir_all(dir)
                    .await
                    .with_context(|| format!("Failed to create directory: {:?}", dir))?;
                info!("📁 Created directory: {:?}", dir);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_san_site() {
        let config = AppConfig::default();
        assert!(config.scrape.source_page_url.contains("san.edu.pl"));
        assert_eq!(config.scrape.target_groups.len(), 3);
        assert_eq!(config.scrape.pdf_keyword, "zarządzanie");
    }

    #[test]
    fn partial_config_backfills_defaults() {
        let json = r#"{ "scrape": { "pdf_keyword": "informatyka" } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.scrape.pdf_keyword, "informatyka");
        assert_eq!(
            config.scrape.request_timeout_secs,
            defaults::REQUEST_TIMEOUT_SECS
        );
        assert_eq!(config.paths.output_html, PathBuf::from("index.html"));
    }

    #[tokio::test]
    async fn load_creates_default_file_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let manager = ConfigManager::new(path.clone());

        let config = manager.load_config().await.unwrap();
        assert!(path.exists());
        assert_eq!(config.scrape.pdf_keyword, defaults::PDF_KEYWORD);

        // Second load round-trips the file we just wrote
        let reloaded = manager.load_config().await.unwrap();
        assert_eq!(reloaded.scrape.target_groups, config.scrape.target_groups);
    }
}
