//! sitegrab.toml configuration file parsing and validation
//!
//! Handles loading, parsing, and validating crawl configuration from `sitegrab.toml`.
//! All fields have sensible defaults, so an empty or missing config file works.

use crate::crawl::media::DEFAULT_WORKERS;
use crate::crawl::{DEFAULT_MAX_DEPTH, DEFAULT_OUTPUT_DIR};
use crate::error::{Error, Result};
use crate::fetch::http::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the project configuration file
pub const CONFIG_FILE: &str = "sitegrab.toml";

/// Crawl configuration loaded from sitegrab.toml
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Traversal settings
    pub crawl: CrawlSection,
    /// Media download settings
    pub media: MediaSection,
    /// HTTP client settings
    pub http: HttpSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CrawlSection {
    /// Deepest link level to follow (0 = start page only)
    pub max_depth: u32,
    /// Output directory (relative to the directory holding sitegrab.toml)
    pub output_dir: PathBuf,
    /// Only follow links on the start URL's host
    pub same_host: bool,
    /// Stop after this many pages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<usize>,
}

impl Default for CrawlSection {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            same_host: false,
            max_pages: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MediaSection {
    /// Download `<img>` and `<video>` sources
    pub enabled: bool,
    /// Concurrent downloads
    pub workers: usize,
}

impl Default for MediaSection {
    fn default() -> Self {
        Self {
            enabled: true,
            workers: DEFAULT_WORKERS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HttpSection {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Load `sitegrab.toml` from a project root.
///
/// Returns `None` if the directory has no config file.
pub fn load_config(project_root: &Path) -> Result<Option<Config>> {
    let config_path = project_root.join(CONFIG_FILE);

    if !config_path.exists() {
        return Ok(None);
    }

    load_config_file(&config_path).map(Some)
}

/// Load and validate a config file at an explicit path
pub fn load_config_file(config_path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(config_path).map_err(|e| {
        Error::Config(format!(
            "Failed to read {} at {}: {}",
            CONFIG_FILE,
            config_path.display(),
            e
        ))
    })?;

    let config: Config = toml::from_str(&content).map_err(|e| {
        Error::Config(format!(
            "Failed to parse {}: {}",
            config_path.display(),
            format_toml_error(&e)
        ))
    })?;

    validate_config(&config).map_err(|e| match e {
        Error::Config(msg) => Error::Config(format!("{} in {}", msg, config_path.display())),
        other => other,
    })?;

    Ok(config)
}

/// Format TOML parse error with position information
fn format_toml_error(err: &toml::de::Error) -> String {
    if let Some(span) = err.span() {
        format!("at position {}-{}: {}", span.start, span.end, err.message())
    } else {
        err.message().to_string()
    }
}

/// Validate configuration values
pub fn validate_config(config: &Config) -> Result<()> {
    if config.media.workers == 0 {
        return Err(Error::Config(
            "media.workers must be at least 1".to_string(),
        ));
    }
    if config.http.timeout_secs == 0 {
        return Err(Error::Config(
            "http.timeout_secs must be at least 1".to_string(),
        ));
    }
    if config.crawl.max_pages == Some(0) {
        return Err(Error::Config(
            "crawl.max_pages must be at least 1 when set".to_string(),
        ));
    }
    if config.http.user_agent.trim().is_empty() {
        return Err(Error::Config("http.user_agent must not be empty".to_string()));
    }
    Ok(())
}

/// Generate a template sitegrab.toml with commented defaults.
///
/// This is used by `sitegrab init` to create a discoverable config file.
pub fn generate_config_template() -> &'static str {
    r#"# sitegrab crawl configuration

[crawl]
# 0 saves only the start page; 1 also follows its links, and so on
max_depth = 0
output_dir = "crawled_data"
# same_host = true
# max_pages = 100

[media]
enabled = true
workers = 8

[http]
timeout_secs = 30
# user_agent = "my-crawler/1.0"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.crawl.max_depth, 0);
        assert_eq!(config.crawl.output_dir, PathBuf::from("crawled_data"));
        assert!(!config.crawl.same_host);
        assert!(config.crawl.max_pages.is_none());
        assert!(config.media.enabled);
        assert_eq!(config.media.workers, 8);
        assert_eq!(config.http.timeout_secs, 30);
        assert!(config.http.user_agent.starts_with("sitegrab/"));
    }

    #[test]
    fn test_load_missing_config() {
        let temp = TempDir::new().unwrap();
        assert!(load_config(temp.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_empty_config() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "").unwrap();

        let config = load_config(temp.path()).unwrap().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_partial_config() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE),
            "[crawl]\nmax_depth = 2\nsame_host = true\n\n[media]\nworkers = 3\n",
        )
        .unwrap();

        let config = load_config(temp.path()).unwrap().unwrap();
        assert_eq!(config.crawl.max_depth, 2);
        assert!(config.crawl.same_host);
        assert_eq!(config.media.workers, 3);
        // untouched defaults
        assert!(config.media.enabled);
        assert_eq!(config.crawl.output_dir, PathBuf::from("crawled_data"));
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "invalid { toml }}}").unwrap();

        let err = load_config(temp.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_zero_workers_rejected_with_path() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "[media]\nworkers = 0\n").unwrap();

        let err = load_config(temp.path()).unwrap_err().to_string();
        assert!(err.contains("media.workers"));
        assert!(err.contains(CONFIG_FILE));
    }

    #[test]
    fn test_zero_max_pages_rejected() {
        let mut config = Config::default();
        config.crawl.max_pages = Some(0);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_config_template_is_valid_toml() {
        let config: Config = toml::from_str(generate_config_template()).unwrap();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.media.workers, 8);
    }
}
