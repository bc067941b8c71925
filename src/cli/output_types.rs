//! Output types for CLI commands
//!
//! These types keep JSON output consistent across commands. Each command
//! constructs its output struct and serializes it through `CommandOutput`.

use crate::crawl::CrawlReport;
use crate::error::Result;
use serde::Serialize;
use std::path::PathBuf;

/// Trait for command outputs that can be serialized to JSON
pub trait CommandOutput: Serialize {
    /// Serialize to pretty-printed JSON string
    fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// =============================================================================
// CrawlOutput
// =============================================================================

/// Output for `sitegrab crawl`
#[derive(Debug, Serialize)]
pub struct CrawlOutput {
    /// True when every page and media file was saved
    pub success: bool,
    pub pages_saved: usize,
    pub pages_failed: usize,
    pub media_downloaded: usize,
    pub media_skipped: usize,
    pub media_failed: usize,
    #[serde(flatten)]
    pub report: CrawlReport,
}

impl From<CrawlReport> for CrawlOutput {
    fn from(report: CrawlReport) -> Self {
        let media_failed = report.media_failed();
        Self {
            success: report.failures.is_empty() && media_failed == 0,
            pages_saved: report.pages.len(),
            pages_failed: report.failures.len(),
            media_downloaded: report.media_downloaded(),
            media_skipped: report.media_skipped(),
            media_failed,
            report,
        }
    }
}

impl CommandOutput for CrawlOutput {}

// =============================================================================
// InitOutput
// =============================================================================

/// Output for `sitegrab init`
#[derive(Debug, Serialize)]
pub struct InitOutput {
    pub config_file: PathBuf,
    /// True when an existing file was replaced
    pub overwritten: bool,
}

impl CommandOutput for InitOutput {}

// =============================================================================
// EnvOutput
// =============================================================================

/// Output for `sitegrab env`
#[derive(Debug, Serialize)]
pub struct EnvOutput {
    pub version: String,
    /// Config file in effect, if any
    pub config_file: Option<PathBuf>,
    pub max_depth: u32,
    pub output_dir: PathBuf,
    pub same_host: bool,
    pub max_pages: Option<usize>,
    pub media_enabled: bool,
    pub media_workers: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl CommandOutput for EnvOutput {}
