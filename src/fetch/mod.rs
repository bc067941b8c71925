//! Network access for the crawler
//!
//! The crawler and media pool only see the [`Fetch`] trait, so traversal
//! can run against an in-memory site in tests.

pub mod http;

use crate::error::Result;
use serde::Serialize;
use std::path::Path;

pub use http::HttpClient;

/// A completed binary download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Download {
    /// Bytes written to disk
    pub bytes: u64,
    /// Hex SHA-256 of the written content
    pub sha256: String,
}

/// Source of pages and media
pub trait Fetch: Send + Sync {
    /// GET `url` and return the body as text
    fn fetch_text(&self, url: &str) -> Result<String>;

    /// GET `url` and store the body at `dest`, replacing any existing file
    fn download_to(&self, url: &str, dest: &Path) -> Result<Download>;
}
