//! Shared HTTP client for page and media downloads
//!
//! Provides a blocking client with consistent error handling, used by the
//! crawler for HTML pages and by the media pool for binary downloads.

use crate::error::{Error, Result};
use crate::fetch::{Download, Fetch};
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default request timeout for all crawl operations
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("sitegrab/", env!("CARGO_PKG_VERSION"));

/// Suffix for in-flight downloads, renamed away once complete
const PARTIAL_SUFFIX: &str = ".part";

/// HTTP client for sitegrab
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a client with the default timeout and user agent
    pub fn new() -> Result<Self> {
        Self::with_settings(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a client with an explicit timeout and user agent
    pub fn with_settings(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Send a GET request with standardized error handling
    fn send_request(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                Error::Network(format!("Request timed out: {}", url))
            } else if e.is_connect() {
                Error::Network(format!("Connection failed: {}", url))
            } else {
                Error::Network(format!("HTTP error: {}", e))
            }
        })?;

        check_status(&response, url)?;
        Ok(response)
    }
}

impl Fetch for HttpClient {
    fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.send_request(url)?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        if !is_markup(content_type) {
            return Err(Error::Network(format!(
                "Unsupported content type {} for {}",
                content_type.unwrap_or_default(),
                url
            )));
        }

        response
            .text()
            .map_err(|e| Error::Network(format!("Failed to read response from {}: {}", url, e)))
    }

    fn download_to(&self, url: &str, dest: &Path) -> Result<Download> {
        let mut response = self.send_request(url)?;
        let partial = partial_path(dest);

        let result = write_hashed(&partial, |writer| {
            io::copy(&mut response, writer).map_err(|e| {
                Error::Network(format!("Failed to read response from {}: {}", url, e))
            })
        });

        finish_download(&partial, dest, result)
    }
}

/// Move a completed partial file into place, removing it on any failure
fn finish_download(partial: &Path, dest: &Path, result: Result<Download>) -> Result<Download> {
    let outcome = result.and_then(|download| {
        fs::rename(partial, dest).map_err(|source| Error::Write {
            path: dest.to_path_buf(),
            source,
        })?;
        Ok(download)
    });
    if outcome.is_err() {
        let _ = fs::remove_file(partial);
    }
    outcome
}

/// Check HTTP response status and return appropriate errors
fn check_status(response: &Response, url: &str) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    if status.as_u16() == 404 {
        return Err(Error::NotFound(url.to_string()));
    }
    Err(Error::Network(format!("HTTP {} for {}", status.as_u16(), url)))
}

/// Whether a Content-Type names a text or XML document
///
/// A missing header is accepted; the body is parsed as HTML.
fn is_markup(content_type: Option<&str>) -> bool {
    let Some(value) = content_type else {
        return true;
    };
    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.starts_with("text/")
        || mime == "application/xhtml+xml"
        || mime == "application/xml"
        || (mime.starts_with("application/") && mime.ends_with("+xml"))
}

/// `dest` with `.part` appended to its file name
pub(crate) fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(PARTIAL_SUFFIX);
    dest.with_file_name(name)
}

/// Create `path` and fill it through `fill`, hashing everything written
pub(crate) fn write_hashed<F>(path: &Path, fill: F) -> Result<Download>
where
    F: FnOnce(&mut HashingWriter<File>) -> Result<u64>,
{
    let file = File::create(path)?;
    let mut writer = HashingWriter::new(file);
    let bytes = fill(&mut writer)?;
    writer.flush()?;
    Ok(Download {
        bytes,
        sha256: writer.finish(),
    })
}

/// Writer adapter computing a SHA-256 of everything passed through it
pub struct HashingWriter<W> {
    inner: W,
    hasher: Sha256,
}

impl<W: Write> HashingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }

    /// Hex digest of all bytes written so far
    pub fn finish(self) -> String {
        format!("{:x}", self.hasher.finalize())
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
