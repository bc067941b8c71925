//! Recursive crawl
//!
//! Depth-first traversal from a start URL. Each page's body text is written
//! to the output directory, its media are handed to the download pool, and
//! its links are followed until `max_depth` is reached. A URL is marked as
//! visited before it is fetched, so failing pages are never retried.

pub mod media;
pub mod naming;
pub mod page;

use crate::error::{Error, Result};
use crate::fetch::Fetch;
use media::{EventSink, MediaJob, MediaOutcome, MediaPool, DEFAULT_WORKERS};
use naming::file_name_for;
use page::Page;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use url::Url;

/// Default link depth: only the start page
pub const DEFAULT_MAX_DEPTH: u32 = 0;

/// Default output directory, relative to the working directory
pub const DEFAULT_OUTPUT_DIR: &str = "crawled_data";

/// Suffix for saved page text
const TEXT_EXTENSION: &str = ".txt";

/// Settings for one crawl
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Deepest link level to follow (0 = start page only)
    pub max_depth: u32,
    /// Where page text and media are written
    pub output_dir: PathBuf,
    /// Only follow links on the start URL's host
    pub same_host: bool,
    /// Stop after this many pages have been saved
    pub max_pages: Option<usize>,
    /// Download `<img>` and `<video>` sources
    pub media: bool,
    /// Concurrent media downloads
    pub workers: usize,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            same_host: false,
            max_pages: None,
            media: true,
            workers: DEFAULT_WORKERS,
        }
    }
}

/// Progress notifications, delivered as they happen
#[derive(Debug, Clone, Copy)]
pub enum CrawlEvent<'a> {
    /// Page fetched and its text saved
    PageSaved(&'a PageRecord),
    PageFailed(&'a PageFailure),
    /// Called from a media worker thread
    MediaFinished(&'a MediaOutcome),
}

/// A page that was fetched and saved
#[derive(Debug, Clone, Serialize)]
pub struct PageRecord {
    pub url: String,
    pub depth: u32,
    pub text_file: PathBuf,
    pub text_bytes: usize,
    pub links: usize,
    pub media: usize,
}

/// A page that could not be fetched or saved
#[derive(Debug, Clone, Serialize)]
pub struct PageFailure {
    pub url: String,
    pub depth: u32,
    pub error: String,
}

/// Everything a crawl produced
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub start_url: String,
    pub max_depth: u32,
    pub output_dir: PathBuf,
    pub pages: Vec<PageRecord>,
    pub failures: Vec<PageFailure>,
    pub media: Vec<MediaOutcome>,
    pub duration_secs: f64,
}

impl CrawlReport {
    pub fn media_downloaded(&self) -> usize {
        self.media.iter().filter(|m| m.is_downloaded()).count()
    }

    pub fn media_failed(&self) -> usize {
        self.media.iter().filter(|m| m.is_failed()).count()
    }

    pub fn media_skipped(&self) -> usize {
        self.media.len() - self.media_downloaded() - self.media_failed()
    }
}

/// Parse a start URL, accepting only absolute http(s) URLs
///
/// The fragment is dropped so the start page matches links back to it.
pub fn parse_start_url(input: &str) -> Result<Url> {
    let mut url = Url::parse(input.trim()).map_err(|e| Error::InvalidUrl {
        url: input.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {
            url.set_fragment(None);
            Ok(url)
        }
        other => Err(Error::InvalidUrl {
            url: input.to_string(),
            reason: format!("unsupported scheme '{}', expected http or https", other),
        }),
    }
}

/// Mutable traversal state for one crawl
struct CrawlState<'scope> {
    visited: HashSet<Url>,
    pages: Vec<PageRecord>,
    failures: Vec<PageFailure>,
    pool: Option<MediaPool<'scope>>,
}

type Sink = Box<dyn Fn(CrawlEvent<'_>) + Send + Sync>;

fn ignore_event(_: CrawlEvent<'_>) {}

pub struct Crawler<F: Fetch> {
    fetcher: F,
    options: CrawlOptions,
    sink: Sink,
}

impl<F: Fetch> Crawler<F> {
    pub fn new(fetcher: F, options: CrawlOptions) -> Self {
        Self {
            fetcher,
            options,
            sink: Box::new(ignore_event),
        }
    }

    /// Receive progress events while crawling
    pub fn with_events<S>(mut self, sink: S) -> Self
    where
        S: Fn(CrawlEvent<'_>) + Send + Sync + 'static,
    {
        self.sink = Box::new(sink);
        self
    }

    /// Crawl from `start` and wait for all media downloads to finish
    pub fn crawl(&self, start: &str) -> Result<CrawlReport> {
        let start_url = parse_start_url(start)?;
        let output_dir = &self.options.output_dir;

        fs::create_dir_all(output_dir).map_err(|source| Error::Write {
            path: output_dir.clone(),
            source,
        })?;

        info!(
            url = %start_url,
            max_depth = self.options.max_depth,
            output = %output_dir.display(),
            "starting crawl"
        );
        let started = Instant::now();
        let sink: EventSink<'_> = &*self.sink;

        let (pages, failures, media) = std::thread::scope(|s| {
            let pool = self
                .options
                .media
                .then(|| MediaPool::start(s, &self.fetcher, self.options.workers, sink));

            let mut state = CrawlState {
                visited: HashSet::new(),
                pages: Vec::new(),
                failures: Vec::new(),
                pool,
            };
            self.traverse(&start_url, &mut state);

            let media = state.pool.take().map(MediaPool::finish).unwrap_or_default();
            (state.pages, state.failures, media)
        });

        let report = CrawlReport {
            start_url: start_url.to_string(),
            max_depth: self.options.max_depth,
            output_dir: output_dir.clone(),
            pages,
            failures,
            media,
            duration_secs: started.elapsed().as_secs_f64(),
        };
        info!(
            pages = report.pages.len(),
            failures = report.failures.len(),
            media = report.media_downloaded(),
            "crawl finished"
        );
        Ok(report)
    }

    /// Depth-first walk using an explicit stack.
    ///
    /// Children are pushed in reverse so they are visited in document order,
    /// and the visited check happens on pop, matching a recursive traversal.
    fn traverse(&self, start: &Url, state: &mut CrawlState<'_>) {
        let start_host = start.host_str().map(str::to_string);
        let mut stack = vec![(start.clone(), 0u32)];

        while let Some((url, depth)) = stack.pop() {
            if let Some(limit) = self.options.max_pages {
                if state.pages.len() >= limit {
                    debug!(limit, "page limit reached");
                    break;
                }
            }
            if depth > self.options.max_depth || !state.visited.insert(url.clone()) {
                continue;
            }

            let links = match self.visit(&url, depth, state) {
                Ok(links) => links,
                Err(e) => {
                    if e.is_remote() {
                        warn!(url = %url, error = %e, "skipping page");
                    } else {
                        error!(url = %url, error = %e, "could not save page");
                    }
                    let failure = PageFailure {
                        url: url.to_string(),
                        depth,
                        error: e.to_string(),
                    };
                    (self.sink)(CrawlEvent::PageFailed(&failure));
                    state.failures.push(failure);
                    continue;
                }
            };

            if depth == self.options.max_depth {
                continue;
            }
            for link in links.into_iter().rev() {
                if self.options.same_host && link.host_str() != start_host.as_deref() {
                    continue;
                }
                stack.push((link, depth + 1));
            }
        }
    }

    /// Fetch one page, save its text, queue its media and return its links
    fn visit(&self, url: &Url, depth: u32, state: &mut CrawlState<'_>) -> Result<Vec<Url>> {
        let html = self.fetcher.fetch_text(url.as_str())?;
        let page = Page::parse(url, &html);

        let text = page.text();
        let text_file = self
            .options
            .output_dir
            .join(file_name_for(url.as_str(), TEXT_EXTENSION));
        fs::write(&text_file, &text).map_err(|source| Error::Write {
            path: text_file.clone(),
            source,
        })?;

        let media = page.media();
        if let Some(pool) = state.pool.as_mut() {
            for item in &media {
                let url = item.url.to_string();
                let dest = self
                    .options
                    .output_dir
                    .join(file_name_for(&url, &item.kind.extension()));
                pool.submit(MediaJob {
                    kind: item.kind,
                    url,
                    dest,
                });
            }
        }

        let links = page.links();
        let record = PageRecord {
            url: url.to_string(),
            depth,
            text_file,
            text_bytes: text.len(),
            links: links.len(),
            media: media.len(),
        };
        debug!(url = %url, depth, links = record.links, "page saved");
        (self.sink)(CrawlEvent::PageSaved(&record));
        state.pages.push(record);

        Ok(links)
    }
}
