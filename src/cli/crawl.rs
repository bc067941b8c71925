//! `sitegrab crawl` command implementation
//!
//! Resolves settings (config file, then flags), runs the crawler against the
//! network and prints progress plus a summary.

use crate::cli::output_format::OutputFormat;
use crate::cli::output_types::{CommandOutput, CrawlOutput};
use crate::crawl::media::{MediaOutcome, MediaStatus};
use crate::crawl::{CrawlEvent, CrawlOptions, CrawlReport, Crawler};
use crate::error::{Error, Result};
use crate::fetch::HttpClient;
use crate::project::Project;
use crate::utils::output::{print_detail, print_success, print_warning};
use clap::{ArgAction, Args};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug, Default)]
#[command(after_help = "\
Examples:
  sitegrab crawl https://example.com/              Save the start page and its media
  sitegrab crawl https://example.com/ -d 2         Follow links two levels deep
  sitegrab crawl https://example.com/ --same-host  Stay on example.com
  sitegrab crawl https://example.com/ --format json")]
pub struct CrawlArgs {
    /// Start URL (http or https)
    pub url: String,

    /// Maximum link depth to follow (0 = start page only)
    #[arg(short, long, value_name = "N")]
    pub depth: Option<u32>,

    /// Directory for saved text and media
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Concurrent media downloads
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Only follow links on the start URL's host
    #[arg(long)]
    pub same_host: bool,

    /// Stop after saving this many pages
    #[arg(long, value_name = "N")]
    pub max_pages: Option<usize>,

    /// Do not download images and videos
    #[arg(long)]
    pub no_media: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// User-Agent header to send
    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,

    /// Config file (default: nearest sitegrab.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format: human (default) or json
    #[arg(long, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// More diagnostics on stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Everything needed to build the client and crawler
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub options: CrawlOptions,
    pub timeout: Duration,
    pub user_agent: String,
}

/// Merge the project config with command-line overrides
pub fn resolve_settings(args: &CrawlArgs, project: &Project) -> Result<CrawlSettings> {
    let config = &project.config;

    if args.jobs == Some(0) {
        return Err(Error::Config("--jobs must be at least 1".to_string()));
    }
    if args.max_pages == Some(0) {
        return Err(Error::Config("--max-pages must be at least 1".to_string()));
    }
    if args.timeout == Some(0) {
        return Err(Error::Config("--timeout must be at least 1".to_string()));
    }

    let options = CrawlOptions {
        max_depth: args.depth.unwrap_or(config.crawl.max_depth),
        output_dir: args.output.clone().unwrap_or_else(|| project.output_dir()),
        same_host: args.same_host || config.crawl.same_host,
        max_pages: args.max_pages.or(config.crawl.max_pages),
        media: !args.no_media && config.media.enabled,
        workers: args.jobs.unwrap_or(config.media.workers),
    };

    Ok(CrawlSettings {
        options,
        timeout: Duration::from_secs(args.timeout.unwrap_or(config.http.timeout_secs)),
        user_agent: args
            .user_agent
            .clone()
            .unwrap_or_else(|| config.http.user_agent.clone()),
    })
}

pub fn execute(args: &CrawlArgs) -> Result<()> {
    let project = Project::load(args.config.as_deref())?;
    let settings = resolve_settings(args, &project)?;
    let client = HttpClient::with_settings(settings.timeout, &settings.user_agent)?;

    let human = !args.format.is_machine_readable() && !args.quiet;
    let progress = Progress::new(human && std::io::stdout().is_terminal());

    let crawler = Crawler::new(client, settings.options);
    let crawler = if human {
        let progress = progress.clone();
        crawler.with_events(move |event| progress.on_event(event))
    } else {
        crawler
    };

    let report = crawler.crawl(&args.url);
    progress.finish();
    let report = report?;

    match args.format {
        OutputFormat::Json => println!("{}", CrawlOutput::from(report).to_json()?),
        OutputFormat::Human if !args.quiet => print_summary(&report),
        OutputFormat::Human => {}
    }

    Ok(())
}

/// Live progress for human output: per-item lines plus an optional spinner
#[derive(Clone)]
struct Progress {
    bar: Option<ProgressBar>,
    pages: Arc<AtomicUsize>,
    media: Arc<AtomicUsize>,
}

impl Progress {
    fn new(spinner: bool) -> Self {
        let bar = spinner.then(|| {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{spinner:.cyan} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        });

        Self {
            bar,
            pages: Arc::new(AtomicUsize::new(0)),
            media: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn on_event(&self, event: CrawlEvent<'_>) {
        match event {
            CrawlEvent::PageSaved(page) => {
                self.pages.fetch_add(1, Ordering::Relaxed);
                self.line(format!("Crawling: {}", page.url));
            }
            CrawlEvent::PageFailed(failure) => {
                self.line(format!("Skipped {}: {}", failure.url, failure.error));
            }
            CrawlEvent::MediaFinished(outcome) => {
                if let Some(line) = media_line(outcome) {
                    if outcome.is_downloaded() {
                        self.media.fetch_add(1, Ordering::Relaxed);
                    }
                    self.line(line);
                }
            }
        }

        if let Some(bar) = &self.bar {
            bar.set_message(format!(
                "{} pages, {} media files",
                self.pages.load(Ordering::Relaxed),
                self.media.load(Ordering::Relaxed)
            ));
        }
    }

    fn line(&self, msg: String) {
        match &self.bar {
            Some(bar) => bar.println(msg),
            None => println!("{}", msg),
        }
    }

    fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

fn media_line(outcome: &MediaOutcome) -> Option<String> {
    match &outcome.status {
        MediaStatus::Downloaded { .. } => Some(format!(
            "Downloaded {}: {}",
            outcome.kind.label(),
            outcome.path.display()
        )),
        MediaStatus::Failed { error } => Some(format!(
            "Failed {}: {} ({})",
            outcome.kind.label(),
            outcome.url,
            error
        )),
        MediaStatus::Skipped => None,
    }
}

fn print_summary(report: &CrawlReport) {
    println!();
    print_success(&format!(
        "Saved {} page(s) to {} in {:.1}s",
        report.pages.len(),
        report.output_dir.display(),
        report.duration_secs
    ));

    if !report.media.is_empty() {
        print_detail(&format!(
            "media: {} downloaded, {} already present, {} failed",
            report.media_downloaded(),
            report.media_skipped(),
            report.media_failed()
        ));
    }

    if !report.failures.is_empty() {
        print_warning(&format!("{} page(s) could not be saved:", report.failures.len()));
        for failure in &report.failures {
            print_detail(&format!("{} ({})", failure.url, failure.error));
        }
    }
}
