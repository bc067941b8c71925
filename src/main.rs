use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Parser, Subcommand};
use sitegrab::{cli, utils};
use std::process;

#[derive(Parser)]
#[command(name = "sitegrab")]
#[command(version)]
#[command(about = "Crawl a site and save page text, images and videos to disk")]
#[command(
    long_about = "sitegrab fetches a start page, saves its visible text, downloads its images \
and videos on a pool of worker threads, and follows links up to a maximum depth."
)]
#[command(after_help = "\
Getting started:
  sitegrab crawl https://example.com/        Save one page and its media
  sitegrab crawl https://example.com/ -d 1   Also follow its links
  sitegrab init                              Create sitegrab.toml with defaults
  sitegrab env                               Show effective configuration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl from a start URL
    #[command(display_order = 1)]
    Crawl(cli::crawl::CrawlArgs),
    /// Create a sitegrab.toml with commented defaults
    #[command(display_order = 10)]
    Init(cli::init::InitArgs),
    /// Show effective configuration
    #[command(display_order = 11)]
    Env(cli::env::EnvArgs),
}

/// Handle clap parse errors with custom suggestions for common mistakes
fn handle_parse_error(mut err: clap::Error) -> ! {
    if err.kind() == ErrorKind::InvalidSubcommand {
        if let Some(ContextValue::String(cmd)) = err.get(ContextKind::InvalidSubcommand) {
            let suggestions = match cmd.as_str() {
                "get" | "fetch" | "scrape" | "download" | "run" => Some(vec![
                    "use 'sitegrab crawl' to fetch pages: sitegrab crawl https://example.com/"
                        .into(),
                ]),
                "config" | "show" => Some(vec![
                    "use 'sitegrab env' to show configuration: sitegrab env".into(),
                ]),
                _ => None,
            };
            if let Some(suggestions) = suggestions {
                err.insert(
                    ContextKind::Suggested,
                    ContextValue::StyledStrs(suggestions),
                );
            }
        }
    }
    err.exit()
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => handle_parse_error(e),
    };

    match &cli.command {
        Commands::Crawl(args) => utils::logging::init(args.quiet, args.verbose),
        _ => utils::logging::init(false, 0),
    }

    let result = match &cli.command {
        Commands::Crawl(args) => cli::crawl::execute(args),
        Commands::Init(args) => cli::init::execute(args),
        Commands::Env(args) => cli::env::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
