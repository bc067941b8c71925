//! `sitegrab env` command implementation
//!
//! Shows the effective configuration and which file it came from.

use crate::cli::output_format::OutputFormat;
use crate::cli::output_types::{CommandOutput, EnvOutput};
use crate::error::Result;
use crate::project::Project;
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
#[command(after_help = "\
Examples:
  sitegrab env                    Show effective configuration
  sitegrab env --format json      Output as JSON")]
pub struct EnvArgs {
    /// Config file (default: nearest sitegrab.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format: human (default) or json
    #[arg(long, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

pub fn execute(args: &EnvArgs) -> Result<()> {
    let project = Project::load(args.config.as_deref())?;
    let output = env_output(&project);

    match args.format {
        OutputFormat::Json => println!("{}", output.to_json()?),
        OutputFormat::Human => print_human_output(&output),
    }

    Ok(())
}

pub fn env_output(project: &Project) -> EnvOutput {
    let config = &project.config;
    EnvOutput {
        version: env!("CARGO_PKG_VERSION").to_string(),
        config_file: project.config_path.clone(),
        max_depth: config.crawl.max_depth,
        output_dir: project.output_dir(),
        same_host: config.crawl.same_host,
        max_pages: config.crawl.max_pages,
        media_enabled: config.media.enabled,
        media_workers: config.media.workers,
        timeout_secs: config.http.timeout_secs,
        user_agent: config.http.user_agent.clone(),
    }
}

fn print_human_output(output: &EnvOutput) {
    println!("sitegrab {}", output.version);
    println!();
    println!("Config");
    match &output.config_file {
        Some(path) => println!("  file:        {}", path.display()),
        None => println!("  file:        (none, using defaults)"),
    }
    println!();
    println!("Crawl");
    println!("  max depth:   {}", output.max_depth);
    println!("  output dir:  {}", output.output_dir.display());
    println!("  same host:   {}", output.same_host);
    match output.max_pages {
        Some(n) => println!("  max pages:   {}", n),
        None => println!("  max pages:   unlimited"),
    }
    println!();
    println!("Media");
    println!("  enabled:     {}", output.media_enabled);
    println!("  workers:     {}", output.media_workers);
    println!();
    println!("HTTP");
    println!("  timeout:     {}s", output.timeout_secs);
    println!("  user agent:  {}", output.user_agent);
}
