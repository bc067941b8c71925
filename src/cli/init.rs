//! `sitegrab init` command implementation
//!
//! Writes a `sitegrab.toml` with commented defaults.

use crate::cli::output_format::OutputFormat;
use crate::cli::output_types::{CommandOutput, InitOutput};
use crate::error::{Error, Result};
use crate::project::config::{generate_config_template, CONFIG_FILE};
use crate::utils::output::{print_detail, print_success};
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Args)]
#[command(after_help = "\
Examples:
  sitegrab init                   Create sitegrab.toml in the current directory
  sitegrab init mysite            Create mysite/sitegrab.toml
  sitegrab init --force           Replace an existing sitegrab.toml")]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Overwrite an existing sitegrab.toml
    #[arg(long)]
    pub force: bool,

    /// Output format: human (default) or json
    #[arg(long, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

pub fn execute(args: &InitArgs) -> Result<()> {
    let dir = args.path.as_deref().unwrap_or_else(|| Path::new("."));
    let output = write_template(dir, args.force)?;

    match args.format {
        OutputFormat::Json => println!("{}", output.to_json()?),
        OutputFormat::Human => {
            let verb = if output.overwritten { "Replaced" } else { "Created" };
            print_success(&format!("{} {}", verb, output.config_file.display()));
            print_detail("next: sitegrab crawl <URL>");
        }
    }

    Ok(())
}

/// Create `dir` if needed and write the config template into it
pub fn write_template(dir: &Path, force: bool) -> Result<InitOutput> {
    let config_file = dir.join(CONFIG_FILE);
    let exists = config_file.exists();

    if exists && !force {
        return Err(Error::Config(format!(
            "{} already exists. Use --force to overwrite.",
            config_file.display()
        )));
    }

    std::fs::create_dir_all(dir).map_err(|source| Error::Write {
        path: dir.to_path_buf(),
        source,
    })?;
    std::fs::write(&config_file, generate_config_template()).map_err(|source| Error::Write {
        path: config_file.clone(),
        source,
    })?;

    Ok(InitOutput {
        config_file,
        overwritten: exists,
    })
}
