//! Diagnostic logging setup
//!
//! User-facing results go to stdout through `utils::output`; everything in
//! here is diagnostics on stderr. `RUST_LOG` takes precedence over flags.

use tracing_subscriber::EnvFilter;

/// Map `-q` / `-v` flags to a default filter directive
pub fn level_for(quiet: bool, verbose: u8) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(quiet: bool, verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sitegrab={}", level_for(quiet, verbose))));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
