//! Project root detection
//!
//! Walks up the directory tree looking for `sitegrab.toml`, so a crawl
//! started from a subdirectory still picks up the project's settings.

use crate::error::Result;
use crate::project::config::CONFIG_FILE;
use std::path::{Path, PathBuf};

/// Find the nearest directory at or above `start_dir` containing `sitegrab.toml`.
///
/// Returns `None` if no ancestor has one.
pub fn find_project_root(start_dir: &Path) -> Result<Option<PathBuf>> {
    // Canonicalize the start directory to resolve symlinks and get absolute path
    let mut current = start_dir
        .canonicalize()
        .unwrap_or_else(|_| start_dir.to_path_buf());

    loop {
        if is_project_root(&current) {
            return Ok(Some(current));
        }

        match current.parent() {
            Some(parent) if parent != current => current = parent.to_path_buf(),
            _ => break,
        }
    }

    Ok(None)
}

/// Convenience wrapper around `find_project_root` that uses `std::env::current_dir()`.
pub fn find_project_root_from_cwd() -> Result<Option<PathBuf>> {
    let cwd = std::env::current_dir()?;
    find_project_root(&cwd)
}

/// Check if a directory holds a config file
pub fn is_project_root(dir: &Path) -> bool {
    dir.join(CONFIG_FILE).is_file()
}
