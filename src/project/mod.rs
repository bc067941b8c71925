pub mod config;
pub mod root;

pub use config::Config;

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Effective configuration together with where it came from
#[derive(Debug, Clone)]
pub struct Project {
    /// Directory holding the config file (None when running on defaults)
    pub root: Option<PathBuf>,
    /// Path of the loaded config file
    pub config_path: Option<PathBuf>,
    pub config: Config,
}

impl Project {
    /// Built-in defaults, no config file
    pub fn defaults() -> Self {
        Self {
            root: None,
            config_path: None,
            config: Config::default(),
        }
    }

    /// Find `sitegrab.toml` by walking up from the current working directory.
    ///
    /// Falls back to defaults when there is none.
    pub fn find() -> Result<Self> {
        match root::find_project_root_from_cwd()? {
            Some(root) => Self::from_root(&root),
            None => Ok(Self::defaults()),
        }
    }

    /// Load the config file in `root`
    pub fn from_root(root: &Path) -> Result<Self> {
        let config = config::load_config(root)?.unwrap_or_default();
        Ok(Self {
            root: Some(root.to_path_buf()),
            config_path: Some(root.join(config::CONFIG_FILE)),
            config,
        })
    }

    /// Load an explicit config file; a missing file is an error
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let config = config::load_config_file(path)?;
        let root = path
            .parent()
            .map(|p| if p.as_os_str().is_empty() { Path::new(".") } else { p })
            .map(Path::to_path_buf);

        Ok(Self {
            root,
            config_path: Some(path.to_path_buf()),
            config,
        })
    }

    /// Use `explicit` if given, otherwise discover from the working directory
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => Self::find(),
        }
    }

    /// Output directory from the config, anchored at the project root
    pub fn output_dir(&self) -> PathBuf {
        let dir = &self.config.crawl.output_dir;
        match &self.root {
            Some(root) if dir.is_relative() => root.join(dir),
            _ => dir.clone(),
        }
    }
}
