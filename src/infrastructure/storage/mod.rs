//! File-based configuration store

use std::path::{Path, PathBuf};

use crate::application::errors::BotError;
use crate::domain::traits::ConfigStore;

/// The configuration file on disk
pub struct FileConfigStore {
    path: PathBuf,
    app_dir: PathBuf,
}

impl FileConfigStore {
    /// `app_dir` is the directory the process must run from before the file
    /// may be replaced.
    pub fn new(path: impl Into<PathBuf>, app_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            app_dir: app_dir.into(),
        }
    }

    /// Use the directory holding the config file as the application directory
    pub fn beside_config(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let app_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::new(path, app_dir)
    }

    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    fn is_within(&self, cwd: &Path) -> bool {
        match (cwd.canonicalize(), self.app_dir.canonicalize()) {
            (Ok(cwd), Ok(app_dir)) => cwd == app_dir,
            _ => false,
        }
    }
}

impl ConfigStore for FileConfigStore {
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_app_directory(&self) -> bool {
        match std::env::current_dir() {
            Ok(cwd) => self.is_within(&cwd),
            Err(e) => {
                tracing::warn!("Cannot determine working directory: {}", e);
                false
            }
        }
    }

    /// Write next to the target first, then rename over it
    fn replace(&self, contents: &[u8]) -> Result<PathBuf, BotError> {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".new");
        let staging = PathBuf::from(staging);

        std::fs::write(&staging, contents)?;
        std::fs::rename(&staging, &self.path)?;
        Ok(self.path.clone())
    }
}
