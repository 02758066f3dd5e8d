use async_trait::async_trait;
use std::path::{Path, PathBuf};
use crate::application::errors::BotError;

/// Control over the machine the bridge runs on.
///
/// Both operations are terminal for the current process; callers must not
/// attempt further work after invoking them.
#[async_trait]
pub trait Host: Send + Sync {
    async fn reboot(&self);
    async fn exit(&self, code: i32);
}

pub trait NetworkInfo: Send + Sync {
    fn local_address(&self) -> String;
}

/// The configuration file as a replaceable artifact.
pub trait ConfigStore: Send + Sync {
    fn path(&self) -> &Path;

    fn file_name(&self) -> String {
        self.path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Whether the process currently runs from the application directory
    fn is_app_directory(&self) -> bool;

    /// Replace the file contents, returning the written path
    fn replace(&self, contents: &[u8]) -> Result<PathBuf, BotError>;
}
