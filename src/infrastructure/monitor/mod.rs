//! File-backed view of the monitoring engine
//!
//! The engine runs as its own process and keeps snapshots in a state
//! directory:
//!
//! - `last_status.txt`, `status_list.txt`, `proxy_status.txt`
//! - `monitor.log`
//! - `plots/<metric>.png`
//!
//! Requests from the bridge (save, start, stop) are left as marker files
//! the engine picks up on its next cycle.

use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};

use crate::application::errors::BotError;
use crate::domain::traits::{Metric, Monitor};

const NO_STATUS: &str = "No status available yet.";

pub struct SnapshotMonitor {
    state_dir: PathBuf,
}

impl SnapshotMonitor {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
        }
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    async fn read_snapshot(&self, name: &str) -> String {
        let path = self.state_dir.join(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) if !text.trim().is_empty() => text.trim_end().to_string(),
            Ok(_) => NO_STATUS.to_string(),
            Err(e) => {
                tracing::debug!("No snapshot at {}: {}", path.display(), e);
                NO_STATUS.to_string()
            }
        }
    }

    async fn write_marker(&self, name: &str) -> Result<(), BotError> {
        tokio::fs::create_dir_all(&self.state_dir).await?;
        tokio::fs::write(self.state_dir.join(name), Utc::now().to_rfc3339()).await?;
        Ok(())
    }
}

#[async_trait]
impl Monitor for SnapshotMonitor {
    async fn last_status(&self) -> String {
        self.read_snapshot("last_status.txt").await
    }

    async fn status_list(&self) -> String {
        self.read_snapshot("status_list.txt").await
    }

    async fn proxy_status(&self) -> String {
        self.read_snapshot("proxy_status.txt").await
    }

    async fn save_state(&self) -> Result<(), BotError> {
        self.write_marker("save.request").await
    }

    fn log_file_path(&self) -> Option<PathBuf> {
        let path = self.state_dir.join("monitor.log");
        path.exists().then_some(path)
    }

    async fn plot_over_time(&self, metric: Metric) -> Result<PathBuf, BotError> {
        let path = self.state_dir.join("plots").join(format!("{}.png", metric.column()));
        if tokio::fs::try_exists(&path).await? {
            Ok(path)
        } else {
            Err(BotError::Monitor(format!(
                "no {} plot ({}) has been rendered yet",
                metric.column(),
                metric.label()
            )))
        }
    }

    async fn start_monitoring(&self) -> Result<(), BotError> {
        tracing::info!("Monitoring session started (state in {})", self.state_dir.display());
        self.write_marker("running").await
    }

    async fn stop_monitoring(&self) -> Result<(), BotError> {
        tracing::info!("Monitoring session stopped");
        match tokio::fs::remove_file(self.state_dir.join("running")).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
