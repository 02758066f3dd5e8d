use async_trait::async_trait;
use std::path::PathBuf;
use crate::application::errors::BotError;

/// Metrics the monitor can plot over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    ProcessingTime,
    Availability,
}

impl Metric {
    /// Column name in the monitor's data export
    pub fn column(self) -> &'static str {
        match self {
            Metric::ProcessingTime => "processing_time",
            Metric::Availability => "availability",
        }
    }

    /// Axis label for the plot
    pub fn label(self) -> &'static str {
        match self {
            Metric::ProcessingTime => "Processing time in seconds",
            Metric::Availability => "Available",
        }
    }
}

/// The external monitoring engine, seen through the narrow interface the
/// bridge needs.
#[async_trait]
pub trait Monitor: Send + Sync {
    async fn last_status(&self) -> String;
    async fn status_list(&self) -> String;
    async fn proxy_status(&self) -> String;

    /// Persist collected data so exports are current
    async fn save_state(&self) -> Result<(), BotError>;

    fn log_file_path(&self) -> Option<PathBuf>;

    /// Render a plot of `metric` and return the image path
    async fn plot_over_time(&self, metric: Metric) -> Result<PathBuf, BotError>;

    async fn start_monitoring(&self) -> Result<(), BotError>;
    async fn stop_monitoring(&self) -> Result<(), BotError>;
}
