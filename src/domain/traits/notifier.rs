use async_trait::async_trait;
use std::path::PathBuf;

/// Callback surface the monitor uses to push notifications.
///
/// None of these fail: delivery problems are absorbed and logged below this
/// boundary.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn on_start(&self);
    async fn on_stop(&self);
    async fn on_stock_available(&self, message: &str);
    async fn on_appointment_available(&self, message: &str);
    async fn on_newly_available(&self);
    async fn on_auto_report(&self, report: &str);
    async fn on_proxy_depletion(&self, message: &str);
    async fn on_long_processing_warning(&self, warning: &str);
    async fn on_connection_error(&self, error: &str);
    async fn on_error(&self, error: &str, logfile_path: Option<PathBuf>);
}
