//! Notification service - turns monitor events into outbound messages

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::delivery::DeliveryEngine;
use crate::application::routing::TopicRouter;
use crate::domain::entities::Recipient;
use crate::domain::traits::{NetworkInfo, Notifier};

pub const NEWLY_AVAILABLE_TEXT: &str = "✅ Stock just flipped to AVAILABLE!";
pub const GOODBYE_TEXT: &str = "This bot is done scouting the shelves, goodbye!";

/// The [`Notifier`] used in production.
///
/// Events marked "topic" go through the router under the configured topic
/// key; without a key they are sent as direct messages instead.
pub struct NotificationService {
    engine: Arc<DeliveryEngine>,
    router: Arc<TopicRouter>,
    network: Arc<dyn NetworkInfo>,
    recipient: Option<Recipient>,
    topic_key: Option<String>,
}

impl NotificationService {
    pub fn new(engine: Arc<DeliveryEngine>, router: Arc<TopicRouter>, network: Arc<dyn NetworkInfo>) -> Self {
        Self {
            engine,
            router,
            network,
            recipient: None,
            topic_key: None,
        }
    }

    pub fn with_recipient(mut self, recipient: Option<Recipient>) -> Self {
        self.recipient = recipient;
        self
    }

    pub fn with_topic_key(mut self, topic_key: Option<String>) -> Self {
        self.topic_key = topic_key.filter(|k| !k.trim().is_empty());
        self
    }

    async fn notify_topic(&self, text: &str) -> bool {
        match &self.topic_key {
            Some(key) => self.router.route(key, text).await,
            None => {
                self.direct(text).await;
                false
            }
        }
    }

    async fn direct(&self, text: &str) {
        self.engine.deliver(self.recipient.as_ref(), text).await;
    }
}

#[async_trait]
impl Notifier for NotificationService {
    async fn on_start(&self) {
        let message = format!("New monitoring session!\nIP address: {}", self.network.local_address());
        tracing::info!("{}", message);
        self.notify_topic(&message).await;
        self.direct(&message).await;
    }

    async fn on_stop(&self) {
        self.direct(GOODBYE_TEXT).await;
    }

    async fn on_stock_available(&self, message: &str) {
        self.notify_topic(message).await;
    }

    async fn on_appointment_available(&self, message: &str) {
        self.direct(message).await;
    }

    async fn on_newly_available(&self) {
        self.notify_topic(NEWLY_AVAILABLE_TEXT).await;
    }

    async fn on_auto_report(&self, report: &str) {
        self.notify_topic(report).await;
        self.direct(report).await;
    }

    async fn on_proxy_depletion(&self, message: &str) {
        self.direct(message).await;
    }

    async fn on_long_processing_warning(&self, warning: &str) {
        self.direct(warning).await;
    }

    async fn on_connection_error(&self, error: &str) {
        self.direct(error).await;
    }

    async fn on_error(&self, error: &str, logfile_path: Option<PathBuf>) {
        tracing::error!("Monitor crashed: {}", error);
        let summary = format!(
            "<b>Oops!</b> Something went wrong, the monitor <i>crashed</i>.\n  Reason: {}",
            error
        );
        self.direct(&summary).await;
        self.engine
            .deliver_log_file(self.recipient.as_ref(), logfile_path.as_deref())
            .await;
    }
}
