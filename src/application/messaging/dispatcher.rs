//! Command dispatcher - runs operator commands against the monitor
//!
//! Messages are handled strictly one at a time: `handle` takes `&mut self`,
//! so a second message cannot start before the first one finishes.

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::delivery::DeliveryEngine;
use crate::domain::entities::{render_listing, Attachment, CommandKind, Content, FileUpload, Message, Recipient};
use crate::domain::traits::{Bot, ConfigStore, Host, Metric, Monitor};

/// Dispatcher state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Idle,
    Handling(CommandKind),
    HandlingUpload,
}

pub struct CommandDispatcher {
    engine: Arc<DeliveryEngine>,
    bot: Arc<dyn Bot>,
    monitor: Arc<dyn Monitor>,
    config_store: Arc<dyn ConfigStore>,
    host: Arc<dyn Host>,
    recipient: Option<Recipient>,
    data_file: PathBuf,
    state: DispatcherState,
}

impl CommandDispatcher {
    pub fn new(
        engine: Arc<DeliveryEngine>,
        bot: Arc<dyn Bot>,
        monitor: Arc<dyn Monitor>,
        config_store: Arc<dyn ConfigStore>,
        host: Arc<dyn Host>,
    ) -> Self {
        Self {
            engine,
            bot,
            monitor,
            config_store,
            host,
            recipient: None,
            data_file: PathBuf::from("data.csv"),
            state: DispatcherState::Idle,
        }
    }

    /// Destination of file replies
    pub fn with_recipient(mut self, recipient: Option<Recipient>) -> Self {
        self.recipient = recipient;
        self
    }

    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = path.into();
        self
    }

    pub fn state(&self) -> DispatcherState {
        self.state
    }

    /// Process one inbound message
    pub async fn handle(&mut self, message: Message) {
        if !self.is_operator(&message) {
            if !matches!(message.content, Content::Text(_) | Content::Empty) {
                tracing::warn!(
                    "[{}] Ignoring message from {}: not the configured operator",
                    message.chat_id,
                    message.sender.as_ref().map(|u| u.display_name()).unwrap_or_else(|| "unknown sender".to_string())
                );
            }
            return;
        }

        match &message.content {
            Content::Command { name, .. } => match CommandKind::from_name(name) {
                Some(kind) => {
                    tracing::info!("[{}] /{}", message.chat_id, kind.name());
                    self.state = DispatcherState::Handling(kind);
                    self.run_command(kind, &message).await;
                }
                None => tracing::debug!("[{}] Ignoring unknown command /{}", message.chat_id, name),
            },
            Content::Document(attachment) => {
                tracing::info!("[{}] Received document {:?}", message.chat_id, attachment.file_name);
                self.state = DispatcherState::HandlingUpload;
                self.handle_upload(&message, attachment).await;
            }
            Content::Text(_) | Content::Empty => {}
        }
        self.state = DispatcherState::Idle;
    }

    /// Only the configured recipient may drive the monitor
    fn is_operator(&self, message: &Message) -> bool {
        self.recipient
            .as_ref()
            .is_some_and(|r| r.matches(&message.chat_id, message.sender.as_ref()))
    }

    async fn run_command(&self, kind: CommandKind, message: &Message) {
        match kind {
            CommandKind::Status => {
                let status = self.monitor.last_status().await;
                self.reply(message, &status).await;
            }
            CommandKind::ListStatus => {
                let statuses = self.monitor.status_list().await;
                self.reply(message, &format!("Overview of all recent statuses: \n{}", statuses))
                    .await;
            }
            CommandKind::ProxyStatus => {
                let status = self.monitor.proxy_status().await;
                self.reply(message, &status).await;
            }
            CommandKind::Terminate => {
                self.save_state().await;
                self.reply(message, "Terminating the monitor... \nTo start the monitor again, reboot.")
                    .await;
                self.host.exit(0).await;
            }
            CommandKind::Reboot => {
                self.save_state().await;
                self.reply(message, "Rebooting, I'll be back...").await;
                self.host.reboot().await;
            }
            CommandKind::GetData => {
                self.save_state().await;
                let upload = FileUpload::document(&self.data_file).with_caption("Here's the data file!");
                self.engine.deliver_file(self.recipient.as_ref(), &upload).await;
            }
            CommandKind::GetLog => {
                self.save_state().await;
                let log_path = self.monitor.log_file_path();
                self.engine
                    .deliver_log_file(self.recipient.as_ref(), log_path.as_deref())
                    .await;
            }
            CommandKind::PlotProcessingTime => self.send_plot(message, Metric::ProcessingTime).await,
            CommandKind::PlotAvailability => self.send_plot(message, Metric::Availability).await,
            CommandKind::GetConfig => {
                let upload = FileUpload::document(self.config_store.path())
                    .with_caption("Here's the configuration file!");
                self.engine.deliver_file(self.recipient.as_ref(), &upload).await;
            }
            CommandKind::SetConfig => {
                let text = format!(
                    "Attach a new `{}` in your next message and it will be set! Don't forget to delete {} in case something relevant changed.",
                    self.config_store.file_name(),
                    self.data_file.display()
                );
                self.reply(message, &text).await;
            }
            CommandKind::Help => {
                let listing = render_listing("Commands available:");
                self.reply(message, &listing).await;
            }
        }
    }

    async fn send_plot(&self, message: &Message, metric: Metric) {
        match self.monitor.plot_over_time(metric).await {
            Ok(path) => {
                let upload = FileUpload::photo(path).with_caption("Here's the plot!");
                self.engine.deliver_file(self.recipient.as_ref(), &upload).await;
            }
            Err(e) => {
                tracing::warn!("Failed to plot {}: {}", metric.column(), e);
                self.reply(message, &format!("Couldn't create the {} plot: {}", metric.column(), e))
                    .await;
            }
        }
    }

    async fn handle_upload(&self, message: &Message, attachment: &Attachment) {
        let config_name = self.config_store.file_name();

        if !is_config_upload(&config_name, attachment) {
            self.reply(
                message,
                &format!(
                    "If you were trying to set a new {}, make sure the file is named exactly that.",
                    config_name
                ),
            )
            .await;
            return;
        }

        if !self.config_store.is_app_directory() {
            tracing::warn!("Refusing to replace {} outside the application directory", config_name);
            self.reply(
                message,
                &format!(
                    "The current working directory is not the directory of this application. Aborting {} replacement.",
                    config_name
                ),
            )
            .await;
            return;
        }

        let contents = match self.bot.download_file(&attachment.file_id).await {
            Ok(contents) => contents,
            Err(e) => {
                tracing::error!("Failed to download new {}: {}", config_name, e);
                self.reply(message, &format!("Couldn't download the new {}: {}", config_name, e))
                    .await;
                return;
            }
        };

        match self.config_store.replace(&contents) {
            Ok(path) => {
                tracing::info!("Replaced {} ({} bytes)", path.display(), contents.len());
                self.reply(
                    message,
                    &format!("Successfully set the new {} ({}). Reboot to apply.", config_name, path.display()),
                )
                .await;
            }
            Err(e) => {
                tracing::error!("Failed to write new {}: {}", config_name, e);
                self.reply(message, &format!("Couldn't write the new {}: {}", config_name, e))
                    .await;
            }
        }
    }

    async fn save_state(&self) {
        if let Err(e) = self.monitor.save_state().await {
            tracing::error!("Failed to save monitor state: {}", e);
        }
    }

    async fn reply(&self, message: &Message, text: &str) {
        self.engine.deliver(message.reply_to().as_ref(), text).await;
    }
}

/// MIME types accepted for a configuration file with the given name.
fn recognized_config_types(config_name: &str) -> &'static [&'static str] {
    let extension = config_name.rsplit('.').next().unwrap_or_default().to_lowercase();
    match extension.as_str() {
        "yaml" | "yml" => &["application/x-yaml", "application/yaml", "text/yaml", "text/x-yaml"],
        "json" => &["application/json"],
        "toml" => &["application/toml", "text/x-toml"],
        _ => &[],
    }
}

fn is_config_upload(config_name: &str, attachment: &Attachment) -> bool {
    let name_matches = attachment.file_name.as_deref() == Some(config_name);
    let type_matches = attachment
        .mime_type
        .as_deref()
        .map(|mime| recognized_config_types(config_name).iter().any(|t| *t == mime))
        .unwrap_or(false);
    name_matches && type_matches
}
