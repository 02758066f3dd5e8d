//! Telegram adapter

pub mod topic;
pub mod types;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::sync::RwLock;
use std::time::Duration;

use crate::application::errors::TransportError;
use crate::domain::entities::{FileUpload, Recipient, UploadKind, COMMANDS};
use crate::domain::traits::{Bot, BotInfo};

pub use topic::TopicHttpClient;
use types::{ApiResponse, File, SentMessage, Update};

/// Telegram API base URL
pub const API_BASE: &str = "https://api.telegram.org";

/// Descriptions that mean the chat id will never work
const UNRESOLVABLE_MARKERS: &[&str] = &[
    "chat not found",
    "user not found",
    "peer_id_invalid",
    "chat_id is empty",
    "invalid user_id",
];

/// Telegram bot adapter.
///
/// Holds the bot session for the lifetime of the process: `start` fetches
/// the bot identity, `stop` releases it.
pub struct TelegramAdapter {
    token: String,
    api_base: String,
    client: Client,
    info: RwLock<BotInfo>,
}

impl TelegramAdapter {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, API_BASE)
    }

    /// Create an adapter talking to a custom API base URL (for testing)
    pub fn with_base_url(token: impl Into<String>, api_base: &str) -> Self {
        Self {
            token: token.into(),
            api_base: api_base.trim_end_matches('/').to_string(),
            client: Client::new(),
            info: RwLock::new(BotInfo {
                id: "unknown".to_string(),
                name: "stock-notifier".to_string(),
                username: "stock_notifier_bot".to_string(),
            }),
        }
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// First characters of the token, safe to log
    fn token_prefix(&self) -> String {
        self.token.chars().take(8).collect()
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.api_base, self.token, file_path)
    }

    /// Send a request and unwrap the Bot API envelope
    async fn call<T: DeserializeOwned>(&self, method: &str, request: RequestBuilder) -> Result<T, TransportError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        let envelope: ApiResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(TransportError::Parse(format!("{}: {}", method, e)));
            }
            Err(_) => return Err(classify(status.as_u16(), body)),
        };

        if !envelope.ok {
            let description = envelope.description.unwrap_or_else(|| status.to_string());
            tracing::warn!("{} failed: {}", method, description);
            return Err(classify(status.as_u16(), description));
        }

        envelope
            .result
            .ok_or_else(|| TransportError::Parse(format!("{}: missing result", method)))
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, method: &str, body: &B) -> Result<T, TransportError> {
        let request = self.client.post(self.api_url(method)).json(body);
        self.call(method, request).await
    }

    /// Get updates from Telegram using long polling
    pub async fn get_updates(&self, offset: i64, timeout: u64) -> Result<Vec<Update>, TransportError> {
        let body = json!({
            "offset": offset,
            "timeout": timeout,
            "allowed_updates": ["message"],
        });
        let request = self
            .client
            .post(self.api_url("getUpdates"))
            .timeout(Duration::from_secs(timeout + 10))
            .json(&body);
        self.call("getUpdates", request).await
    }

    /// Confirm every update below `offset` without waiting for new ones.
    ///
    /// Handlers such as /reboot never return to the next poll, so the batch
    /// must be confirmed before it is dispatched or it replays on restart.
    pub async fn acknowledge(&self, offset: i64) -> Result<(), TransportError> {
        let body = json!({
            "offset": offset,
            "timeout": 0,
            "limit": 1,
            "allowed_updates": ["message"],
        });
        let _: Vec<Update> = self.post_json("getUpdates", &body).await?;
        Ok(())
    }

    /// Register bot commands with Telegram
    pub async fn register_commands(&self) -> Result<(), TransportError> {
        #[derive(Serialize)]
        struct Command {
            command: &'static str,
            description: &'static str,
        }

        let commands: Vec<Command> = COMMANDS
            .iter()
            .map(|c| Command {
                command: c.name,
                description: c.description,
            })
            .collect();

        let _: bool = self
            .post_json("setMyCommands", &json!({ "commands": commands }))
            .await?;

        tracing::info!("Registered {} bot commands with Telegram", commands.len());
        Ok(())
    }
}

/// Map a rejected Bot API call onto the retry taxonomy
pub(crate) fn classify(status: u16, description: String) -> TransportError {
    let lower = description.to_lowercase();
    if UNRESOLVABLE_MARKERS.iter().any(|m| lower.contains(m)) {
        TransportError::Unresolvable(description)
    } else if (500..600).contains(&status) {
        TransportError::Connection(format!("server error {}: {}", status, description))
    } else {
        TransportError::Api { status, description }
    }
}

#[async_trait]
impl Bot for TelegramAdapter {
    async fn start(&self) -> Result<(), TransportError> {
        #[derive(serde::Deserialize)]
        struct Me {
            id: i64,
            first_name: String,
            username: Option<String>,
        }

        tracing::info!("Starting Telegram bot (token: {}...)", self.token_prefix());
        let me: Me = self.call("getMe", self.client.get(self.api_url("getMe"))).await?;

        let mut info = self.info.write().unwrap_or_else(|e| e.into_inner());
        *info = BotInfo {
            id: me.id.to_string(),
            name: me.first_name,
            username: me.username.unwrap_or_default(),
        };
        Ok(())
    }

    async fn stop(&self) {
        tracing::info!("Closing Telegram session for @{}", self.bot_info().username);
    }

    async fn send_message(&self, chat: &Recipient, text: &str) -> Result<String, TransportError> {
        tracing::debug!("Sending to {}: {}", chat, text);
        let body = json!({
            "chat_id": chat.as_str(),
            "text": text,
            "parse_mode": "HTML",
        });
        let sent: SentMessage = self.post_json("sendMessage", &body).await?;
        Ok(sent.message_id.to_string())
    }

    async fn send_file(&self, chat: &Recipient, upload: &FileUpload) -> Result<String, TransportError> {
        let (method, field) = match upload.kind {
            UploadKind::Document => ("sendDocument", "document"),
            UploadKind::Photo => ("sendPhoto", "photo"),
        };

        let bytes = tokio::fs::read(&upload.path).await?;
        tracing::debug!("Uploading {} ({} bytes) to {}", upload.path.display(), bytes.len(), chat);

        let part = reqwest::multipart::Part::bytes(bytes).file_name(upload.file_name());
        let mut form = reqwest::multipart::Form::new()
            .text("chat_id", chat.as_str().to_string())
            .part(field, part);
        if let Some(caption) = &upload.caption {
            form = form.text("caption", caption.clone()).text("parse_mode", "HTML");
        }

        let request = self.client.post(self.api_url(method)).multipart(form);
        let sent: SentMessage = self.call(method, request).await?;
        Ok(sent.message_id.to_string())
    }

    async fn send_chat_action(&self, chat: &Recipient, action: &str) -> Result<(), TransportError> {
        let body = json!({
            "chat_id": chat.as_str(),
            "action": action,
        });
        let _: bool = self.post_json("sendChatAction", &body).await?;
        Ok(())
    }

    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, TransportError> {
        let file: File = self.post_json("getFile", &json!({ "file_id": file_id })).await?;
        let file_path = file
            .file_path
            .ok_or_else(|| TransportError::Parse(format!("no download path for file {}", file_id)))?;

        let response = self.client.get(self.file_url(&file_path)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(classify(status.as_u16(), format!("file download failed: {}", status)));
        }
        Ok(response.bytes().await?.to_vec())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
