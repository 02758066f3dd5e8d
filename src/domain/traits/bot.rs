use async_trait::async_trait;
use crate::application::errors::TransportError;
use crate::domain::entities::{FileUpload, GroupDestination, Recipient};

/// Bot trait - the session-oriented chat client.
///
/// Implementations hold a long-lived session: `start` opens it and `stop`
/// releases it. Every send classifies its failure as a `TransportError` so
/// the delivery engine can decide whether to retry.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Open the session (fetch identity, validate token)
    async fn start(&self) -> Result<(), TransportError>;

    /// Release the session
    async fn stop(&self);

    /// Send a text message to a chat
    async fn send_message(&self, chat: &Recipient, text: &str) -> Result<String, TransportError>;

    /// Upload a file to a chat
    async fn send_file(&self, chat: &Recipient, upload: &FileUpload) -> Result<String, TransportError>;

    /// Show a chat action ("upload_document", "typing", ...)
    async fn send_chat_action(&self, chat: &Recipient, action: &str) -> Result<(), TransportError>;

    /// Fetch the contents of a file the operator uploaded
    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, TransportError>;

    /// Get bot info
    fn bot_info(&self) -> BotInfo;
}

/// Stateless "send message into a forum thread" endpoint.
#[async_trait]
pub trait TopicChannel: Send + Sync {
    async fn post_to_thread(
        &self,
        group: &GroupDestination,
        thread_id: i64,
        text: &str,
    ) -> Result<(), TransportError>;
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
    pub username: String,
}
