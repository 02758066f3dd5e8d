//! Console adapter for development/testing

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use crate::application::errors::TransportError;
use crate::domain::entities::{FileUpload, GroupDestination, Recipient};
use crate::domain::traits::{Bot, BotInfo, TopicChannel};

/// Console bot adapter for local development.
///
/// Outbound messages are printed; operator commands are read from stdin.
pub struct ConsoleAdapter {
    info: BotInfo,
    input: Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self {
            info: BotInfo {
                id: "console".to_string(),
                name: "stock-notifier".to_string(),
                username: "console".to_string(),
            },
            input: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    /// Next line typed by the operator, `None` on end of input
    pub async fn read_line(&self) -> Option<String> {
        let mut input = self.input.lock().await;
        match input.next_line().await {
            Ok(line) => line.map(|l| l.trim().to_string()),
            Err(e) => {
                tracing::warn!("Failed to read console input: {}", e);
                None
            }
        }
    }
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn start(&self) -> Result<(), TransportError> {
        tracing::info!("Starting console bot (dev mode)");
        Ok(())
    }

    async fn stop(&self) {
        tracing::info!("Console bot stopped");
    }

    async fn send_message(&self, chat: &Recipient, text: &str) -> Result<String, TransportError> {
        println!("[BOT -> {}] {}", chat, text);
        Ok("console_msg".to_string())
    }

    async fn send_file(&self, chat: &Recipient, upload: &FileUpload) -> Result<String, TransportError> {
        println!(
            "[BOT -> {}] <{:?} {}> {}",
            chat,
            upload.kind,
            upload.path.display(),
            upload.caption.as_deref().unwrap_or("")
        );
        Ok("console_file".to_string())
    }

    async fn send_chat_action(&self, _chat: &Recipient, _action: &str) -> Result<(), TransportError> {
        Ok(())
    }

    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, TransportError> {
        Err(TransportError::Api {
            status: 501,
            description: format!("console mode cannot download file {}", file_id),
        })
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}

#[async_trait]
impl TopicChannel for ConsoleAdapter {
    async fn post_to_thread(&self, group: &GroupDestination, thread_id: i64, text: &str) -> Result<(), TransportError> {
        println!("[TOPIC {}#{}] {}", group, thread_id, text);
        Ok(())
    }
}
