//! Stateless forum-topic sender
//!
//! A single `sendMessage` POST per call, independent of the bot session.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::application::errors::TransportError;
use crate::domain::entities::GroupDestination;
use crate::domain::traits::TopicChannel;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct TopicMessage<'a> {
    chat_id: &'a str,
    message_thread_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

pub struct TopicHttpClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl TopicHttpClient {
    pub fn new(bot_token: &str) -> Self {
        Self::with_base_url(bot_token, super::API_BASE)
    }

    pub fn with_base_url(bot_token: &str, api_base: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), bot_token),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl TopicChannel for TopicHttpClient {
    async fn post_to_thread(&self, group: &GroupDestination, thread_id: i64, text: &str) -> Result<(), TransportError> {
        let payload = TopicMessage {
            chat_id: group.as_str(),
            message_thread_id: thread_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let response = self
            .client
            .post(format!("{}/sendMessage", self.base_url))
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let description = response.text().await.unwrap_or_default();
        Err(TransportError::Api {
            status: status.as_u16(),
            description,
        })
    }
}
