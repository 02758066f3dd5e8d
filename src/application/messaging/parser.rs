//! Message parser - Parses raw inbound text into structured messages

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::domain::entities::{Attachment, Content, Message, User};

/// `/name`, optionally addressed as `/name@botname`, followed by arguments.
static COMMAND_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^/([A-Za-z]+)(?:@[A-Za-z0-9_]+)?(?:\s+(.*))?$")
        .expect("command pattern is valid")
});

/// Parses incoming messages into structured Message objects
#[derive(Debug, Default, Clone)]
pub struct MessageParser;

impl MessageParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a text message
    pub fn parse(&self, chat_id: impl Into<String>, text: impl Into<String>, sender: Option<User>) -> Message {
        let text = text.into();
        let chat_id = chat_id.into();

        let content = match COMMAND_PATTERN.captures(text.trim()) {
            Some(caps) => {
                let name = caps.get(1).map(|m| m.as_str().to_lowercase()).unwrap_or_default();
                let args = caps
                    .get(2)
                    .map(|m| m.as_str().split_whitespace().map(str::to_string).collect())
                    .unwrap_or_default();
                Content::Command { name, args }
            }
            None if text.trim().is_empty() => Content::Empty,
            None => Content::Text(text),
        };

        Message::new(chat_id, content).with_sender(sender)
    }

    /// Parse an uploaded document
    pub fn parse_document(&self, chat_id: impl Into<String>, attachment: Attachment, sender: Option<User>) -> Message {
        Message::from_document(chat_id, attachment).with_sender(sender)
    }
}
