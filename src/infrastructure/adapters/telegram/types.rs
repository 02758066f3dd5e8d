//! Telegram Bot API types

use serde::{Deserialize, Serialize};

use crate::application::messaging::MessageParser;
use crate::domain::entities::{self, Attachment};

/// Generic Telegram API response wrapper
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub description: Option<String>,
    pub result: Option<T>,
}

/// Telegram update type
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
    pub document: Option<Document>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Document {
    pub file_id: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

/// Sent message result (we only need message_id)
#[derive(Debug, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
}

/// `getFile` result
#[derive(Debug, Deserialize)]
pub struct File {
    pub file_path: Option<String>,
}

impl Update {
    /// Convert into a domain message; `None` for updates we do not handle
    pub fn into_message(self, parser: &MessageParser) -> Option<entities::Message> {
        let msg = self.message?;
        let chat_id = msg.chat.id.to_string();
        let sender = msg.from.map(|u| {
            let mut user = entities::User::new(u.id.to_string());
            user.username = u.username;
            user.first_name = u.first_name;
            user
        });

        if let Some(doc) = msg.document {
            let attachment = Attachment {
                file_id: doc.file_id,
                file_name: doc.file_name,
                mime_type: doc.mime_type,
            };
            return Some(parser.parse_document(chat_id, attachment, sender));
        }

        msg.text.map(|text| parser.parse(chat_id, text, sender))
    }
}

/// Get the next update offset
pub fn next_offset(updates: &[Update], current: i64) -> i64 {
    updates
        .iter()
        .map(|u| u.update_id + 1)
        .max()
        .unwrap_or(current)
}
