use super::{Recipient, User};

/// Metadata of a document attached to an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_id: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

impl Attachment {
    pub fn new(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            file_name: None,
            mime_type: None,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn with_mime_type(mut self, mime: impl Into<String>) -> Self {
        self.mime_type = Some(mime.into());
        self
    }
}

/// Message content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Command { name: String, args: Vec<String> },
    Document(Attachment),
    Empty,
}

/// Represents an inbound operator message
#[derive(Debug, Clone)]
pub struct Message {
    pub chat_id: String,
    pub sender: Option<User>,
    pub content: Content,
}

impl Message {
    pub fn new(chat_id: impl Into<String>, content: Content) -> Self {
        Self {
            chat_id: chat_id.into(),
            sender: None,
            content,
        }
    }

    pub fn from_document(chat_id: impl Into<String>, attachment: Attachment) -> Self {
        Self::new(chat_id, Content::Document(attachment))
    }

    pub fn with_sender(mut self, user: Option<User>) -> Self {
        self.sender = user;
        self
    }

    /// Where an inline reply to this message goes.
    pub fn reply_to(&self) -> Option<Recipient> {
        Recipient::parse(&self.chat_id)
    }
}
