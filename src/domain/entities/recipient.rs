use std::fmt;

use super::User;

/// Direct-message destination: a numeric chat id or an `@username` handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Recipient(String);

impl Recipient {
    /// Returns `None` for blank handles so an empty config value means
    /// "no recipient configured".
    pub fn parse(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The handle without its `@`, when this is a username
    pub fn username(&self) -> Option<&str> {
        self.0.strip_prefix('@')
    }

    /// Whether an inbound message from `chat_id`, sent by `sender`, comes
    /// from this recipient.
    pub fn matches(&self, chat_id: &str, sender: Option<&User>) -> bool {
        if self.0 == chat_id {
            return true;
        }
        match (self.username(), sender.and_then(|u| u.username.as_deref())) {
            (Some(wanted), Some(actual)) => wanted.eq_ignore_ascii_case(actual),
            _ => false,
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
