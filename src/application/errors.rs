//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Monitor error: {0}")]
    Monitor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the chat transports.
///
/// The delivery engine decides between retrying, abandoning and escalating
/// based on the variant, so adapters must classify carefully.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connectivity problem; the same request may succeed later.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The destination does not resolve to a chat. Never retried.
    #[error("Unresolvable destination: {0}")]
    Unresolvable(String),

    #[error("API error ({status}): {description}")]
    Api { status: u16, description: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::Connection(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() || e.is_request() {
            TransportError::Connection(e.to_string())
        } else if e.is_decode() {
            TransportError::Parse(e.to_string())
        } else {
            TransportError::Api {
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                description: e.to_string(),
            }
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
