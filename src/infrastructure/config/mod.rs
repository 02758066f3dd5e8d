//! Configuration management

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::application::delivery::DeliveryPolicy;
use crate::application::errors::ConfigError;
use crate::domain::entities::{GroupDestination, Recipient, TopicRegistry};

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Chat id (or `@username`) receiving direct messages
    pub recipient: Option<String>,
    /// Forum group hosting the topic threads
    pub group_id: Option<String>,
    /// Topic the notification service posts to
    pub topic_key: Option<String>,
    /// Raw topic key -> thread id table; validated by `topic_registry`
    #[serde(default)]
    pub topics: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AppConfig {
    /// Directory the bot must run from for config replacement to be allowed.
    /// Defaults to the directory containing the config file.
    pub home: Option<PathBuf>,
    pub data_file: PathBuf,
    /// Where the monitoring engine keeps its status snapshots
    pub state_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeliveryConfig {
    pub max_attempts: u32,
    pub backoff_secs: u64,
    pub topic_timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_base: default_api_base(),
            recipient: None,
            group_id: None,
            topic_key: None,
            topics: BTreeMap::new(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            home: None,
            data_file: PathBuf::from("data.csv"),
            state_dir: PathBuf::from("state"),
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_secs: 10,
            topic_timeout_secs: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram: TelegramConfig::default(),
            app: AppConfig::default(),
            delivery: DeliveryConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_env() -> Self {
        // Load from environment variables
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Environment variables override whatever the file says
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var("BOT_TOKEN") {
            self.telegram.bot_token = Some(token);
        }

        if let Ok(recipient) = std::env::var("NOTIFY_RECIPIENT") {
            self.telegram.recipient = Some(recipient);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.delivery.max_attempts == 0 {
            return Err(ConfigError::InvalidValue("delivery.max-attempts must be at least 1".to_string()));
        }
        if self.telegram.api_base.trim().is_empty() {
            return Err(ConfigError::MissingField("telegram.api-base".to_string()));
        }
        Ok(())
    }

    pub fn bot_token(&self) -> Option<&str> {
        self.telegram
            .bot_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }

    pub fn recipient(&self) -> Option<Recipient> {
        self.telegram.recipient.as_deref().and_then(Recipient::parse)
    }

    pub fn group(&self) -> Option<GroupDestination> {
        self.telegram.group_id.as_deref().and_then(GroupDestination::parse)
    }

    /// Build the topic registry, dropping entries that are not positive ids
    pub fn topic_registry(&self) -> TopicRegistry {
        TopicRegistry::from_raw(
            self.telegram
                .topics
                .iter()
                .map(|(key, value)| (key.clone(), yaml_scalar(value))),
        )
    }

    pub fn delivery_policy(&self) -> DeliveryPolicy {
        DeliveryPolicy {
            max_attempts: self.delivery.max_attempts,
            backoff: Duration::from_secs(self.delivery.backoff_secs),
        }
    }

    pub fn topic_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery.topic_timeout_secs)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

fn yaml_scalar(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        other => format!("{:?}", other),
    }
}
