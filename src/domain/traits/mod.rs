//! Domain traits - Abstractions for infrastructure implementations

pub mod bot;
pub mod host;
pub mod monitor;
pub mod notifier;

pub use bot::{Bot, BotInfo, TopicChannel};
pub use host::{ConfigStore, Host, NetworkInfo};
pub use monitor::{Metric, Monitor};
pub use notifier::Notifier;
