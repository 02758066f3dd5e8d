//! Domain layer - Core business objects and collaborator interfaces
//! 
//! This layer contains:
//! - Entities: Core business objects (Recipient, TopicRegistry, Message, Command)
//! - Traits: Abstractions for infrastructure (Bot, TopicChannel, Monitor, Host, Notifier)

pub mod entities;
pub mod traits;
