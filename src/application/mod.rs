//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Delivery: direct messages with retry and escalation
//! - Routing: forum topics with direct-message fallback
//! - Messaging: operator command parsing and dispatching
//! - Services: the notification facade
//! - Errors: Domain-specific errors

pub mod delivery;
pub mod errors;
pub mod messaging;
pub mod routing;
pub mod services;
