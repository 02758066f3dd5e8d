//! Outbound delivery to direct-message recipients

pub mod engine;

pub use engine::{DeliveryEngine, DeliveryOutcome, DeliveryPolicy};
