//! Application services - Business logic orchestration

pub mod notification_service;

pub use notification_service::NotificationService;
