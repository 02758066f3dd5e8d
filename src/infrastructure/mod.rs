//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: The replaceable configuration file
//! - Adapters: Chat transports (Telegram, console)
//! - System: Host control and network info
//! - Monitor: File-backed view of the monitoring engine

pub mod adapters;
pub mod config;
pub mod monitor;
pub mod storage;
pub mod system;
