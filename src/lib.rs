//! Notification and remote-command bridge between a stock monitor and a
//! Telegram operator.

pub mod application;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
pub(crate) mod testing;
