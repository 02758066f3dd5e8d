//! Message handling - inbound operator commands and uploads

pub mod dispatcher;
pub mod parser;

pub use dispatcher::{CommandDispatcher, DispatcherState};
pub use parser::MessageParser;
