//! Domain entities - Core business objects with no external dependencies

pub mod command;
pub mod message;
pub mod recipient;
pub mod topic;
pub mod upload;
pub mod user;

pub use command::{render_listing, CommandDescriptor, CommandKind, COMMANDS};
pub use message::{Attachment, Content, Message};
pub use recipient::Recipient;
pub use topic::{GroupDestination, TopicRegistry};
pub use upload::{FileUpload, UploadKind};
pub use user::User;
