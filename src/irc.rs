//! Chat-protocol models consumed by the quote grabber.
//!
//! Parsing and delivery happen elsewhere; this module only describes the
//! messages that reach the plugin and the rules used to compare names.

pub mod casemapping;
pub mod history;
pub mod message;

pub use casemapping::Casemapping;
pub use history::MessageHistory;
pub use message::{Command, IrcMessage, MessageKind};
