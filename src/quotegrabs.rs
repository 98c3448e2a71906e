//! Command layer on top of the quote stores.
//!
//! - `plugin`: the `QuoteGrabs` handlers and the `Reply` type
//! - `random_grabber`: auto-grab decision for ordinary channel traffic
//! - `formatting`: shortening and joining of reply items

pub mod formatting;
pub mod plugin;
pub mod random_grabber;

pub use plugin::{QuoteGrabs, Reply};
