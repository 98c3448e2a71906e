pub mod configuration;
pub use configuration::Config;

pub mod error_handling;

pub mod irc;

pub mod quotegrabs;
pub use quotegrabs::{QuoteGrabs, Reply};

pub mod storage;
