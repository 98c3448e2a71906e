use std::fmt;

use log::{debug, error, info};

use crate::configuration::config::Config;
use crate::error_handling::types::{CommandError, StorageError};
use crate::irc::{Command, IrcMessage, MessageHistory, MessageKind};
use crate::storage::registry::StorageRegistry;
use crate::storage::storage_trait::QuoteStorage;

use super::formatting::{grab_summary, quoted};
use super::random_grabber;

const SUCCESS: &str = "The operation succeeded.";

/// What the bot says back after a command or an auto-grab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// Sent as a CTCP ACTION, without addressing the caller.
    Action(String),
    Success,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Text(s) => write!(f, "{}", s),
            Reply::Action(s) => write!(f, "* {}", s),
            Reply::Success => write!(f, "{}", SUCCESS),
        }
    }
}

/// Feature layer: command handlers and the auto-grab hook.
pub struct QuoteGrabs {
    config: Config,
    db: StorageRegistry,
    history: MessageHistory,
    rng: fastrand::Rng,
}

impl QuoteGrabs {
    pub fn new(config: Config) -> Self {
        let db = StorageRegistry::new(config.storage.clone());
        Self::with_storage(config, db, fastrand::Rng::new())
    }

    pub fn with_storage(config: Config, db: StorageRegistry, rng: fastrand::Rng) -> Self {
        let history = MessageHistory::new(config.history.size);
        Self {
            config,
            db,
            history,
            rng,
        }
    }

    pub fn storage(&self) -> &StorageRegistry {
        &self.db
    }

    /// Records a message that did not go through `do_privmsg`.
    pub fn observe(&mut self, msg: IrcMessage) {
        self.history.push(msg);
    }

    /// Hook for every incoming PRIVMSG. Returns the action to send when the
    /// message was grabbed automatically.
    pub fn do_privmsg(
        &mut self,
        msg: &IrcMessage,
        bot_prefix: &str,
    ) -> Result<Option<Reply>, CommandError> {
        self.history.push(msg.clone());

        if msg.command != Command::Privmsg || msg.kind() == MessageKind::Ctcp {
            return Ok(None);
        }
        if !msg.is_channel_message() {
            return Ok(None);
        }
        let channel = msg.target.as_str();
        let settings = self.config.random_grabber(channel);
        let now = chrono::Utc::now().timestamp();
        let grab = random_grabber::decide(&self.db, channel, msg, &settings, now, &mut self.rng)?;
        if !grab {
            return Ok(None);
        }

        self.db.add(channel, msg, bot_prefix)?;
        info!("Auto-grabbed a quote from {} in {}", msg.nick(), channel);
        Ok(Some(Reply::Action(format!(
            "jots down a new quote for {}",
            msg.nick()
        ))))
    }

    /// Grabs the latest thing `nick` said where `invoker` was sent, storing
    /// it in `channel`'s store.
    pub fn grab(
        &self,
        channel: &str,
        invoker: &IrcMessage,
        nick: &str,
    ) -> Result<Reply, CommandError> {
        let casemapping = self.config.storage.casemapping;
        if casemapping.nick_eq(nick, invoker.nick()) {
            return Err(CommandError::raised("You can't quote grab yourself."));
        }
        let found = self
            .history
            .last_privmsg_from(casemapping, nick, &invoker.target)
            .cloned();
        match found {
            Some(m) => {
                self.db.add(channel, &m, &invoker.prefix)?;
                debug!("{} grabbed {} in {}", invoker.nick(), nick, channel);
                Ok(Reply::Success)
            }
            None => Err(CommandError::user("I couldn't find a proper message to grab.")),
        }
    }

    /// Removes grab `id`, or the newest one.
    pub fn ungrab(&self, channel: &str, id: Option<i64>) -> Result<Reply, CommandError> {
        let message = match id {
            None => "Nothing to ungrab.",
            Some(_) => "Invalid grab number.",
        };
        self.db
            .remove(channel, id)
            .map_err(|e| not_found_as(e, CommandError::user(message)))?;
        Ok(Reply::Success)
    }

    pub fn quote(&self, channel: &str, nick: &str) -> Result<Reply, CommandError> {
        let text = self.db.get_quote(channel, nick).map_err(|e| {
            not_found_as(
                e,
                CommandError::raised(format!("I couldn't find a matching quotegrab for {}.", nick)),
            )
        })?;
        Ok(Reply::Text(text))
    }

    pub fn list(&self, channel: &str, nick: &str) -> Result<Reply, CommandError> {
        let grabs = self.db.list(channel, nick).map_err(|e| {
            not_found_as(
                e,
                CommandError::raised(format!("I couldn't find any quotegrabs for {}.", nick)),
            )
        })?;
        Ok(Reply::Text(grab_summary(&grabs)))
    }

    pub fn random(&self, channel: &str, nick: Option<&str>) -> Result<Reply, CommandError> {
        let message = match nick {
            Some(_) => "Couldn't get a random quote for that nick.",
            None => "Couldn't get a random quote.  Are there any grabbed quotes in the database?",
        };
        let text = self
            .db
            .random(channel, nick)
            .map_err(|e| not_found_as(e, CommandError::user(message)))?;
        Ok(Reply::Text(text))
    }

    pub fn get(&self, channel: &str, id: i64) -> Result<Reply, CommandError> {
        let grab = self.db.get(channel, id).map_err(|e| {
            not_found_as(
                e,
                CommandError::raised(format!("No quotegrab for id {}", quoted(&id.to_string()))),
            )
        })?;
        Ok(Reply::Text(grab.to_string()))
    }

    pub fn search(&self, channel: &str, text: &str) -> Result<Reply, CommandError> {
        let grabs = self.db.search(channel, text).map_err(|e| {
            not_found_as(
                e,
                CommandError::raised(format!("No quotegrabs matching {}", quoted(text))),
            )
        })?;
        Ok(Reply::Text(grab_summary(&grabs)))
    }

    /// Adds a grab directly, bypassing history.
    pub fn add(&self, channel: &str, msg: &IrcMessage, grabber: &str) -> Result<Reply, CommandError> {
        self.db.add(channel, msg, grabber)?;
        Ok(Reply::Success)
    }

    pub fn close(&self) {
        self.db.close();
    }
}

/// Maps NotFound to the command's own reply; anything else is a storage
/// failure.
fn not_found_as(err: StorageError, user: CommandError) -> CommandError {
    match err {
        StorageError::NotFound => user,
        e => {
            error!("Quote storage failure: {}", e);
            CommandError::Storage(e)
        }
    }
}
