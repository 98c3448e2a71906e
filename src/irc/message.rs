//! Already-parsed chat messages as handed over by the protocol layer.

use std::fmt;

const CTCP_DELIM: char = '\x01';
const ACTION_PREFIX: &str = "\x01ACTION ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Privmsg,
    Notice,
}

/// How the payload of a message should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Ordinary text.
    Text,
    /// A CTCP ACTION (`/me does something`).
    Action,
    /// Any other CTCP request or reply.
    Ctcp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrcMessage {
    pub command: Command,
    /// Sender prefix, usually `nick!user@host`.
    pub prefix: String,
    /// Destination channel or nick.
    pub target: String,
    /// Raw text, CTCP delimiters included.
    pub payload: String,
}

impl IrcMessage {
    pub fn privmsg(prefix: impl Into<String>, target: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            command: Command::Privmsg,
            prefix: prefix.into(),
            target: target.into(),
            payload: payload.into(),
        }
    }

    pub fn notice(prefix: impl Into<String>, target: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            command: Command::Notice,
            prefix: prefix.into(),
            target: target.into(),
            payload: payload.into(),
        }
    }

    /// Builds a CTCP ACTION from plain action text.
    pub fn action(prefix: impl Into<String>, target: impl Into<String>, text: &str) -> Self {
        Self::privmsg(prefix, target, format!("{}{}{}", ACTION_PREFIX, text, CTCP_DELIM))
    }

    /// Nick part of the prefix; a bare server prefix is returned unchanged.
    pub fn nick(&self) -> &str {
        match self.prefix.split_once('!') {
            Some((nick, _)) => nick,
            None => &self.prefix,
        }
    }

    pub fn is_ctcp(&self) -> bool {
        self.payload.len() >= 2
            && self.payload.starts_with(CTCP_DELIM)
            && self.payload.ends_with(CTCP_DELIM)
    }

    pub fn is_action(&self) -> bool {
        self.is_ctcp() && self.payload.starts_with(ACTION_PREFIX)
    }

    pub fn kind(&self) -> MessageKind {
        if self.is_action() {
            MessageKind::Action
        } else if self.is_ctcp() {
            MessageKind::Ctcp
        } else {
            MessageKind::Text
        }
    }

    pub fn is_channel_message(&self) -> bool {
        is_channel(&self.target)
    }

    /// Payload with CTCP ACTION framing removed.
    pub fn text(&self) -> &str {
        if self.is_action() {
            &self.payload[ACTION_PREFIX.len()..self.payload.len() - 1]
        } else {
            &self.payload
        }
    }

    /// Canonical form stored in a quote grab.
    pub fn pretty_print(&self) -> String {
        match (self.command, self.kind()) {
            (Command::Privmsg, MessageKind::Action) => format!("* {} {}", self.nick(), self.text()),
            (Command::Privmsg, _) => format!("<{}> {}", self.nick(), self.payload),
            (Command::Notice, _) => format!("-{}- {}", self.nick(), self.payload),
        }
    }
}

impl fmt::Display for IrcMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pretty_print())
    }
}

pub fn is_channel(target: &str) -> bool {
    matches!(target.chars().next(), Some('#' | '&' | '+' | '!'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nick_from_prefix() {
        let msg = IrcMessage::privmsg("alice!~a@example.org", "#rust", "hi");
        assert_eq!(msg.nick(), "alice");
        let server = IrcMessage::notice("irc.example.org", "#rust", "hi");
        assert_eq!(server.nick(), "irc.example.org");
    }

    #[test]
    fn test_pretty_print_variants() {
        let msg = IrcMessage::privmsg("bob!b@h", "#c", "hello there");
        assert_eq!(msg.pretty_print(), "<bob> hello there");

        let action = IrcMessage::action("bob!b@h", "#c", "waves");
        assert_eq!(action.kind(), MessageKind::Action);
        assert_eq!(action.text(), "waves");
        assert_eq!(action.pretty_print(), "* bob waves");

        let notice = IrcMessage::notice("bob!b@h", "#c", "psst");
        assert_eq!(notice.pretty_print(), "-bob- psst");
    }

    #[test]
    fn test_ctcp_detection() {
        let version = IrcMessage::privmsg("bob!b@h", "#c", "\x01VERSION\x01");
        assert!(version.is_ctcp());
        assert!(!version.is_action());
        assert_eq!(version.kind(), MessageKind::Ctcp);

        let lone = IrcMessage::privmsg("bob!b@h", "#c", "\x01");
        assert!(!lone.is_ctcp());
    }

    #[test]
    fn test_channel_targets() {
        assert!(is_channel("#rust"));
        assert!(is_channel("&local"));
        assert!(!is_channel("bob"));
        assert!(!is_channel(""));
    }
}
