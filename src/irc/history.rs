//! Bounded window of recently seen messages.

use std::collections::VecDeque;

use super::casemapping::Casemapping;
use super::message::{Command, IrcMessage};

#[derive(Debug, Clone)]
pub struct MessageHistory {
    messages: VecDeque<IrcMessage>,
    capacity: usize,
}

impl MessageHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Records a message, evicting the oldest one once the window is full.
    pub fn push(&mut self, msg: IrcMessage) {
        if self.capacity == 0 {
            return;
        }
        if self.messages.len() == self.capacity {
            self.messages.pop_front();
        }
        self.messages.push_back(msg);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Most recent PRIVMSG sent by `nick` to `channel`.
    pub fn last_privmsg_from(
        &self,
        casemapping: Casemapping,
        nick: &str,
        channel: &str,
    ) -> Option<&IrcMessage> {
        self.messages.iter().rev().find(|m| {
            m.command == Command::Privmsg
                && casemapping.nick_eq(m.nick(), nick)
                && casemapping.nick_eq(&m.target, channel)
        })
    }
}
