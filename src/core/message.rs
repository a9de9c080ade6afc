//! Messages: a channel paired with opaque data.

use super::channel::{Channel, BREAK, CONTINUE, ERR, RESULT};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tagged message.
///
/// `data` is whatever sender and receiver agreed on for the channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub channel: Channel,
    pub data: Value,
}

impl Message {
    pub fn new(channel: impl Into<Channel>, data: Value) -> Self {
        Self {
            channel: channel.into(),
            data,
        }
    }

    /// A message on `result`.
    pub fn result(data: Value) -> Self {
        Self::new(Channel::parse(RESULT), data)
    }

    /// A recoverable error reported as data on `err`.
    pub fn err(reason: impl Into<String>) -> Self {
        Self::new(Channel::parse(ERR), Value::String(reason.into()))
    }

    /// `continue/<channel>`.
    pub fn continue_on(channel: &Channel, data: Value) -> Self {
        Self::new(channel.prefixed(CONTINUE), data)
    }

    /// `break/<channel>`.
    pub fn break_on(channel: &Channel, data: Value) -> Self {
        Self::new(channel.prefixed(BREAK), data)
    }

    /// Same data on a different channel.
    pub fn with_channel(self, channel: Channel) -> Self {
        Self {
            channel,
            data: self.data,
        }
    }

    /// Same data with `segment` prepended to the channel.
    pub fn prefixed(self, segment: &str) -> Self {
        let channel = self.channel.prefixed(segment);
        self.with_channel(channel)
    }
}
