//! Protocol violation faults.
//!
//! A fault means caller and machine have desynchronized. Combinators pass
//! faults straight through; nothing in this crate recovers from one.

use super::channel::Channel;
use thiserror::Error;

/// Fatal protocol violations raised by `Machine::advance`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Fault {
    #[error("invalid channel '{channel}' in state '{state}'")]
    InvalidChannel { state: String, channel: Channel },

    #[error("malformed data on channel '{channel}': {reason}")]
    MalformedData { channel: Channel, reason: String },

    #[error("machine '{machine}' already finished")]
    Exhausted { machine: String },

    #[error("trampoline step limit ({limit}) exceeded")]
    StepLimitExceeded { limit: usize },

    #[error("session halted after an earlier fault")]
    Halted,
}

impl Fault {
    pub fn invalid_channel(state: impl Into<String>, channel: &Channel) -> Self {
        Self::InvalidChannel {
            state: state.into(),
            channel: channel.clone(),
        }
    }

    pub fn malformed(channel: &Channel, reason: impl Into<String>) -> Self {
        Self::MalformedData {
            channel: channel.clone(),
            reason: reason.into(),
        }
    }
}
