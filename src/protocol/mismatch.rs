//! Structured reasons a transcript was rejected.

use serde::{Deserialize, Serialize};
use thiserror::Error;

fn describe_found(token: &Option<String>) -> String {
    match token {
        Some(token) => format!("`{token}`"),
        None => "end of transcript".to_string(),
    }
}

/// A sub-protocol of a product that rejected its share of the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMismatch {
    pub channel: String,
    pub reason: Mismatch,
}

/// A token inside a product that carries no known `channel/` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UntaggedToken {
    pub token: String,
    pub at: usize,
}

fn product_reason(split: &usize, channels: &[ChannelMismatch], blocked: &Option<UntaggedToken>) -> String {
    let mut reason = format!("no interleaving matched (longest split {split} tokens)");
    for failure in channels {
        reason.push_str(&format!("; channel `{}`: {}", failure.channel, failure.reason));
    }
    if let Some(untagged) = blocked {
        reason.push_str(&format!(
            "; token `{}` at {} has no known channel tag",
            untagged.token, untagged.at
        ));
    }
    reason
}

/// Why a transcript does not match a protocol node.
///
/// Positions are indices into the transcript being matched; inside a
/// product they index the channel's own share.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum Mismatch {
    #[error("expected `{expected}`, found {} at token {at}", describe_found(.found))]
    Token {
        expected: String,
        found: Option<String>,
        at: usize,
    },

    #[error("expected one of [{}], found {} at token {at}", .expected.join(", "), describe_found(.found))]
    Choice {
        expected: Vec<String>,
        found: Option<String>,
        at: usize,
    },

    #[error("sequence step {index}: {reason}")]
    Step { index: usize, reason: Box<Mismatch> },

    #[error("loop re-entered at token {at} without consuming input")]
    NoProgress { at: usize },

    #[error("loop {node} has no body")]
    Unresolved { node: usize },

    #[error("node #{node} is not part of this grammar")]
    UnknownNode { node: usize },

    #[error("{}", product_reason(.split, .channels, .blocked))]
    Product {
        split: usize,
        channels: Vec<ChannelMismatch>,
        blocked: Option<UntaggedToken>,
    },

    #[error("unconsumed tokens after match: [{}]", .leftover.join(", "))]
    Trailing { leftover: Vec<String> },
}

impl Mismatch {
    /// The innermost reason, skipping sequence step wrappers.
    pub fn root(&self) -> &Mismatch {
        match self {
            Self::Step { reason, .. } => reason.root(),
            other => other,
        }
    }
}
