//! Errors raised while building a protocol description.

use thiserror::Error;

/// Construction-time errors for [`Grammar`](super::Grammar) nodes.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GrammarError {
    #[error("choice lists tag '{tag}' more than once")]
    DuplicateTag { tag: String },

    #[error("choice needs at least one tag")]
    EmptyChoice,

    #[error("product lists channel '{channel}' more than once")]
    DuplicateChannel { channel: String },

    #[error("product channel name '{channel}' must be a single non-empty segment")]
    InvalidChannelName { channel: String },

    #[error("product needs at least one channel")]
    EmptyProduct,
}
