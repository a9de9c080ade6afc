//! Declarative protocol checker.
//!
//! A protocol is described with five shapes (`emit`, `sequence`, `choice`,
//! `loop`, `product`) built in a [`Grammar`] arena, and a transcript of
//! string tokens is checked against it. Matching never touches live
//! machines; it only looks at the shape of the protocol.
//!
//! # Example
//!
//! ```rust
//! use chanalg::protocol::Grammar;
//!
//! let mut g = Grammar::new();
//! let ack = g.emit("ack");
//! let ping = g.receive("ping", ack);
//! let both = g.product([("left", ping), ("right", ping)]).unwrap();
//!
//! assert!(g.check(both, &["left/ping", "right/ping", "right/ack", "left/ack"]).is_ok());
//! assert!(g.check(both, &["left/ack", "left/ping", "right/ping", "right/ack"]).is_err());
//! ```

mod error;
mod grammar;
mod matcher;
mod mismatch;

pub use error::GrammarError;
pub use grammar::{Grammar, Node, NodeId};
pub use mismatch::{ChannelMismatch, Mismatch, UntaggedToken};
