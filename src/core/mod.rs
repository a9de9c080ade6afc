//! Core types of the transition engine.
//!
//! This module contains the vocabulary every machine speaks:
//! - `Channel` and `Message` for tagged data
//! - the `State` trait for explicit machine states
//! - the `Machine` trait and the `Fault` raised on protocol violations
//!
//! All logic here is pure.

mod channel;
mod fault;
mod machine;
mod message;
mod state;

pub use channel::{Channel, Control, BREAK, CONTINUE, ERR, RESULT};
pub use fault::Fault;
pub use machine::{Machine, Step};
pub use message::Message;
pub use serde_json::Value;
pub use state::State;
