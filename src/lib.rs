//! Chanalg: an algebra of channel-tagged state machines.
//!
//! A machine is a pure transition function: it takes its explicit state and
//! one tagged message, and returns the next state and one tagged message.
//! Complex protocols are assembled from primitive machines with
//! combinators, and a separate declarative checker decides whether an
//! observed transcript of tokens is a legal execution of a protocol.
//!
//! # Layers
//!
//! - **core**: `Channel`, `Message`, the `State` and `Machine` traits, `Fault`
//! - **primitives**: constant, func, yield, break, memory cell, slot array
//! - **combinators**: sequence, product, loop, pipeline, rename, stash, name
//! - **protocol**: grammar arena and transcript matcher
//! - **session**: imperative shell that drives a machine and records history
//!
//! # Example
//!
//! ```rust
//! use chanalg::combinators::{pipeline, sequence};
//! use chanalg::core::Message;
//! use chanalg::primitives::{brk, func, yield_on};
//! use chanalg::session::Session;
//! use serde_json::json;
//!
//! // add one, ask the caller on `c`, then finish with the answer
//! let machine = pipeline(sequence(
//!     func(|v| json!(v.as_i64().unwrap_or(0) + 1)),
//!     sequence(yield_on("c"), brk()),
//! ));
//!
//! let mut session = Session::new(machine);
//! let asked = session.send("result", json!(1)).unwrap();
//! assert_eq!(asked, Message::new("continue/c", json!(2)));
//!
//! let done = session.send("c", json!("ok")).unwrap();
//! assert_eq!(done, Message::new("break/result", json!("ok")));
//! ```

mod macros;

pub mod combinators;
pub mod config;
pub mod core;
pub mod primitives;
pub mod protocol;
pub mod session;

// Re-export commonly used types
pub use config::{MatchConfig, SessionConfig};
pub use core::{Channel, Fault, Machine, Message, State, Step, Value};
pub use protocol::{Grammar, Mismatch, NodeId};
pub use session::Session;
