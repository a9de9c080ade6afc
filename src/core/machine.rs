//! The `Machine` abstraction.

use super::fault::Fault;
use super::message::Message;
use super::state::State;

/// Outcome of one `advance` call.
pub type Step<S> = Result<(S, Message), Fault>;

/// A deterministic transition function over an explicit state.
///
/// `advance` consumes the current state and one message and returns the
/// next state and one message. It must be pure: the same `(state, message)`
/// always yields the same result. Accepting a channel the current state
/// does not expect is a [`Fault`].
///
/// # Example
///
/// ```rust
/// use chanalg::core::{Machine, Message};
/// use chanalg::primitives::func;
/// use serde_json::json;
///
/// let double = func(|v| json!(v.as_i64().unwrap_or(0) * 2));
/// let state = double.start();
/// let (_, out) = double.advance(state, Message::result(json!(21))).unwrap();
/// assert_eq!(out.channel, "break/result");
/// assert_eq!(out.data, json!(42));
/// ```
pub trait Machine {
    type State: State;

    /// Initial state.
    fn start(&self) -> Self::State;

    /// Consume one message and move to the next state.
    fn advance(&self, state: Self::State, message: Message) -> Step<Self::State>;
}

impl<M: Machine + ?Sized> Machine for &M {
    type State = M::State;

    fn start(&self) -> Self::State {
        (**self).start()
    }

    fn advance(&self, state: Self::State, message: Message) -> Step<Self::State> {
        (**self).advance(state, message)
    }
}

impl<M: Machine + ?Sized> Machine for Box<M> {
    type State = M::State;

    fn start(&self) -> Self::State {
        (**self).start()
    }

    fn advance(&self, state: Self::State, message: Message) -> Step<Self::State> {
        (**self).advance(state, message)
    }
}
