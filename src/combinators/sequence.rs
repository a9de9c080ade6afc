//! Sequential composition.

use crate::core::{Control, Machine, Message, State, Step};
use serde::{Deserialize, Serialize};

/// Which phase of a [`Sequence`] is running, with that phase's state.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub enum SequenceState<A: State, B: State> {
    A(A),
    B(B),
}

impl<A: State, B: State> State for SequenceState<A, B> {
    fn name(&self) -> &str {
        match self {
            Self::A(_) => "a",
            Self::B(_) => "b",
        }
    }

    fn is_final(&self) -> bool {
        matches!(self, Self::B(inner) if inner.is_final())
    }
}

/// Runs `first`, then `second`.
#[derive(Clone, Debug)]
pub struct Sequence<A, B> {
    first: A,
    second: B,
}

/// Run `first` until it emits `break/X`, then start `second` fresh.
///
/// The hand-over is reported to the caller as `continue/X` so the phase
/// switch is invisible; `second`'s own `break/X` is surfaced unchanged.
///
/// # Example
///
/// ```rust
/// use chanalg::combinators::sequence;
/// use chanalg::core::{Machine, Message};
/// use chanalg::primitives::{brk, func};
/// use serde_json::json;
///
/// let machine = sequence(func(|v| json!(v.as_i64().unwrap_or(0) + 1)), brk());
/// let (state, out) = machine.advance(machine.start(), Message::result(json!(1))).unwrap();
/// assert_eq!(out, Message::new("continue/result", json!(2)));
/// let (_, out) = machine.advance(state, Message::result(out.data)).unwrap();
/// assert_eq!(out, Message::new("break/result", json!(2)));
/// ```
pub fn sequence<A: Machine, B: Machine>(first: A, second: B) -> Sequence<A, B> {
    Sequence { first, second }
}

impl<A: Machine, B: Machine> Machine for Sequence<A, B> {
    type State = SequenceState<A::State, B::State>;

    fn start(&self) -> Self::State {
        SequenceState::A(self.first.start())
    }

    fn advance(&self, state: Self::State, message: Message) -> Step<Self::State> {
        match state {
            SequenceState::A(inner) => {
                let (inner, out) = self.first.advance(inner, message)?;
                match out.channel.control() {
                    Control::Break(rest) => Ok((
                        SequenceState::B(self.second.start()),
                        Message::continue_on(&rest, out.data),
                    )),
                    Control::Continue(_) | Control::Data => Ok((SequenceState::A(inner), out)),
                }
            }
            SequenceState::B(inner) => {
                let (inner, out) = self.second.advance(inner, message)?;
                Ok((SequenceState::B(inner), out))
            }
        }
    }
}
