//! Carrying a context value across an inner computation.

use crate::core::{Control, Fault, Machine, Message, State, Step, Value, RESULT};
use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub enum StashState<S: State> {
    Idle,
    Running { stashed: Value, inner: S },
}

impl<S: State> State for StashState<S> {
    fn name(&self) -> &str {
        match self {
            Self::Idle => "idle",
            Self::Running { .. } => "running",
        }
    }
}

/// Runs an inner machine while holding a value it never sees.
#[derive(Clone, Debug)]
pub struct Stash<M> {
    inner: M,
}

/// On `result [stashed, payload]`, start `inner` with `payload` and hold
/// `stashed` beside it. The inner `break/X` comes back as
/// `break/X [stashed, inner_data]`; everything else is relayed as is.
///
/// # Example
///
/// ```rust
/// use chanalg::combinators::stash;
/// use chanalg::core::{Machine, Message};
/// use chanalg::primitives::func;
/// use serde_json::json;
///
/// let machine = stash(func(|v| json!(v.as_i64().unwrap_or(0) + 1)));
/// let (_, out) = machine
///     .advance(machine.start(), Message::result(json!(["ctx", 1])))
///     .unwrap();
/// assert_eq!(out, Message::new("break/result", json!(["ctx", 2])));
/// ```
pub fn stash<M: Machine>(inner: M) -> Stash<M> {
    Stash { inner }
}

impl<M: Machine> Stash<M> {
    fn relay(&self, stashed: Value, inner: M::State, message: Message) -> Step<StashState<M::State>> {
        let (inner, out) = self.inner.advance(inner, message)?;
        match out.channel.control() {
            Control::Break(_) => {
                let data = Value::Array(vec![stashed, out.data]);
                Ok((StashState::Idle, Message::new(out.channel, data)))
            }
            Control::Continue(_) | Control::Data => Ok((StashState::Running { stashed, inner }, out)),
        }
    }
}

impl<M: Machine> Machine for Stash<M> {
    type State = StashState<M::State>;

    fn start(&self) -> Self::State {
        StashState::Idle
    }

    fn advance(&self, state: Self::State, message: Message) -> Step<Self::State> {
        match state {
            StashState::Idle => {
                let Message { channel, data } = message;
                if !channel.is(RESULT) {
                    return Err(Fault::invalid_channel("idle", &channel));
                }
                let Value::Array(pair) = data else {
                    return Err(Fault::malformed(&channel, "stash expects [stashed, payload]"));
                };
                let [stashed, payload]: [Value; 2] = pair
                    .try_into()
                    .map_err(|_| Fault::malformed(&channel, "stash expects [stashed, payload]"))?;
                self.relay(stashed, self.inner.start(), Message::result(payload))
            }
            StashState::Running { stashed, inner } => self.relay(stashed, inner, message),
        }
    }
}
