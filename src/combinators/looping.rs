//! Trampolines: `looped` and `pipeline`.
//!
//! Both run several inner steps inside one external `advance`. Without a
//! limit an inner machine that never leaves its continuation keeps the call
//! running forever.

use crate::core::{Channel, Control, Fault, Machine, Message, Step, CONTINUE, RESULT};
use tracing::trace;

fn check_limit(limit: Option<usize>, steps: usize) -> Result<(), Fault> {
    match limit {
        Some(limit) if steps >= limit => Err(Fault::StepLimitExceeded { limit }),
        _ => Ok(()),
    }
}

/// Feeds `continue/X` back into the inner machine until it breaks.
#[derive(Clone, Debug)]
pub struct Loop<M> {
    inner: M,
    limit: Option<usize>,
}

/// Drive `inner` until it emits `break/X`, re-feeding every `continue/X`
/// output as input on `X`.
///
/// The loop answers with `X` (the `break` segment stripped). Outputs that
/// are neither `continue/` nor `break/` are returned as they are.
///
/// # Example
///
/// ```rust
/// use chanalg::combinators::{looped, sequence};
/// use chanalg::core::{Machine, Message};
/// use chanalg::primitives::{brk, func};
/// use serde_json::json;
///
/// let machine = looped(sequence(func(|v| json!(v.as_i64().unwrap_or(0) * 10)), brk()));
/// let (_, out) = machine.advance(machine.start(), Message::result(json!(4))).unwrap();
/// assert_eq!(out, Message::result(json!(40)));
/// ```
pub fn looped<M: Machine>(inner: M) -> Loop<M> {
    Loop { inner, limit: None }
}

impl<M> Loop<M> {
    /// Fault with `StepLimitExceeded` after `limit` inner steps in one call.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl<M: Machine> Machine for Loop<M> {
    type State = M::State;

    fn start(&self) -> M::State {
        self.inner.start()
    }

    fn advance(&self, state: M::State, message: Message) -> Step<M::State> {
        let mut state = state;
        let mut message = message;
        let mut steps = 0;
        loop {
            check_limit(self.limit, steps)?;
            steps += 1;
            let (next, out) = self.inner.advance(state, message)?;
            match out.channel.control() {
                Control::Continue(rest) => {
                    trace!(step = steps, channel = %rest, "loop: feeding continuation back");
                    state = next;
                    message = out.with_channel(rest);
                }
                Control::Break(rest) => return Ok((next, out.with_channel(rest))),
                Control::Data => return Ok((next, out)),
            }
        }
    }
}

/// Collapses chains of `continue/result` into one external step.
#[derive(Clone, Debug)]
pub struct Pipeline<M> {
    inner: M,
    limit: Option<usize>,
}

/// Re-invoke `inner` on `result` whenever it answers exactly
/// `continue/result`; return on any other channel.
pub fn pipeline<M: Machine>(inner: M) -> Pipeline<M> {
    Pipeline { inner, limit: None }
}

impl<M> Pipeline<M> {
    /// Fault with `StepLimitExceeded` after `limit` inner steps in one call.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl<M: Machine> Machine for Pipeline<M> {
    type State = M::State;

    fn start(&self) -> M::State {
        self.inner.start()
    }

    fn advance(&self, state: M::State, message: Message) -> Step<M::State> {
        let self_continuation = Channel::from_segments([CONTINUE, RESULT]);
        let mut state = state;
        let mut message = message;
        let mut steps = 0;
        loop {
            check_limit(self.limit, steps)?;
            steps += 1;
            let (next, out) = self.inner.advance(state, message)?;
            if out.channel != self_continuation {
                return Ok((next, out));
            }
            trace!(step = steps, "pipeline: re-entering on result");
            state = next;
            message = Message::result(out.data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::sequence;
    use crate::primitives::{brk, constant, func, yield_on, Stateless};
    use serde_json::json;

    fn add(n: i64) -> impl Fn(crate::core::Value) -> crate::core::Value {
        move |v| json!(v.as_i64().unwrap_or(0) + n)
    }

    #[test]
    fn loop_hides_internal_continuations() {
        let machine = looped(sequence(func(add(1)), sequence(func(add(2)), brk())));
        let (_, out) = machine
            .advance(machine.start(), Message::result(json!(0)))
            .unwrap();
        assert_eq!(out, Message::result(json!(3)));
    }

    #[test]
    fn loop_returns_data_channels_unchanged() {
        let machine = looped(crate::primitives::primitive());
        let (_, out) = machine
            .advance(machine.start(), Message::new("copy", json!(null)))
            .unwrap();
        assert_eq!(out, Message::result(json!(null)));
    }

    struct Spin;

    impl Machine for Spin {
        type State = Stateless;

        fn start(&self) -> Stateless {
            Stateless::Ready
        }

        fn advance(&self, state: Stateless, message: Message) -> Step<Stateless> {
            Ok((state, Message::continue_on(&Channel::parse(RESULT), message.data)))
        }
    }

    #[test]
    fn loop_limit_stops_runaway_machines() {
        let machine = looped(Spin).with_limit(5);
        let fault = machine
            .advance(machine.start(), Message::result(json!(0)))
            .unwrap_err();
        assert_eq!(fault, Fault::StepLimitExceeded { limit: 5 });
    }

    #[test]
    fn pipeline_stops_on_other_continuations() {
        let machine = pipeline(sequence(func(add(1)), sequence(yield_on("c"), brk())));
        let (state, out) = machine
            .advance(machine.start(), Message::result(json!(1)))
            .unwrap();
        assert_eq!(out, Message::new("continue/c", json!(2)));

        let (_, out) = machine.advance(state, Message::new("c", json!(7))).unwrap();
        assert_eq!(out, Message::new("break/result", json!(7)));
    }

    #[test]
    fn pipeline_limit_stops_self_continuations() {
        let machine = pipeline(Spin).with_limit(3);
        let fault = machine
            .advance(machine.start(), Message::result(json!(0)))
            .unwrap_err();
        assert_eq!(fault, Fault::StepLimitExceeded { limit: 3 });
    }

    #[test]
    fn pipeline_passes_single_step_machines_through() {
        let machine = pipeline(constant(json!("k")));
        let (_, out) = machine
            .advance(machine.start(), Message::result(json!(null)))
            .unwrap();
        assert_eq!(out, Message::new("break/result", json!("k")));
    }
}
