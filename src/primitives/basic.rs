//! Control primitives: constant, func, yield and break.

use crate::core::{Channel, Fault, Machine, Message, State, Step, Value, RESULT};
use crate::state_enum;

state_enum! {
    /// State of machines that carry nothing between steps.
    pub enum Stateless {
        Ready,
    }
}

state_enum! {
    /// Single-shot machine: runs once, then refuses further input.
    pub enum FuncState {
        Start,
        End,
    }
    final: [End]
}

state_enum! {
    pub enum YieldState {
        Start,
        Awaiting,
    }
}

fn break_result(data: Value) -> Message {
    Message::break_on(&Channel::parse(RESULT), data)
}

/// Always answers `break/result` with a fixed value.
#[derive(Clone, Debug)]
pub struct Constant {
    value: Value,
}

/// Machine that ignores its input and emits `value`.
///
/// Only `result` is accepted; any other channel is a fault.
pub fn constant(value: Value) -> Constant {
    Constant { value }
}

impl Machine for Constant {
    type State = Stateless;

    fn start(&self) -> Stateless {
        Stateless::Ready
    }

    fn advance(&self, state: Stateless, message: Message) -> Step<Stateless> {
        if !message.channel.is(RESULT) {
            return Err(Fault::invalid_channel("constant", &message.channel));
        }
        Ok((state, break_result(self.value.clone())))
    }
}

/// Applies a function once.
pub struct Func<F> {
    f: F,
}

/// Single-shot machine applying `f` to the data received on `result`.
pub fn func<F>(f: F) -> Func<F>
where
    F: Fn(Value) -> Value,
{
    Func { f }
}

impl<F> Machine for Func<F>
where
    F: Fn(Value) -> Value,
{
    type State = FuncState;

    fn start(&self) -> FuncState {
        FuncState::Start
    }

    fn advance(&self, state: FuncState, message: Message) -> Step<FuncState> {
        match state {
            FuncState::End => Err(Fault::Exhausted {
                machine: "func".to_string(),
            }),
            FuncState::Start if message.channel.is(RESULT) => {
                Ok((FuncState::End, break_result((self.f)(message.data))))
            }
            FuncState::Start => Err(Fault::invalid_channel(state.name(), &message.channel)),
        }
    }
}

/// Suspends until a named channel answers.
#[derive(Clone, Debug)]
pub struct Yield {
    channel: Channel,
}

/// Forward `result` data on `continue/<channel>`, then wait for exactly
/// `<channel>` and answer `break/result` with whatever arrived there.
pub fn yield_on(channel: impl Into<Channel>) -> Yield {
    Yield {
        channel: channel.into(),
    }
}

impl Machine for Yield {
    type State = YieldState;

    fn start(&self) -> YieldState {
        YieldState::Start
    }

    fn advance(&self, state: YieldState, message: Message) -> Step<YieldState> {
        match state {
            YieldState::Start if message.channel.is(RESULT) => Ok((
                YieldState::Awaiting,
                Message::continue_on(&self.channel, message.data),
            )),
            YieldState::Awaiting if message.channel == self.channel => {
                Ok((YieldState::Start, break_result(message.data)))
            }
            _ => Err(Fault::invalid_channel(state.name(), &message.channel)),
        }
    }
}

/// Identity from `result` to `break/result`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Brk;

/// Sequencing terminator: passes `result` straight through as `break/result`.
pub fn brk() -> Brk {
    Brk
}

impl Machine for Brk {
    type State = Stateless;

    fn start(&self) -> Stateless {
        Stateless::Ready
    }

    fn advance(&self, state: Stateless, message: Message) -> Step<Stateless> {
        if !message.channel.is(RESULT) {
            return Err(Fault::invalid_channel("brk", &message.channel));
        }
        Ok((state, break_result(message.data)))
    }
}
