//! Two named facets over one product machine.
//!
//! `name()` is a router that speaks `first/...` and `second/...` to the
//! caller and `inner/left/...` and `inner/right/...` to whatever sits behind
//! it. `name_bind_primitive` plugs a concrete machine in behind the router
//! and resolves the inner traffic locally.

use super::product::{LEFT, RIGHT};
use crate::core::{Channel, Fault, Machine, Message, State, Step, Value, ERR, RESULT};
use serde::{Deserialize, Serialize};
use tracing::trace;

pub const FIRST: &str = "first";
pub const SECOND: &str = "second";
pub const INNER: &str = "inner";

const SET: &str = "set";

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub enum NameState {
    Start,
    AwaitingFirst,
    AwaitingSecond,
    /// Seeding both facets; `pending` holds the second facet's value until
    /// the first one has acknowledged.
    AwaitingInit { pending: Option<Value> },
}

impl State for NameState {
    fn name(&self) -> &str {
        match self {
            Self::Start => "start",
            Self::AwaitingFirst => "awaiting_first",
            Self::AwaitingSecond => "awaiting_second",
            Self::AwaitingInit { .. } => "awaiting_init",
        }
    }
}

/// Router between the `first`/`second` facets and an inner product.
#[derive(Clone, Copy, Debug, Default)]
pub struct Name;

/// Build the facet router.
///
/// From `start`:
/// - `first/<op>` is sent on as `inner/left/<op>`; the reply
///   `inner/left/<r>` comes back as `first/<r>`
/// - `second/<op>` likewise through `inner/right`
/// - `result [a, b]` seeds both facets with `set`, answering `result` once
///   both acknowledged, or `err` with the first failure
pub fn name() -> Name {
    Name
}

fn inner_side(side: &str) -> Channel {
    Channel::from_segments([INNER, side])
}

impl Name {
    /// Translate `inner/<side>/<r>` back to `<facet>/<r>`.
    fn reply(&self, state: &NameState, message: Message, side: &str, facet: &str) -> Step<NameState> {
        match message.channel.strip_prefix(&inner_side(side)) {
            Some(rest) if !rest.is_empty() => {
                Ok((NameState::Start, message.with_channel(rest.prefixed(facet))))
            }
            _ => Err(Fault::invalid_channel(state.name(), &message.channel)),
        }
    }

    fn start_init(&self, channel: &Channel, data: Value) -> Step<NameState> {
        let Value::Array(pair) = data else {
            return Err(Fault::malformed(channel, "init expects [first, second]"));
        };
        let [first, second]: [Value; 2] = pair
            .try_into()
            .map_err(|_| Fault::malformed(channel, "init expects [first, second]"))?;
        Ok((
            NameState::AwaitingInit {
                pending: Some(second),
            },
            Message::new(Channel::from_segments([INNER, LEFT, SET]), first),
        ))
    }
}

impl Machine for Name {
    type State = NameState;

    fn start(&self) -> NameState {
        NameState::Start
    }

    fn advance(&self, state: NameState, message: Message) -> Step<NameState> {
        match state {
            NameState::Start => {
                let Message { channel, data } = message;
                if channel.is(RESULT) {
                    return self.start_init(&channel, data);
                }
                match channel.split_first() {
                    Some((FIRST, rest)) if !rest.is_empty() => Ok((
                        NameState::AwaitingFirst,
                        Message::new(rest.prefixed(LEFT).prefixed(INNER), data),
                    )),
                    Some((SECOND, rest)) if !rest.is_empty() => Ok((
                        NameState::AwaitingSecond,
                        Message::new(rest.prefixed(RIGHT).prefixed(INNER), data),
                    )),
                    _ => Err(Fault::invalid_channel(state.name(), &channel)),
                }
            }
            NameState::AwaitingFirst => self.reply(&state, message, LEFT, FIRST),
            NameState::AwaitingSecond => self.reply(&state, message, RIGHT, SECOND),
            NameState::AwaitingInit { ref pending } => {
                let side = if pending.is_some() { LEFT } else { RIGHT };
                let Some(reply) = message.channel.strip_prefix(&inner_side(side)) else {
                    return Err(Fault::invalid_channel(state.name(), &message.channel));
                };
                if reply.is(ERR) {
                    return Ok((NameState::Start, message.with_channel(reply)));
                }
                if !reply.is(RESULT) {
                    return Err(Fault::invalid_channel(state.name(), &message.channel));
                }
                match pending {
                    Some(second) => Ok((
                        NameState::AwaitingInit { pending: None },
                        Message::new(Channel::from_segments([INNER, RIGHT, SET]), second.clone()),
                    )),
                    None => Ok((NameState::Start, Message::result(Value::Null))),
                }
            }
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct NameBindState<S: State> {
    pub router: NameState,
    pub inner: S,
}

impl<S: State> State for NameBindState<S> {
    fn name(&self) -> &str {
        self.router.name()
    }
}

/// A [`name`] router bound to a concrete inner machine.
#[derive(Clone, Debug)]
pub struct NameBind<M> {
    router: Name,
    inner: M,
}

/// Bind the facet router to `inner` (normally a [`product`](super::product)).
///
/// Whenever the router speaks on `inner/...` the request is run against
/// `inner` right away and the reply fed back, so the caller only ever sees
/// `result`, `err`, `first/...` and `second/...`.
///
/// # Example
///
/// ```rust
/// use chanalg::combinators::{name_bind_primitive, product};
/// use chanalg::core::{Machine, Message};
/// use chanalg::primitives::primitive;
/// use serde_json::json;
///
/// let shared = name_bind_primitive(product(primitive(), primitive()));
/// let (state, _) = shared.advance(shared.start(), Message::new("first/set", json!(1))).unwrap();
/// let (_, out) = shared.advance(state, Message::new("first/copy", json!(null))).unwrap();
/// assert_eq!(out, Message::new("first/result", json!(1)));
/// ```
pub fn name_bind_primitive<M: Machine>(inner: M) -> NameBind<M> {
    NameBind {
        router: name(),
        inner,
    }
}

impl<M: Machine> Machine for NameBind<M> {
    type State = NameBindState<M::State>;

    fn start(&self) -> Self::State {
        NameBindState {
            router: self.router.start(),
            inner: self.inner.start(),
        }
    }

    fn advance(&self, state: Self::State, message: Message) -> Step<Self::State> {
        let inner_prefix = Channel::parse(INNER);
        let NameBindState {
            router: mut router_state,
            inner: mut inner_state,
        } = state;
        let mut message = message;
        loop {
            let (next, out) = self.router.advance(router_state, message)?;
            router_state = next;
            match out.channel.strip_prefix(&inner_prefix) {
                Some(request) => {
                    trace!(channel = %request, "name: resolving inner request");
                    let (next, reply) = self.inner.advance(inner_state, out.with_channel(request))?;
                    inner_state = next;
                    message = reply.prefixed(INNER);
                }
                None => {
                    let state = NameBindState {
                        router: router_state,
                        inner: inner_state,
                    };
                    return Ok((state, out));
                }
            }
        }
    }
}
