//! Channel renaming.

use crate::core::{Channel, Machine, Message, Step};
use crate::primitives::Stateless;

/// Stateless prefix rewrite from `old` to `new`.
#[derive(Clone, Debug)]
pub struct RenameChannel {
    old: Channel,
    new: Channel,
}

/// Machine that rewrites a leading `old` prefix to `new` and passes every
/// other message through untouched.
pub fn rename_channel(old: impl Into<Channel>, new: impl Into<Channel>) -> RenameChannel {
    RenameChannel {
        old: old.into(),
        new: new.into(),
    }
}

impl Machine for RenameChannel {
    type State = Stateless;

    fn start(&self) -> Stateless {
        Stateless::Ready
    }

    fn advance(&self, state: Stateless, message: Message) -> Step<Stateless> {
        let channel = message.channel.rename(&self.old, &self.new);
        Ok((state, message.with_channel(channel)))
    }
}

/// A machine published under a different channel namespace.
#[derive(Clone, Debug)]
pub struct Renamed<M> {
    inner: M,
    old: Channel,
    new: Channel,
}

/// Present `inner` under `new` instead of `old`.
///
/// Inputs addressed to `new/...` reach `inner` as `old/...`; outputs on
/// `old/...` leave as `new/...`. The inner machine is not altered.
pub fn renamed<M: Machine>(inner: M, old: impl Into<Channel>, new: impl Into<Channel>) -> Renamed<M> {
    Renamed {
        inner,
        old: old.into(),
        new: new.into(),
    }
}

impl<M: Machine> Machine for Renamed<M> {
    type State = M::State;

    fn start(&self) -> M::State {
        self.inner.start()
    }

    fn advance(&self, state: M::State, message: Message) -> Step<M::State> {
        let inbound = message.channel.rename(&self.new, &self.old);
        let (state, out) = self.inner.advance(state, message.with_channel(inbound))?;
        let outbound = out.channel.rename(&self.old, &self.new);
        Ok((state, out.with_channel(outbound)))
    }
}
