//! Combinators: pure operators building machines from machines.
//!
//! Each combinator nests its children's states in its own state type, so a
//! composite is still a plain [`Machine`] with an explicit state.
//!
//! | Combinator | Behaviour |
//! |---|---|
//! | [`sequence`] | run one machine, then the next |
//! | [`product`] | two machines side by side under `left/` and `right/` |
//! | [`looped`] | re-feed `continue/X` until `break/X` |
//! | [`pipeline`] | re-feed `continue/result` only |
//! | [`rename_channel`], [`renamed`] | rewrite a channel prefix |
//! | [`stash`] | carry a context value past an inner machine |
//! | [`name`], [`name_bind_primitive`] | two facets over one product |

mod looping;
mod naming;
mod product;
mod rename;
mod sequence;
mod stash;

use crate::core::{Channel, Machine};

pub use looping::{looped, pipeline, Loop, Pipeline};
pub use naming::{name, name_bind_primitive, Name, NameBind, NameBindState, NameState, FIRST, INNER, SECOND};
pub use product::{product, Product, ProductState, LEFT, RIGHT};
pub use rename::{rename_channel, renamed, RenameChannel, Renamed};
pub use sequence::{sequence, Sequence, SequenceState};
pub use stash::{stash, Stash, StashState};

/// Method-call forms of the combinators.
///
/// # Example
///
/// ```rust
/// use chanalg::combinators::MachineExt;
/// use chanalg::core::{Machine, Message};
/// use chanalg::primitives::{brk, func};
/// use serde_json::json;
///
/// let machine = func(|v| json!(v.as_i64().unwrap_or(0) + 1)).then(brk()).pipelined();
/// let (_, out) = machine.advance(machine.start(), Message::result(json!(1))).unwrap();
/// assert_eq!(out, Message::new("break/result", json!(2)));
/// ```
pub trait MachineExt: Machine + Sized {
    fn then<B: Machine>(self, next: B) -> Sequence<Self, B> {
        sequence(self, next)
    }

    fn beside<R: Machine>(self, right: R) -> Product<Self, R> {
        product(self, right)
    }

    fn looped(self) -> Loop<Self> {
        looped(self)
    }

    fn pipelined(self) -> Pipeline<Self> {
        pipeline(self)
    }

    fn stashed(self) -> Stash<Self> {
        stash(self)
    }

    fn renamed(self, old: impl Into<Channel>, new: impl Into<Channel>) -> Renamed<Self> {
        renamed(self, old, new)
    }
}

impl<M: Machine> MachineExt for M {}
