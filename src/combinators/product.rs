//! Concurrent product of two machines addressed by channel prefix.

use crate::core::{Fault, Machine, Message, State, Step};
use serde::{Deserialize, Serialize};

pub const LEFT: &str = "left";
pub const RIGHT: &str = "right";

/// Independent states of both halves of a [`Product`].
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ProductState<L: State, R: State> {
    pub left: L,
    pub right: R,
}

impl<L: State, R: State> State for ProductState<L, R> {
    fn name(&self) -> &str {
        "product"
    }

    fn is_final(&self) -> bool {
        self.left.is_final() && self.right.is_final()
    }
}

/// Two machines multiplexed over `left/...` and `right/...`.
#[derive(Clone, Debug)]
pub struct Product<L, R> {
    left: L,
    right: R,
}

/// Route `left/...` to `left` and `right/...` to `right`.
///
/// The prefix is stripped on the way in and restored on the way out. The
/// halves never see each other's messages.
pub fn product<L: Machine, R: Machine>(left: L, right: R) -> Product<L, R> {
    Product { left, right }
}

impl<L: Machine, R: Machine> Machine for Product<L, R> {
    type State = ProductState<L::State, R::State>;

    fn start(&self) -> Self::State {
        ProductState {
            left: self.left.start(),
            right: self.right.start(),
        }
    }

    fn advance(&self, state: Self::State, message: Message) -> Step<Self::State> {
        let ProductState { left, right } = state;
        let Message { channel, data } = message;
        match channel.split_first() {
            Some((LEFT, rest)) => {
                let (left, out) = self.left.advance(left, Message::new(rest, data))?;
                Ok((ProductState { left, right }, out.prefixed(LEFT)))
            }
            Some((RIGHT, rest)) => {
                let (right, out) = self.right.advance(right, Message::new(rest, data))?;
                Ok((ProductState { left, right }, out.prefixed(RIGHT)))
            }
            _ => Err(Fault::invalid_channel("product", &channel)),
        }
    }
}
