//! Addressable memory cells.
//!
//! Out-of-range or ill-typed indices are ordinary caller mistakes, so they
//! are answered on `err` and leave the state untouched. Unknown channels and
//! payloads of the wrong shape are still faults.

use crate::core::{Channel, Fault, Machine, Message, State, Step, Value};
use serde::{Deserialize, Serialize};

const SET: &str = "set";
const COPY: &str = "copy";
const ELEMENT: &str = "element";
const TAKE: &str = "take";

/// Value held by a [`primitive`] cell.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct CellState {
    pub value: Value,
}

impl State for CellState {
    fn name(&self) -> &str {
        "cell"
    }
}

/// A single mutable cell.
#[derive(Clone, Copy, Debug, Default)]
pub struct Primitive;

/// Cell supporting `set`, `copy` and `element/<i>/<op>`.
///
/// `set` replaces the value and answers `result` with `null`. `copy` answers
/// `result` with the current value. `element/<i>/<op>` applies `<op>` to
/// element `i` of an array-shaped value, recursively.
///
/// # Example
///
/// ```rust
/// use chanalg::core::{Machine, Message};
/// use chanalg::primitives::primitive;
/// use serde_json::json;
///
/// let cell = primitive();
/// let (state, _) = cell.advance(cell.start(), Message::new("set", json!([1, [2, 3]]))).unwrap();
/// let (_, out) = cell.advance(state, Message::new("element/1/element/0/copy", json!(null))).unwrap();
/// assert_eq!(out, Message::new("result", json!(2)));
/// ```
pub fn primitive() -> Primitive {
    Primitive
}

impl Machine for Primitive {
    type State = CellState;

    fn start(&self) -> CellState {
        CellState::default()
    }

    fn advance(&self, mut state: CellState, message: Message) -> Step<CellState> {
        let reply = apply(&mut state.value, &message.channel, &message.channel, message.data)?;
        Ok((state, reply))
    }
}

/// Apply the operation named by `channel` to `cell`.
///
/// `full` is the channel as received, kept for fault messages.
fn apply(cell: &mut Value, channel: &Channel, full: &Channel, data: Value) -> Result<Message, Fault> {
    match channel.head() {
        Some(SET) if channel.segments().len() == 1 => {
            *cell = data;
            Ok(Message::result(Value::Null))
        }
        Some(COPY) if channel.segments().len() == 1 => Ok(Message::result(cell.clone())),
        Some(ELEMENT) => {
            let rest = channel.tail();
            let Some((index, op)) = rest.split_first() else {
                return Err(Fault::invalid_channel("cell", full));
            };
            if op.is_empty() {
                return Err(Fault::invalid_channel("cell", full));
            }
            let Ok(index) = index.parse::<usize>() else {
                return Ok(Message::err(format!("invalid index '{index}'")));
            };
            let Value::Array(items) = cell else {
                return Ok(Message::err(format!(
                    "cannot index into non-array value at '{full}'"
                )));
            };
            let len = items.len();
            match items.get_mut(index) {
                Some(item) => apply(item, &op, full, data),
                None => Ok(Message::err(format!(
                    "index {index} out of range for length {len}"
                ))),
            }
        }
        _ => Err(Fault::invalid_channel("cell", full)),
    }
}

/// Slot discipline of an [`array`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Slots {
    /// Every slot may be set or taken.
    Ready,
    /// Slot `i` was taken; only `set [i, _]` is accepted.
    Incomplete(usize),
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ArrayState {
    pub slots: Vec<Value>,
    pub discipline: Slots,
}

impl State for ArrayState {
    fn name(&self) -> &str {
        match self.discipline {
            Slots::Ready => "ready",
            Slots::Incomplete(_) => "incomplete",
        }
    }
}

/// Fixed-size array with borrow/return slots.
#[derive(Clone, Copy, Debug)]
pub struct Array {
    size: usize,
}

/// Array of `size` slots, initially `null`.
///
/// `take i` answers `result` with slot `i` and borrows it; until the
/// matching `set [i, v]` returns it, any other `take` or `set` answers
/// `err`. `set [i, v]` while ready always succeeds.
pub fn array(size: usize) -> Array {
    Array { size }
}

impl Array {
    fn index(&self, raw: &Value) -> Result<usize, String> {
        let index = raw
            .as_u64()
            .ok_or_else(|| format!("invalid index {raw}: not a non-negative integer"))?;
        match usize::try_from(index) {
            Ok(i) if i < self.size => Ok(i),
            _ => Err(format!(
                "invalid index {index}: out of range for size {}",
                self.size
            )),
        }
    }

    fn set(&self, mut state: ArrayState, channel: &Channel, data: Value) -> Step<ArrayState> {
        let Value::Array(pair) = data else {
            return Err(Fault::malformed(channel, "set expects [index, value]"));
        };
        let [raw, value]: [Value; 2] = pair
            .try_into()
            .map_err(|_| Fault::malformed(channel, "set expects [index, value]"))?;
        let index = match self.index(&raw) {
            Ok(index) => index,
            Err(reason) => return Ok((state, Message::err(reason))),
        };
        if let Slots::Incomplete(taken) = state.discipline {
            if taken != index {
                let reason = format!("invalid index {index}: slot {taken} is taken, expected set [{taken}, _]");
                return Ok((state, Message::err(reason)));
            }
        }
        state.slots[index] = value;
        state.discipline = Slots::Ready;
        Ok((state, Message::result(Value::Null)))
    }

    fn take(&self, mut state: ArrayState, data: Value) -> Step<ArrayState> {
        if let Slots::Incomplete(taken) = state.discipline {
            let reason = format!("invalid index: slot {taken} is taken, expected set [{taken}, _]");
            return Ok((state, Message::err(reason)));
        }
        let index = match self.index(&data) {
            Ok(index) => index,
            Err(reason) => return Ok((state, Message::err(reason))),
        };
        let value = std::mem::take(&mut state.slots[index]);
        state.discipline = Slots::Incomplete(index);
        Ok((state, Message::result(value)))
    }
}

impl Machine for Array {
    type State = ArrayState;

    fn start(&self) -> ArrayState {
        ArrayState {
            slots: vec![Value::Null; self.size],
            discipline: Slots::Ready,
        }
    }

    fn advance(&self, state: ArrayState, message: Message) -> Step<ArrayState> {
        let Message { channel, data } = message;
        if channel.is(SET) {
            self.set(state, &channel, data)
        } else if channel.is(TAKE) {
            self.take(state, data)
        } else {
            Err(Fault::invalid_channel(state.name(), &channel))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ERR;
    use serde_json::json;

    fn run<M: Machine>(machine: &M, state: M::State, channel: &str, data: Value) -> (M::State, Message) {
        machine.advance(state, Message::new(channel, data)).unwrap()
    }

    #[test]
    fn cell_set_then_copy() {
        let cell = primitive();
        let (state, ack) = run(&cell, cell.start(), "set", json!(5));
        assert_eq!(ack, Message::result(Value::Null));
        let (_, out) = run(&cell, state, "copy", Value::Null);
        assert_eq!(out.data, json!(5));
    }

    #[test]
    fn cell_element_set_writes_nested_slot() {
        let cell = primitive();
        let (state, _) = run(&cell, cell.start(), "set", json!([0, [1, 2]]));
        let (state, _) = run(&cell, state, "element/1/element/1/set", json!("x"));
        assert_eq!(state.value, json!([0, [1, "x"]]));
    }

    #[test]
    fn cell_element_errors_are_data() {
        let cell = primitive();
        let (state, _) = run(&cell, cell.start(), "set", json!(7));
        let (state, out) = run(&cell, state, "element/0/copy", Value::Null);
        assert!(out.channel.is(ERR));
        assert_eq!(state.value, json!(7));

        let (state, _) = run(&cell, state, "set", json!([1]));
        let (state, out) = run(&cell, state, "element/3/copy", Value::Null);
        assert!(out.channel.is(ERR));
        assert!(out.data.as_str().unwrap().contains("out of range"));

        let (_, out) = run(&cell, state, "element/x/copy", Value::Null);
        assert!(out.channel.is(ERR));
    }

    #[test]
    fn cell_unknown_channel_faults() {
        let cell = primitive();
        let fault = cell
            .advance(cell.start(), Message::new("element/0", Value::Null))
            .unwrap_err();
        assert!(matches!(fault, Fault::InvalidChannel { .. }));
        let fault = cell
            .advance(cell.start(), Message::new("poke", Value::Null))
            .unwrap_err();
        assert_eq!(fault, Fault::invalid_channel("cell", &Channel::parse("poke")));
    }

    #[test]
    fn array_set_then_take_returns_value() {
        let slots = array(3);
        let (state, _) = run(&slots, slots.start(), "set", json!([1, "v"]));
        let (state, out) = run(&slots, state, "take", json!(1));
        assert_eq!(out, Message::result(json!("v")));
        assert_eq!(state.discipline, Slots::Incomplete(1));
    }

    #[test]
    fn array_incomplete_slot_accepts_only_matching_set() {
        let slots = array(3);
        let (state, _) = run(&slots, slots.start(), "take", json!(0));

        let (state, out) = run(&slots, state, "take", json!(0));
        assert!(out.channel.is(ERR));
        assert!(out.data.as_str().unwrap().contains("invalid index"));

        let (state, out) = run(&slots, state, "set", json!([2, "x"]));
        assert!(out.channel.is(ERR));
        assert!(out.data.as_str().unwrap().contains("invalid index"));
        assert_eq!(state.discipline, Slots::Incomplete(0));

        let (state, out) = run(&slots, state, "set", json!([0, "back"]));
        assert_eq!(out, Message::result(Value::Null));
        assert_eq!(state.discipline, Slots::Ready);
        assert_eq!(state.slots[0], json!("back"));
    }

    #[test]
    fn array_out_of_range_never_mutates() {
        let slots = array(2);
        let start = slots.start();
        let (state, out) = run(&slots, start.clone(), "set", json!([2, 1]));
        assert!(out.channel.is(ERR));
        assert_eq!(state, start);

        let (state, out) = run(&slots, state, "take", json!(-1));
        assert!(out.channel.is(ERR));
        assert_eq!(state, start);
    }

    #[test]
    fn array_malformed_set_faults() {
        let slots = array(2);
        let fault = slots
            .advance(slots.start(), Message::new("set", json!(1)))
            .unwrap_err();
        assert!(matches!(fault, Fault::MalformedData { .. }));
    }
}
