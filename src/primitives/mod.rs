//! Primitive machines.
//!
//! The leaves every composite is built from:
//! - `constant`, `func`, `yield_on`, `brk` for control flow
//! - `primitive` and `array` for addressable memory

mod basic;
mod memory;

pub use basic::{brk, constant, func, yield_on, Brk, Constant, Func, FuncState, Stateless, Yield, YieldState};
pub use memory::{array, primitive, Array, ArrayState, CellState, Primitive, Slots};
