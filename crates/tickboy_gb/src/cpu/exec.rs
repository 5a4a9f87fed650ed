//! Handlers for the unprefixed opcode table, grouped by instruction family.
//!
//! Every handler has one of the three shapes held by [`super::Operation`]:
//! no operand, one immediate byte, or one immediate little-endian word.
//! Register operands are const generics so a single handler body covers a
//! whole row of the opcode map.

mod alu;
mod control;
mod incdec;
mod ld;
mod stack;
mod system;

pub(crate) use alu::*;
pub(crate) use control::*;
pub(crate) use incdec::*;
pub(crate) use ld::*;
pub(crate) use stack::*;
pub(crate) use system::*;
