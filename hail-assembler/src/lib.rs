//! Assembler for register-based bytecode units.
//!
//! A [`CodeSession`] owns one main [`CodeUnit`] and any number of
//! overflow units that are opened when the active unit runs out of
//! room for methods. Each unit has a [`ConstantPool`] of its own,
//! and all units may load from a lazily created [`SharedPool`].
//! Closing the session serializes every unit with a [`TargetWriter`].

#![warn(missing_docs)]

pub use self::{
    flags::*,
    instruction::*,
    limits::*,
    method::*,
    pool::*,
    session::*,
    unit::*,
    verify::*,
    writer::*,
};

mod flags;
mod instruction;
mod limits;
mod method;
mod pool;
mod session;
mod unit;
mod verify;
mod writer;
