//! Completion value analysis.
//!
//! Before code is generated for a statement tree,
//! [`analyze`] marks every statement whose completion value
//! may be observed, either because it is the last statement to run
//! or because a break or continue carries its value out.
//! Statements left unmarked need not store their value.

#![warn(missing_docs)]

pub use self::{
    analyze::{Completion, analyze, analyze_with},
    arenas::*,
    error::*,
    tree::*,
};

mod analyze;
mod arenas;
mod error;
mod targets;
mod tree;
