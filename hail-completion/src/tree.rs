//! Statement trees as seen by the completion analysis.
//!
//! Only the statement structure matters to the analysis,
//! so expressions are not represented.

use std::{cell::Cell, fmt};

/// Statement with its completion annotation.
pub struct Statement<'a>
{
    /// What kind of statement this is.
    pub kind: StatementKind<'a>,

    completion: Cell<bool>,
}

/// Kind of statement.
#[allow(missing_docs)]
#[derive(Debug)]
pub enum StatementKind<'a>
{
    /// `{ a; b; }`
    Block(&'a [Statement<'a>]),

    /// `f();`
    Expression,

    /// `if (x) a; else b;`
    If{
        then: &'a Statement<'a>,
        otherwise: Option<&'a Statement<'a>>,
    },

    /// `for (;;) a;` and friends.
    Loop{
        kind: LoopKind,
        body: &'a Statement<'a>,
    },

    /// `l: a;`
    Labeled{
        label: &'a str,
        body: &'a Statement<'a>,
    },

    /// `break;` or `break l;`
    Break(Option<&'a str>),

    /// `continue;` or `continue l;`
    Continue(Option<&'a str>),

    /// `throw e;`
    Throw,

    /// `try a catch (e) b finally c`
    Try{
        block: &'a Statement<'a>,
        catches: &'a [Statement<'a>],
        finally: Option<&'a Statement<'a>>,
    },

    /// `switch (x) { case 1: a; default: b; }`
    Switch(&'a [Clause<'a>]),

    /// `var x = 1;`, `function f() {}`.
    Declaration,

    /// `;`
    Empty,

    /// `debugger;`
    Debugger,

    /// Statements grouped by the front end that have no syntax of their own.
    List(&'a [Statement<'a>]),
}

/// Kind of loop.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoopKind
{
    For,
    While,
    DoWhile,
    ForIn,
    ForOf,
}

/// Case or default clause of a switch statement.
#[allow(missing_docs)]
#[derive(Debug)]
pub struct Clause<'a>
{
    pub body: &'a [Statement<'a>],
}

impl<'a> Statement<'a>
{
    /// Create a statement that has not been analyzed yet.
    pub fn new(kind: StatementKind<'a>) -> Self
    {
        Self{kind, completion: Cell::new(false)}
    }

    /// Whether the statement must store its completion value.
    ///
    /// This is meaningful only after the tree has been analyzed.
    pub fn has_completion_value(&self) -> bool
    {
        self.completion.get()
    }

    pub (crate) fn set_completion_value(&self, value: bool)
    {
        self.completion.set(value);
    }

    /// Whether a break without a label can target this statement.
    pub fn is_breakable(&self) -> bool
    {
        matches!(self.kind, StatementKind::Loop{..} | StatementKind::Switch(..))
    }

    /// Whether a continue can target this statement.
    pub fn is_loop(&self) -> bool
    {
        matches!(self.kind, StatementKind::Loop{..})
    }
}

impl<'a> fmt::Debug for Statement<'a>
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        // We explicitly *do not* want to use f.debug_struct,
        // as the annotation is noise next to the kind.
        if self.has_completion_value() {
            write!(f, "+")?;
        }
        write!(f, "{:?}", self.kind)
    }
}
