//! Deciding which statements must store their completion value.
//!
//! Statement lists are analyzed from the last statement to the first.
//! The analysis carries a [`Flow`] through the traversal:
//! whether the current point needs a completion value,
//! and whether any statement in the current scope was marked.
//! Once a statement produces a value, the statements before it
//! are only needed again if a jump reintroduces the need.
//!
//! The analysis is conservative:
//! it may mark statements whose value is never observed,
//! but it never leaves an observed statement unmarked.

use {
    super::{
        error::Result,
        targets::JumpTargets,
        tree::{Clause, Statement, StatementKind as K},
    },
    std::iter,
};

/// Mark the statements of a script.
///
/// The completion value of a script is observed by the host,
/// so the root statement needs a value.
pub fn analyze<'a>(root: &'a Statement<'a>) -> Result<Completion>
{
    analyze_with(root, true)
}

/// Mark the statements of a tree.
///
/// Pass `false` for trees whose completion value is never observed,
/// such as function bodies.
///
/// Returns whether the tree is statically known to produce a value.
pub fn analyze_with<'a>(root: &'a Statement<'a>, compute_value: bool)
    -> Result<Completion>
{
    log::debug!("Analyzing completion values (compute_value = {compute_value})");
    let mut analyzer = Analyzer::default();
    let flow = Flow{compute_value, write_value: false};
    let (completion, _) = analyzer.visit(root, flow)?;
    debug_assert_eq!(analyzer.targets.depth(), 0);
    Ok(completion)
}

/// Whether a statement leaves a value behind.
///
/// [`Completion::Empty`] statements, such as declarations and jumps,
/// leave the value of the statements before them in place.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Completion
{
    Empty,
    Value,
}

/// State threaded through the traversal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub (crate) struct Flow
{
    /// Whether the current point needs a completion value
    /// if control reaches it unobstructed.
    pub compute_value: bool,

    /// Whether any statement in the current scope was marked.
    pub write_value: bool,
}

impl Flow
{
    fn mark(&mut self, statement: &Statement, value: bool)
    {
        statement.set_completion_value(value);
        self.write_value |= value;
    }

    /// The flow after a statement that always supersedes
    /// the value of the statements before it.
    fn produced(self) -> Self
    {
        Self{compute_value: false, ..self}
    }
}

#[derive(Default)]
pub (crate) struct Analyzer<'a>
{
    targets: JumpTargets<'a>,
}

impl<'a> Analyzer<'a>
{
    /// Analyze a statement and return the flow
    /// for the statement that precedes it.
    pub fn visit(&mut self, statement: &'a Statement<'a>, mut flow: Flow)
        -> Result<(Completion, Flow)>
    {
        match statement.kind {

            K::Block(body) => {
                flow.mark(statement, flow.compute_value);
                self.visit_list(body, flow)
            },

            K::Expression => {
                flow.mark(statement, flow.compute_value);
                Ok((Completion::Value, flow.produced()))
            },

            K::If{then, otherwise} => {
                let incoming = flow.compute_value;

                let (_, after_then) = self.visit(then, flow)?;
                let mut merged = after_then.compute_value;
                flow = after_then;

                match otherwise {
                    Some(otherwise) => {
                        let seeded = Flow{compute_value: incoming, ..flow};
                        let (_, after_otherwise) = self.visit(otherwise, seeded)?;
                        merged |= after_otherwise.compute_value;
                        flow = after_otherwise;
                    },
                    None => merged |= incoming,
                }

                flow.mark(statement, merged);
                Ok((Completion::Value, flow.produced()))
            },

            K::Loop{body, ..} => {
                // Breaks and continues in the body see the tentative mark.
                statement.set_completion_value(flow.compute_value);

                let inner = Flow{compute_value: flow.compute_value, write_value: false};
                self.targets.push_unlabeled(statement);
                let result = self.visit(body, inner);
                self.targets.pop();
                let (_, inner) = result?;

                flow.mark(statement, inner.write_value || inner.compute_value);
                Ok((Completion::Value, flow.produced()))
            },

            K::Labeled{..} => self.visit_labeled(statement, flow),

            K::Break(label) => {
                let target = self.targets.lookup_break(label)?;
                log::trace!("Break to {target:?}");
                let compute_value = target.has_completion_value();
                Ok((Completion::Empty, Flow{compute_value, ..flow}))
            },

            K::Continue(label) => {
                let target = self.targets.lookup_continue(label)?;
                log::trace!("Continue to {target:?}");
                let compute_value = target.has_completion_value();
                Ok((Completion::Empty, Flow{compute_value, ..flow}))
            },

            K::Throw => {
                statement.set_completion_value(false);
                Ok((Completion::Empty, flow.produced()))
            },

            K::Try{block, catches, finally} => {
                let incoming = flow.compute_value;
                let mut merged = false;

                let parts = iter::once(block).chain(catches).chain(finally);
                for part in parts {
                    let seeded = Flow{compute_value: incoming, ..flow};
                    let (_, after) = self.visit(part, seeded)?;
                    merged |= after.compute_value;
                    flow = after;
                }

                flow.mark(statement, merged || (finally.is_some() && incoming));
                Ok((Completion::Value, flow.produced()))
            },

            K::Switch(clauses) => {
                let incoming = flow.compute_value;

                // Breaks in the clauses see the tentative mark.
                statement.set_completion_value(incoming);

                self.targets.push_unlabeled(statement);
                let result = self.visit_clauses(clauses, flow);
                self.targets.pop();
                let (merged, after) = result?;
                flow = after;

                flow.mark(statement, merged || (clauses.is_empty() && incoming));
                Ok((Completion::Value, flow.produced()))
            },

            K::Declaration | K::Empty | K::Debugger => {
                statement.set_completion_value(false);
                Ok((Completion::Empty, flow))
            },

            K::List(body) => {
                let child = Flow{compute_value: flow.compute_value, write_value: false};
                let (completion, child) = self.visit_list(body, child)?;
                statement.set_completion_value(child.write_value);
                let flow = Flow{
                    compute_value: child.compute_value,
                    write_value: flow.write_value || child.write_value,
                };
                Ok((completion, flow))
            },

        }
    }

    /// Analyze a statement list from the last statement to the first.
    fn visit_list(&mut self, list: &'a [Statement<'a>], mut flow: Flow)
        -> Result<(Completion, Flow)>
    {
        let mut completion = Completion::Empty;
        for statement in list.iter().rev() {
            let (this, after) = self.visit(statement, flow)?;
            completion = completion.max(this);
            flow = after;
        }
        Ok((completion, flow))
    }

    /// Analyze each clause of a switch statement,
    /// returning whether any clause needs a value before it.
    fn visit_clauses(&mut self, clauses: &'a [Clause<'a>], mut flow: Flow)
        -> Result<(bool, Flow)>
    {
        let incoming = flow.compute_value;
        let mut merged = false;
        for clause in clauses {
            let seeded = Flow{compute_value: incoming, ..flow};
            let (_, after) = self.visit_list(clause.body, seeded)?;
            merged |= after.compute_value;
            flow = after;
        }
        Ok((merged, flow))
    }

    /// Analyze a chain of labeled statements.
    ///
    /// Every label in the chain targets the innermost non-labeled statement,
    /// and every labeled statement in the chain is marked like it.
    fn visit_labeled(&mut self, statement: &'a Statement<'a>, flow: Flow)
        -> Result<(Completion, Flow)>
    {
        let mut inner = statement;
        while let K::Labeled{body, ..} = inner.kind {
            inner = body;
        }

        let mut pushed = 0;
        let mut labeled = statement;
        while let K::Labeled{label, body} = labeled.kind {
            self.targets.push_labeled(label, inner);
            pushed += 1;
            labeled = body;
        }

        // Jumps in the inner statement see the tentative mark.
        inner.set_completion_value(flow.compute_value);

        let result = self.visit(inner, flow);
        for _ in 0 .. pushed {
            self.targets.pop();
        }
        let (completion, flow) = result?;

        let mut labeled = statement;
        while let K::Labeled{body, ..} = labeled.kind {
            labeled.set_completion_value(inner.has_completion_value());
            labeled = body;
        }

        Ok((completion, flow))
    }
}
