//! Resolving the targets of break and continue statements.

use {
    super::{error::{Error, Result}, tree::Statement},
    smallvec::SmallVec,
};

/// Statement that break or continue statements may jump to.
#[derive(Clone, Copy)]
struct JumpTarget<'a>
{
    /// Label if pushed by a labeled statement,
    /// otherwise this is an unlabeled loop or switch.
    label: Option<&'a str>,

    /// The innermost non-labeled statement.
    statement: &'a Statement<'a>,
}

/// Stack of jump targets enclosing the current statement.
///
/// Targets are pushed when entering a statement and popped when leaving it.
/// Lookups search from the innermost target outwards.
#[derive(Default)]
pub (crate) struct JumpTargets<'a>
{
    stack: SmallVec<[JumpTarget<'a>; 8]>,
}

impl<'a> JumpTargets<'a>
{
    /// Push a target for a labeled statement.
    pub fn push_labeled(&mut self, label: &'a str, statement: &'a Statement<'a>)
    {
        self.stack.push(JumpTarget{label: Some(label), statement});
    }

    /// Push a target for an unlabeled loop or switch.
    pub fn push_unlabeled(&mut self, statement: &'a Statement<'a>)
    {
        debug_assert!(statement.is_breakable());
        self.stack.push(JumpTarget{label: None, statement});
    }

    pub fn pop(&mut self)
    {
        self.stack.pop();
    }

    pub fn depth(&self) -> usize
    {
        self.stack.len()
    }

    /// Find the statement a break jumps out of.
    pub fn lookup_break(&self, label: Option<&str>) -> Result<&'a Statement<'a>>
    {
        match label {
            Some(label) => self.lookup_label(label),
            None =>
                self.stack.iter().rev()
                .map(|target| target.statement)
                .find(|statement| statement.is_breakable())
                .ok_or(Error::BreakOutsideBreakable),
        }
    }

    /// Find the loop a continue jumps to the next iteration of.
    pub fn lookup_continue(&self, label: Option<&str>)
        -> Result<&'a Statement<'a>>
    {
        match label {
            Some(label) => {
                let statement = self.lookup_label(label)?;
                if !statement.is_loop() {
                    return Err(Error::ContinueToNonLoop(label.to_owned()));
                }
                Ok(statement)
            },
            None =>
                self.stack.iter().rev()
                .map(|target| target.statement)
                .find(|statement| statement.is_loop())
                .ok_or(Error::ContinueOutsideLoop),
        }
    }

    fn lookup_label(&self, label: &str) -> Result<&'a Statement<'a>>
    {
        self.stack.iter().rev()
            .find(|target| target.label == Some(label))
            .map(|target| target.statement)
            .ok_or_else(|| Error::UndefinedLabel(label.to_owned()))
    }
}

#[cfg(test)]
mod tests
{
    use {super::*, crate::{arenas::Arenas, tree::{LoopKind, StatementKind as K}}};

    #[test]
    fn innermost()
    {
        Arenas::with(|arenas| {
            let empty = arenas.statement(K::Empty);
            let outer = arenas.statement(K::Loop{kind: LoopKind::While, body: empty});
            let inner = arenas.statement(K::Switch(&[]));
            let block = arenas.statement(K::Block(&[]));

            let mut targets = JumpTargets::default();
            targets.push_labeled("a", outer);
            targets.push_unlabeled(outer);
            targets.push_unlabeled(inner);
            targets.push_labeled("b", block);

            assert!(std::ptr::eq(targets.lookup_break(None).unwrap(), inner));
            assert!(std::ptr::eq(targets.lookup_continue(None).unwrap(), outer));
            assert!(std::ptr::eq(targets.lookup_break(Some("b")).unwrap(), block));
            assert!(std::ptr::eq(targets.lookup_continue(Some("a")).unwrap(), outer));
            assert_eq!(
                targets.lookup_continue(Some("b")).unwrap_err(),
                Error::ContinueToNonLoop("b".into()),
            );
            assert_eq!(
                targets.lookup_break(Some("c")).unwrap_err(),
                Error::UndefinedLabel("c".into()),
            );

            targets.pop();
            targets.pop();
            targets.pop();
            assert_eq!(targets.depth(), 1);
            assert!(std::ptr::eq(targets.lookup_break(None).unwrap(), outer));
        });
    }

    #[test]
    fn shadowed_label()
    {
        Arenas::with(|arenas| {
            let outer = arenas.statement(K::Block(&[]));
            let inner = arenas.statement(K::Block(&[]));

            let mut targets = JumpTargets::default();
            targets.push_labeled("a", outer);
            targets.push_labeled("a", inner);
            assert!(std::ptr::eq(targets.lookup_break(Some("a")).unwrap(), inner));
        });
    }

    #[test]
    fn empty()
    {
        let targets = JumpTargets::default();
        assert_eq!(targets.lookup_break(None).unwrap_err(),
                   Error::BreakOutsideBreakable);
        assert_eq!(targets.lookup_continue(None).unwrap_err(),
                   Error::ContinueOutsideLoop);
    }
}
