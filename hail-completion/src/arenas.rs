use {super::tree::*, typed_arena::Arena};

/// Arenas for allocating statement trees in.
#[allow(missing_docs)]
pub struct Arenas<'a>
{
    pub statements: &'a Arena<Statement<'a>>,
    pub clauses: &'a Arena<Clause<'a>>,
}

impl<'a> Arenas<'a>
{
    /// Create arenas and pass them to the given function.
    pub fn with<R>(f: impl FnOnce(&Arenas) -> R) -> R
    {
        let statements = &Arena::new();
        let clauses = &Arena::new();
        let arenas = Arenas{statements, clauses};
        f(&arenas)
    }

    /// Move a node to a suitable arena.
    pub fn alloc<T>(&self, node: T) -> &'a mut T
        where T: ArenaNode<'a>
    {
        T::arena(self).alloc(node)
    }

    /// Move a collection of nodes to a suitable arena.
    pub fn alloc_extend<I>(&self, nodes: I) -> &'a mut [I::Item]
        where I: IntoIterator
            , I::Item: ArenaNode<'a>
    {
        I::Item::arena(self).alloc_extend(nodes)
    }

    /// Allocate a statement of the given kind.
    pub fn statement(&self, kind: StatementKind<'a>) -> &'a Statement<'a>
    {
        self.alloc(Statement::new(kind))
    }

    /// Allocate a list of statements of the given kinds.
    pub fn statements<I>(&self, kinds: I) -> &'a [Statement<'a>]
        where I: IntoIterator<Item=StatementKind<'a>>
    {
        self.alloc_extend(kinds.into_iter().map(Statement::new))
    }
}

/// Utility trait for [`Arenas::alloc`].
pub trait ArenaNode<'a>: Sized
{
    /// Return the arena for this type of node.
    fn arena(arenas: &Arenas<'a>) -> &'a Arena<Self>;
}

impl<'a> ArenaNode<'a> for Statement<'a>
{
    fn arena(arenas: &Arenas<'a>) -> &'a Arena<Self>
    {
        arenas.statements
    }
}

impl<'a> ArenaNode<'a> for Clause<'a>
{
    fn arena(arenas: &Arenas<'a>) -> &'a Arena<Self>
    {
        arenas.clauses
    }
}
