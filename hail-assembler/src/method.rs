//! Method and field records.

use {
    crate::{
        flags::{AccessFlags, MemberKind},
        instruction::{Instruction, Register},
        unit::UnitId,
    },
    std::{fmt, sync::Arc},
};

/// Identifies a method within a session.
///
/// The handle is bound to the unit that created the method
/// and must only be used with that unit.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct MethodId
{
    /// The unit that holds the method.
    pub unit: UnitId,

    /// Position of the method within its unit.
    pub index: u32,
}

/// Method or constructor with its instructions.
#[derive(Debug)]
pub struct Method
{
    id: MethodId,
    kind: MemberKind,
    flags: AccessFlags,
    name: Arc<str>,
    signature: Arc<str>,
    instructions: Vec<Instruction>,
    max_register: Option<Register>,
}

/// Field declaration.
#[allow(missing_docs)]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Field
{
    pub flags: AccessFlags,
    pub name: Arc<str>,
    pub type_: Arc<str>,
    pub signature: Option<Arc<str>>,
}

impl Method
{
    /// Name given to every constructor.
    pub const CONSTRUCTOR_NAME: &'static str = "<init>";

    pub (crate) fn new(
        id: MethodId,
        kind: MemberKind,
        flags: AccessFlags,
        name: Arc<str>,
        signature: Arc<str>,
    ) -> Self
    {
        Self{
            id, kind, flags, name, signature,
            instructions: Vec::new(),
            max_register: None,
        }
    }

    /// Append an instruction to the method.
    pub fn build(&mut self, instruction: Instruction)
    {
        let max = instruction.registers().into_iter().max();
        self.max_register = self.max_register.max(max);
        self.instructions.push(instruction);
    }

    #[allow(missing_docs)]
    pub fn id(&self) -> MethodId
    {
        self.id
    }

    /// Whether this is a method or a constructor.
    pub fn kind(&self) -> MemberKind
    {
        self.kind
    }

    #[allow(missing_docs)]
    pub fn flags(&self) -> AccessFlags
    {
        self.flags
    }

    #[allow(missing_docs)]
    pub fn name(&self) -> &str
    {
        &self.name
    }

    #[allow(missing_docs)]
    pub fn signature(&self) -> &str
    {
        &self.signature
    }

    /// The instructions appended so far.
    pub fn instructions(&self) -> &[Instruction]
    {
        &self.instructions
    }

    /// Highest register used by any instruction.
    ///
    /// If no instructions use registers, this is [`None`].
    pub fn max_register(&self) -> Option<Register>
    {
        self.max_register
    }
}

impl fmt::Display for Method
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        write!(f, "{} {}{} {:?}\n",
               self.kind, self.name, self.signature, self.flags)?;
        for (i, instruction) in self.instructions.iter().enumerate() {
            write!(f, "{i:>6} {instruction}\n")?;
        }
        Ok(())
    }
}
