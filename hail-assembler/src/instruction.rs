//! Instructions appended to method bodies.
//!
//! Choosing which instructions model a language construct
//! is up to instruction selection; this module only defines
//! the instructions the assembler itself must know about.

use {crate::pool::SlotRef, smallvec::SmallVec, std::fmt};

/// Identifies an on-stack storage location.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Register(pub u16);

/// Elementary instruction.
#[allow(missing_docs)]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Instruction
{
    /// Load a constant from the pool of the enclosing unit.
    LoadConstant{target: Register, slot: SlotRef},

    /// Load a constant from the pool shared by the session.
    LoadShared{target: Register, slot: SlotRef},

    /// Load undef to a register.
    LoadUndef{target: Register},

    /// Copy a value from one register into another.
    CopyRegister{target: Register, source: Register},

    /// Store a register as the completion value.
    StoreCompletion{source: Register},

    /// Load the completion value into a register.
    LoadCompletion{target: Register},

    /// Operation chosen by instruction selection.
    ///
    /// The assembler does not interpret the opcode.
    Operation{opcode: u8, operands: SmallVec<[Register; 3]>},

    /// Return to the caller with a result.
    Return{result: Register},

    /// Return to the caller with an exception.
    Throw{exception: Register},
}

impl Instruction
{
    /// Whether the instruction is a terminator.
    ///
    /// A terminator unconditionally transfers control;
    /// it never continues to the subsequent instruction.
    pub fn is_terminator(&self) -> bool
    {
        match self {
            // Terminators.
            Self::Return{..} => true,
            Self::Throw{..}  => true,

            // Non-terminators.
            Self::LoadConstant{..}    => false,
            Self::LoadShared{..}      => false,
            Self::LoadUndef{..}       => false,
            Self::CopyRegister{..}    => false,
            Self::StoreCompletion{..} => false,
            Self::LoadCompletion{..}  => false,
            Self::Operation{..}       => false,
        }
    }

    /// The registers used by the instruction.
    ///
    /// The registers are yielded in arbitrary order.
    /// The same register is yielded multiple times
    /// if it appears multiple times in the instruction.
    pub fn registers(&self) -> SmallVec<[Register; 3]>
    {
        match self {
            Self::LoadConstant{target, ..}      => [*target].into_iter().collect(),
            Self::LoadShared{target, ..}        => [*target].into_iter().collect(),
            Self::LoadUndef{target}             => [*target].into_iter().collect(),
            Self::CopyRegister{target, source}  => [*target, *source].into_iter().collect(),
            Self::StoreCompletion{source}       => [*source].into_iter().collect(),
            Self::LoadCompletion{target}        => [*target].into_iter().collect(),
            Self::Operation{operands, ..}       => operands.clone(),
            Self::Return{result}                => [*result].into_iter().collect(),
            Self::Throw{exception}              => [*exception].into_iter().collect(),
        }
    }
}

/* -------------------------------------------------------------------------- */
/*                                   Display                                  */
/* -------------------------------------------------------------------------- */

impl fmt::Debug for Register
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        // We explicitly *do not* want to use f.debug_tuple,
        // as that would insert noisy newlines with {:#?}.
        write!(f, "Register({:?})", self.0)
    }
}

impl fmt::Display for Register
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        write!(f, "R{}", self.0)
    }
}

impl fmt::Display for Instruction
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        match self {
            Self::LoadConstant{target, slot} =>
                write!(f, "LOAD_CONSTANT    {target}, {slot}"),
            Self::LoadShared{target, slot} =>
                write!(f, "LOAD_SHARED      {target}, {slot}"),
            Self::LoadUndef{target} =>
                write!(f, "LOAD_UNDEF       {target}"),
            Self::CopyRegister{target, source} =>
                write!(f, "COPY_REGISTER    {target}, {source}"),
            Self::StoreCompletion{source} =>
                write!(f, "STORE_COMPLETION {source}"),
            Self::LoadCompletion{target} =>
                write!(f, "LOAD_COMPLETION  {target}"),
            Self::Operation{opcode, operands} => {
                write!(f, "OPERATION        {opcode:#04x}")?;
                for operand in operands {
                    write!(f, ", {operand}")?;
                }
                Ok(())
            },
            Self::Return{result} =>
                write!(f, "RETURN           {result}"),
            Self::Throw{exception} =>
                write!(f, "THROW            {exception}"),
        }
    }
}
