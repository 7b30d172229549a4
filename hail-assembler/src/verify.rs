//! Verification of method bodies before a unit is closed.
//!
//! The target writer assumes every method body it receives
//! cannot run off its end. Checking this once when the unit
//! is closed keeps the writer free of such checks.

use {crate::method::Method, std::sync::Arc, thiserror::Error};

/// Error returned during verification.
#[allow(missing_docs)]
#[derive(Debug, Eq, Error, PartialEq)]
pub enum VerifyError
{
    #[error("Method `{0}` has no instructions")]
    NoInstructions(Arc<str>),

    #[error("The last instruction of method `{0}` is not a terminator")]
    LastInstructionIsNotATerminator(Arc<str>),

    #[error("Method `{0}` is abstract or native but has instructions")]
    UnexpectedBody(Arc<str>),
}

/// Verify a method.
///
/// Methods without a body must have no instructions.
/// Other methods must end with a terminator.
pub fn verify(method: &Method) -> Result<(), VerifyError>
{
    let name = || Arc::from(method.name());

    if !method.flags().has_body() {
        if !method.instructions().is_empty() {
            return Err(VerifyError::UnexpectedBody(name()));
        }
        return Ok(());
    }

    let last_instruction =
        method.instructions().last()
        .ok_or_else(|| VerifyError::NoInstructions(name()))?;

    if !last_instruction.is_terminator() {
        return Err(VerifyError::LastInstructionIsNotATerminator(name()));
    }

    Ok(())
}
