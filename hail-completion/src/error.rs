use thiserror::Error;

/// Result from the analysis.
pub type Result<T> =
    std::result::Result<T, Error>;

/// Error returned during analysis.
///
/// These arise from jump statements the front end should have rejected.
#[allow(missing_docs)]
#[derive(Debug, Eq, Error, PartialEq)]
pub enum Error
{
    #[error("Undefined label `{0}`")]
    UndefinedLabel(String),

    #[error("Break outside of loop or switch")]
    BreakOutsideBreakable,

    #[error("Continue outside of loop")]
    ContinueOutsideLoop,

    #[error("Continue to label `{0}`, which is not a loop")]
    ContinueToNonLoop(String),
}
