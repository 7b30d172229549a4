//! Hard limits imposed by the target format.

use {serde::{Deserialize, Serialize}, thiserror::Error};

/// Per-container limits that drive rollover and pool chaining.
///
/// Exceeding either limit is never an error.
/// Exceeding [`max_methods`][`Self::max_methods`] opens a new unit,
/// and exceeding [`pool_capacity`][`Self::pool_capacity`]
/// chains a new pool segment.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits
{
    /// Maximum number of ordinary methods in one unit.
    pub max_methods: u32,

    /// Maximum number of distinct constants in one pool segment,
    /// counted across all categories together.
    pub pool_capacity: u16,
}

/// Returned by [`Limits::validate`].
#[allow(missing_docs)]
#[derive(Debug, Eq, Error, PartialEq)]
pub enum LimitsError
{
    #[error("Method limit must be at least one")]
    ZeroMethods,

    #[error("Pool capacity must be at least one")]
    ZeroPoolCapacity,
}

impl Limits
{
    /// Default method limit per unit.
    pub const DEFAULT_MAX_METHODS: u32 = 4096;

    /// Default pool capacity, the largest signed 16-bit index.
    pub const DEFAULT_POOL_CAPACITY: u16 = i16::MAX as u16;

    /// Check that the limits allow any progress at all.
    pub fn validate(&self) -> Result<(), LimitsError>
    {
        if self.max_methods == 0 {
            return Err(LimitsError::ZeroMethods);
        }
        if self.pool_capacity == 0 {
            return Err(LimitsError::ZeroPoolCapacity);
        }
        Ok(())
    }
}

impl Default for Limits
{
    fn default() -> Self
    {
        Self{
            max_methods: Self::DEFAULT_MAX_METHODS,
            pool_capacity: Self::DEFAULT_POOL_CAPACITY,
        }
    }
}
