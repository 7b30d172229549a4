//! Deduplicating constant pools with overflow chaining.
//!
//! A pool is an arena of _segments_.
//! Each segment holds at most [`Limits::pool_capacity`] distinct constants,
//! counted across all categories together.
//! When the last segment is full, interning a new constant
//! appends a fresh segment and places the constant there.
//! Segments are never removed and constants are never evicted.
//!
//! [`Limits::pool_capacity`]: `crate::Limits::pool_capacity`

pub use self::shared::*;

use {
    crate::{
        instruction::{Instruction, Register},
        method::Method,
        unit::UnitId,
    },
    std::{collections::HashMap, fmt, sync::Arc},
    thiserror::Error,
};

mod shared;

/* -------------------------------------------------------------------------- */
/*                                  Constants                                 */
/* -------------------------------------------------------------------------- */

/// Category of an immediate constant.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Category
{
    Int,
    Long,
    Float,
    Double,
    String,
}

impl Category
{
    /// Every category, in serialization order.
    pub const ALL: [Self; 5] =
        [Self::Int, Self::Long, Self::Float, Self::Double, Self::String];

    fn index(self) -> usize
    {
        self as usize
    }
}

/// Immediate constant value.
#[allow(missing_docs)]
#[derive(Clone, Debug)]
pub enum Constant
{
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(Arc<str>),
}

/// Deduplication key of a constant.
///
/// Floating-point values are compared by bit pattern,
/// so `0.0` and `-0.0` are distinct and equal NaNs are one constant.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
enum ConstantKey
{
    Int(i32),
    Long(i64),
    Float(u32),
    Double(u64),
    String(Arc<str>),
}

impl Constant
{
    /// The category the constant belongs to.
    pub fn category(&self) -> Category
    {
        match self {
            Self::Int(..)    => Category::Int,
            Self::Long(..)   => Category::Long,
            Self::Float(..)  => Category::Float,
            Self::Double(..) => Category::Double,
            Self::String(..) => Category::String,
        }
    }

    fn key(&self) -> ConstantKey
    {
        match self {
            Self::Int(value)    => ConstantKey::Int(*value),
            Self::Long(value)   => ConstantKey::Long(*value),
            Self::Float(value)  => ConstantKey::Float(value.to_bits()),
            Self::Double(value) => ConstantKey::Double(value.to_bits()),
            Self::String(value) => ConstantKey::String(value.clone()),
        }
    }
}

impl PartialEq for Constant
{
    fn eq(&self, other: &Self) -> bool
    {
        self.key() == other.key()
    }
}

impl Eq for Constant
{
}

/// Error returned when a number cannot be interned.
#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq)]
pub enum InternError
{
    #[error("{value} is not exactly representable as {category:?}")]
    Inexact{category: Category, value: f64},

    #[error("Strings are interned with intern_string")]
    NotANumber,
}

/* -------------------------------------------------------------------------- */
/*                                  Slot refs                                 */
/* -------------------------------------------------------------------------- */

/// Identifies a constant pool within a session.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PoolId
{
    /// The pool local to a unit.
    Unit(UnitId),

    /// The pool shared by all units of a session.
    Shared,
}

/// Where an interned constant lives.
///
/// Code generation needs the pool and segment
/// to know which container to reference when loading the constant.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SlotRef
{
    pub pool: PoolId,
    pub segment: u32,
    pub category: Category,
    pub index: u16,
}

/* -------------------------------------------------------------------------- */
/*                                    Pools                                   */
/* -------------------------------------------------------------------------- */

/// One bounded container of constants.
#[derive(Debug, Default)]
struct Segment
{
    slots: HashMap<ConstantKey, u16>,
    constants: [Vec<Constant>; 5],
}

impl Segment
{
    /// The number of distinct constants across all categories.
    fn len(&self) -> usize
    {
        self.slots.len()
    }

    fn get(&self, key: &ConstantKey) -> Option<u16>
    {
        self.slots.get(key).copied()
    }

    /// Assign the next index in the constant's category.
    fn insert(&mut self, key: ConstantKey, constant: Constant) -> u16
    {
        let constants = &mut self.constants[constant.category().index()];
        // Capacity is at most u16::MAX, so this cannot truncate.
        let index = constants.len() as u16;
        constants.push(constant);
        self.slots.insert(key, index);
        index
    }
}

/// Deduplicating pool of immediate constants.
///
/// Inline strategy: loads reference the pool of the unit
/// that contains the method doing the load.
#[derive(Debug)]
pub struct ConstantPool
{
    id: PoolId,
    capacity: u16,
    // INVARIANT: Non-empty.
    // INVARIANT: Every segment but the last holds exactly capacity constants.
    segments: Vec<Segment>,
}

impl ConstantPool
{
    /// Create an empty pool with a single segment.
    ///
    /// # Panics
    ///
    /// If `capacity` is zero.
    pub fn new(id: PoolId, capacity: u16) -> Self
    {
        assert!(capacity > 0, "Constant pool capacity must be at least one");
        Self{id, capacity, segments: vec![Segment::default()]}
    }

    /// The identity carried by slot refs into this pool.
    pub fn id(&self) -> PoolId
    {
        self.id
    }

    /// The number of distinct constants across all segments.
    pub fn len(&self) -> usize
    {
        self.segments.iter().map(Segment::len).sum()
    }

    /// Whether nothing was interned yet.
    pub fn is_empty(&self) -> bool
    {
        self.len() == 0
    }

    /// The number of segments, including the first.
    pub fn segment_count(&self) -> usize
    {
        self.segments.len()
    }

    /// Intern a constant and return where it lives.
    ///
    /// If an equal constant was interned before,
    /// its existing slot is returned.
    pub fn intern(&mut self, constant: Constant) -> SlotRef
    {
        let key = constant.key();
        let category = constant.category();

        let mut segment = 0;
        loop {
            let current = &mut self.segments[segment];

            if let Some(index) = current.get(&key) {
                return self.slot(segment, category, index);
            }

            if current.len() < self.capacity as usize {
                let index = current.insert(key, constant);
                return self.slot(segment, category, index);
            }

            if segment + 1 == self.segments.len() {
                log::debug!(
                    "Constant pool {:?} segment {} is full; chaining segment {}",
                    self.id, segment, segment + 1,
                );
                self.segments.push(Segment::default());
            }

            segment += 1;
        }
    }

    /// Intern a number, converting it to the given category.
    ///
    /// The conversion must be exact: a value that the category
    /// cannot represent is rejected rather than rounded.
    /// NaN is only representable as a float or a double.
    pub fn intern_number(&mut self, category: Category, value: f64)
        -> Result<SlotRef, InternError>
    {
        let inexact = || InternError::Inexact{category, value};
        let constant = match category {
            Category::Int => {
                let int = value as i32;
                if int as f64 != value {
                    return Err(inexact());
                }
                Constant::Int(int)
            },
            Category::Long => {
                // The bounds are exact powers of two; i64::MAX is not.
                if !(-9.223372036854775808e18 .. 9.223372036854775808e18)
                    .contains(&value)
                {
                    return Err(inexact());
                }
                let long = value as i64;
                if long as f64 != value {
                    return Err(inexact());
                }
                Constant::Long(long)
            },
            Category::Float => {
                let float = value as f32;
                if !value.is_nan() && float as f64 != value {
                    return Err(inexact());
                }
                Constant::Float(float)
            },
            Category::Double => Constant::Double(value),
            Category::String => return Err(InternError::NotANumber),
        };
        Ok(self.intern(constant))
    }

    #[allow(missing_docs)]
    pub fn intern_int(&mut self, value: i32) -> SlotRef
    {
        self.intern(Constant::Int(value))
    }

    #[allow(missing_docs)]
    pub fn intern_long(&mut self, value: i64) -> SlotRef
    {
        self.intern(Constant::Long(value))
    }

    #[allow(missing_docs)]
    pub fn intern_float(&mut self, value: f32) -> SlotRef
    {
        self.intern(Constant::Float(value))
    }

    #[allow(missing_docs)]
    pub fn intern_double(&mut self, value: f64) -> SlotRef
    {
        self.intern(Constant::Double(value))
    }

    /// Intern a string.
    pub fn intern_string(&mut self, value: &str) -> SlotRef
    {
        self.intern(Constant::String(value.into()))
    }

    /// Look up a constant without interning it.
    pub fn lookup(&self, constant: &Constant) -> Option<SlotRef>
    {
        let key = constant.key();
        self.segments.iter().enumerate()
            .find_map(|(segment, current)| {
                let index = current.get(&key)?;
                Some(self.slot(segment, constant.category(), index))
            })
    }

    /// Freeze the pool.
    ///
    /// Consuming the pool makes interning after close impossible.
    pub fn close(self) -> ClosedPool
    {
        for segment in &self.segments {
            let stored: usize = segment.constants.iter().map(Vec::len).sum();
            debug_assert_eq!(stored, segment.len());
            debug_assert!(segment.len() <= self.capacity as usize);
        }
        ClosedPool{id: self.id, segments: self.segments}
    }

    fn slot(&self, segment: usize, category: Category, index: u16) -> SlotRef
    {
        // There cannot be more segments than distinct values of all kinds.
        let segment = segment as u32;
        SlotRef{pool: self.id, segment, category, index}
    }
}

/// Constant pool that no longer accepts constants.
#[derive(Debug)]
pub struct ClosedPool
{
    id: PoolId,
    segments: Vec<Segment>,
}

impl ClosedPool
{
    /// The identity of the pool this was closed from.
    pub fn id(&self) -> PoolId
    {
        self.id
    }

    /// The number of segments.
    pub fn segment_count(&self) -> usize
    {
        self.segments.len()
    }

    /// The constants of a category in a segment, indexed by slot.
    ///
    /// The final emission step uses this to materialize
    /// the backing storage of each segment.
    pub fn all_constants(&self, segment: usize, category: Category)
        -> &[Constant]
    {
        &self.segments[segment].constants[category.index()]
    }

    /// Resolve a slot ref into the constant it refers to.
    pub fn get(&self, slot: SlotRef) -> Option<&Constant>
    {
        if slot.pool != self.id {
            return None;
        }
        self.segments.get(slot.segment as usize)?
            .constants[slot.category.index()]
            .get(slot.index as usize)
    }
}

/* -------------------------------------------------------------------------- */
/*                               Load strategies                              */
/* -------------------------------------------------------------------------- */

/// Turns resolved slots into load instructions.
///
/// Each pool strategy references its storage differently,
/// so instruction selection goes through this trait
/// rather than emitting loads itself.
pub trait EmitLoad
{
    /// Append instructions to `method` that load `slot` into `target`.
    fn emit_load(&self, method: &mut Method, target: Register, slot: SlotRef);
}

impl EmitLoad for ConstantPool
{
    fn emit_load(&self, method: &mut Method, target: Register, slot: SlotRef)
    {
        assert_eq!(slot.pool, self.id, "Slot belongs to another pool");
        method.build(Instruction::LoadConstant{target, slot});
    }
}

/* -------------------------------------------------------------------------- */
/*                                   Display                                  */
/* -------------------------------------------------------------------------- */

impl fmt::Display for Constant
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        match self {
            Self::Int(value)    => write!(f, "{value}"),
            Self::Long(value)   => write!(f, "{value}L"),
            Self::Float(value)  => write!(f, "{value:?}F"),
            Self::Double(value) => write!(f, "{value:?}"),
            Self::String(value) => write!(f, "{value:?}"),
        }
    }
}

impl fmt::Display for SlotRef
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        let category = match self.category {
            Category::Int    => "I",
            Category::Long   => "J",
            Category::Float  => "F",
            Category::Double => "D",
            Category::String => "S",
        };
        match self.pool {
            PoolId::Unit(unit) => write!(f, "U{}", unit.0)?,
            PoolId::Shared     => write!(f, "SH")?,
        }
        write!(f, ".{}#{}{}", self.segment, category, self.index)
    }
}

/* -------------------------------------------------------------------------- */
/*                                    Tests                                   */
/* -------------------------------------------------------------------------- */
