//! Serializing closed units into bytes.
//!
//! The concrete on-disk format is a pluggable [`TargetWriter`].
//! [`BinaryWriter`] is a simple deterministic format
//! used when no other writer is configured.

use {
    crate::{
        instruction::{Instruction, Register},
        method::{Field, Method},
        pool::{Category, ClosedPool, Constant, PoolId, SlotRef},
    },
};

/// Serializes the records of one unit.
///
/// Fields are written as they are added,
/// methods and pools when the unit is closed.
pub trait TargetWriter: Sized
{
    /// Start writing a unit with the given name.
    fn new(unit_name: &str) -> Self;

    /// Write a field record.
    fn write_field(&mut self, field: &Field);

    /// Write a method record with its body.
    fn write_method(&mut self, method: &Method);

    /// Write the backing storage of a pool.
    fn write_pool(&mut self, pool: &ClosedPool);

    /// Finish the unit and return its bytes.
    fn finish(self) -> Vec<u8>;
}

/// Writes units in a simple little-endian format.
///
/// Two units with the same records in the same order
/// serialize to identical bytes.
pub struct BinaryWriter
{
    buf: Vec<u8>,
}

impl BinaryWriter
{
    /// Bytes every unit starts with.
    pub const MAGIC: &'static [u8; 4] = b"HAIL";

    /// Version of the format.
    pub const VERSION: u16 = 1;

    const TAG_END: u8 = 0x00;
    const TAG_FIELD: u8 = 0x01;
    const TAG_METHOD: u8 = 0x02;
    const TAG_POOL: u8 = 0x03;

    /* ---------------------------------------------------------------------- */
    /*                                Emit helpers                            */
    /* ---------------------------------------------------------------------- */

    fn emit_u8(&mut self, v: u8)
    {
        self.buf.push(v);
    }

    fn emit_u16(&mut self, v: u16)
    {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn emit_u32(&mut self, v: u32)
    {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn emit_u64(&mut self, v: u64)
    {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn emit_len(&mut self, len: usize)
    {
        let len = u32::try_from(len)
            .expect("Record does not fit the format");
        self.emit_u32(len);
    }

    fn emit_str(&mut self, v: &str)
    {
        self.emit_len(v.len());
        self.buf.extend_from_slice(v.as_bytes());
    }

    fn emit_register(&mut self, register: Register)
    {
        self.emit_u16(register.0);
    }

    fn emit_pool_id(&mut self, pool: PoolId)
    {
        match pool {
            PoolId::Unit(unit) => { self.emit_u8(0); self.emit_u32(unit.0); },
            PoolId::Shared     => { self.emit_u8(1); },
        }
    }

    fn emit_slot(&mut self, slot: SlotRef)
    {
        self.emit_pool_id(slot.pool);
        self.emit_u32(slot.segment);
        self.emit_u8(slot.category as u8);
        self.emit_u16(slot.index);
    }

    fn emit_constant(&mut self, constant: &Constant)
    {
        match constant {
            Constant::Int(value)    => self.emit_u32(*value as u32),
            Constant::Long(value)   => self.emit_u64(*value as u64),
            Constant::Float(value)  => self.emit_u32(value.to_bits()),
            Constant::Double(value) => self.emit_u64(value.to_bits()),
            Constant::String(value) => self.emit_str(value),
        }
    }

    fn emit_instruction(&mut self, instruction: &Instruction)
    {
        use Instruction as I;
        match instruction {
            I::LoadConstant{target, slot} => {
                self.emit_u8(0x01);
                self.emit_register(*target);
                self.emit_slot(*slot);
            },
            I::LoadShared{target, slot} => {
                self.emit_u8(0x02);
                self.emit_register(*target);
                self.emit_slot(*slot);
            },
            I::LoadUndef{target} => {
                self.emit_u8(0x03);
                self.emit_register(*target);
            },
            I::CopyRegister{target, source} => {
                self.emit_u8(0x04);
                self.emit_register(*target);
                self.emit_register(*source);
            },
            I::StoreCompletion{source} => {
                self.emit_u8(0x05);
                self.emit_register(*source);
            },
            I::LoadCompletion{target} => {
                self.emit_u8(0x06);
                self.emit_register(*target);
            },
            I::Operation{opcode, operands} => {
                self.emit_u8(0x07);
                self.emit_u8(*opcode);
                let count = u8::try_from(operands.len())
                    .expect("Too many operands");
                self.emit_u8(count);
                for operand in operands {
                    self.emit_register(*operand);
                }
            },
            I::Return{result} => {
                self.emit_u8(0x08);
                self.emit_register(*result);
            },
            I::Throw{exception} => {
                self.emit_u8(0x09);
                self.emit_register(*exception);
            },
        }
    }
}

impl TargetWriter for BinaryWriter
{
    fn new(unit_name: &str) -> Self
    {
        let mut this = Self{buf: Vec::new()};
        this.buf.extend_from_slice(Self::MAGIC);
        this.emit_u16(Self::VERSION);
        this.emit_str(unit_name);
        this
    }

    fn write_field(&mut self, field: &Field)
    {
        self.emit_u8(Self::TAG_FIELD);
        self.emit_u16(field.flags.bits());
        self.emit_str(&field.name);
        self.emit_str(&field.type_);
        match &field.signature {
            Some(signature) => { self.emit_u8(1); self.emit_str(signature); },
            None            => { self.emit_u8(0); },
        }
    }

    fn write_method(&mut self, method: &Method)
    {
        self.emit_u8(Self::TAG_METHOD);
        self.emit_u16(method.flags().bits());
        self.emit_str(method.name());
        self.emit_str(method.signature());
        let registers = method.max_register().map_or(0, |r| r.0 as u32 + 1);
        self.emit_u32(registers);
        self.emit_len(method.instructions().len());
        for instruction in method.instructions() {
            self.emit_instruction(instruction);
        }
    }

    fn write_pool(&mut self, pool: &ClosedPool)
    {
        self.emit_u8(Self::TAG_POOL);
        self.emit_pool_id(pool.id());
        self.emit_len(pool.segment_count());
        for segment in 0 .. pool.segment_count() {
            for category in Category::ALL {
                let constants = pool.all_constants(segment, category);
                self.emit_len(constants.len());
                for constant in constants {
                    self.emit_constant(constant);
                }
            }
        }
    }

    fn finish(mut self) -> Vec<u8>
    {
        self.emit_u8(Self::TAG_END);
        self.buf
    }
}
