use {
    crate::{instruction::{Instruction, Register}, method::Method},
    super::{ClosedPool, ConstantPool, EmitLoad, PoolId, SlotRef},
    std::ops::{Deref, DerefMut},
};

/// Constant pool shared by every unit of a session.
///
/// External strategy: the constants live outside any one unit,
/// so a value interned here is addressable identically
/// from the main unit and from every overflow unit.
#[derive(Debug)]
pub struct SharedPool(ConstantPool);

impl SharedPool
{
    /// Create an empty shared pool.
    pub fn new(capacity: u16) -> Self
    {
        Self(ConstantPool::new(PoolId::Shared, capacity))
    }

    /// Freeze the pool.
    pub fn close(self) -> ClosedPool
    {
        self.0.close()
    }
}

impl Deref for SharedPool
{
    type Target = ConstantPool;

    fn deref(&self) -> &Self::Target
    {
        &self.0
    }
}

impl DerefMut for SharedPool
{
    fn deref_mut(&mut self) -> &mut Self::Target
    {
        &mut self.0
    }
}

impl EmitLoad for SharedPool
{
    fn emit_load(&self, method: &mut Method, target: Register, slot: SlotRef)
    {
        assert_eq!(slot.pool, PoolId::Shared, "Slot belongs to a unit pool");
        method.build(Instruction::LoadShared{target, slot});
    }
}
