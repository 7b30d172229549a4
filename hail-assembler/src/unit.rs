//! Physical containers of methods, fields, and constants.

use {
    crate::{
        flags::{AccessFlags, FlagsError, MemberKind},
        instruction::Register,
        limits::Limits,
        method::{Field, Method, MethodId},
        pool::{Constant, ConstantPool, EmitLoad, PoolId, SlotRef},
        verify::{VerifyError, verify},
        writer::{BinaryWriter, TargetWriter},
    },
    std::sync::Arc,
};

/// Identifies a unit within a session.
///
/// Units are numbered in creation order; the main unit is number zero.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct UnitId(pub u32);

impl UnitId
{
    /// The main unit of every session.
    pub const MAIN: Self = Self(0);
}

/// One physical container of emitted code.
///
/// A unit owns a constant pool local to it
/// and counts the ordinary methods added to it.
/// Closing the unit consumes it, so a unit cannot be
/// closed twice or mutated after it was closed.
pub struct CodeUnit<W = BinaryWriter>
{
    id: UnitId,
    name: Arc<str>,
    limits: Limits,
    pool: ConstantPool,
    methods: Vec<Method>,
    // INVARIANT: Never exceeds limits.max_methods.
    method_count: u32,
    fields: Vec<Field>,
    writer: W,
}

/// Serialized unit.
#[derive(Debug)]
pub struct ClosedUnit
{
    /// The unit this was closed from.
    pub id: UnitId,

    /// Name of the unit.
    pub name: Arc<str>,

    /// Bytes produced by the target writer.
    pub bytes: Vec<u8>,
}

impl<W> CodeUnit<W>
    where W: TargetWriter
{
    pub (crate) fn new(id: UnitId, name: Arc<str>, limits: Limits) -> Self
    {
        let pool = ConstantPool::new(PoolId::Unit(id), limits.pool_capacity);
        let writer = W::new(&name);
        Self{
            id, name, limits, pool,
            methods: Vec::new(),
            method_count: 0,
            fields: Vec::new(),
            writer,
        }
    }

    #[allow(missing_docs)]
    pub fn id(&self) -> UnitId
    {
        self.id
    }

    #[allow(missing_docs)]
    pub fn name(&self) -> &str
    {
        &self.name
    }

    /// Whether this is the main unit of its session.
    pub fn is_main(&self) -> bool
    {
        self.id == UnitId::MAIN
    }

    /// The number of ordinary methods, excluding constructors.
    pub fn method_count(&self) -> u32
    {
        self.method_count
    }

    /// Whether another ordinary method would exceed the method limit.
    pub fn is_full(&self) -> bool
    {
        self.method_count >= self.limits.max_methods
    }

    /// The pool local to this unit.
    pub fn pool(&self) -> &ConstantPool
    {
        &self.pool
    }

    /// The pool local to this unit.
    pub fn pool_mut(&mut self) -> &mut ConstantPool
    {
        &mut self.pool
    }

    /// Methods and constructors, in the order they were added.
    pub fn methods(&self) -> &[Method]
    {
        &self.methods
    }

    /// Fields, in the order they were added.
    pub fn fields(&self) -> &[Field]
    {
        &self.fields
    }

    /// Add an ordinary method.
    ///
    /// # Panics
    ///
    /// If the unit is full.
    /// Use [`CodeSession::request_method_slot`] to find a unit with room.
    ///
    /// [`CodeSession::request_method_slot`]:
    ///     `crate::CodeSession::request_method_slot`
    pub fn add_method(&mut self, flags: AccessFlags, name: &str, signature: &str)
        -> Result<MethodId, FlagsError>
    {
        flags.validate(MemberKind::Method)?;
        assert!(!self.is_full(), "Unit `{}` has no room for methods", self.name);
        self.method_count += 1;
        Ok(self.push_method(MemberKind::Method, flags, name, signature))
    }

    /// Add a constructor.
    ///
    /// Constructors do not count towards the method limit.
    ///
    /// # Panics
    ///
    /// If this is not the main unit.
    pub fn add_constructor(&mut self, flags: AccessFlags, signature: &str)
        -> Result<MethodId, FlagsError>
    {
        assert!(self.is_main(), "Constructors belong in the main unit");
        flags.validate(MemberKind::Constructor)?;
        let name = Method::CONSTRUCTOR_NAME;
        Ok(self.push_method(MemberKind::Constructor, flags, name, signature))
    }

    /// Add a field and write it out.
    pub fn add_field(
        &mut self,
        flags: AccessFlags,
        name: &str,
        type_: &str,
        signature: Option<&str>,
    ) -> Result<(), FlagsError>
    {
        flags.validate(MemberKind::Field)?;
        let field = Field{
            flags,
            name: name.into(),
            type_: type_.into(),
            signature: signature.map(Arc::from),
        };
        self.writer.write_field(&field);
        self.fields.push(field);
        Ok(())
    }

    /// The method a handle refers to.
    ///
    /// # Panics
    ///
    /// If the handle was created by another unit.
    pub fn method(&self, id: MethodId) -> &Method
    {
        assert_eq!(id.unit, self.id, "Method belongs to another unit");
        &self.methods[id.index as usize]
    }

    /// The method a handle refers to.
    ///
    /// # Panics
    ///
    /// If the handle was created by another unit.
    pub fn method_mut(&mut self, id: MethodId) -> &mut Method
    {
        assert_eq!(id.unit, self.id, "Method belongs to another unit");
        &mut self.methods[id.index as usize]
    }

    /// Intern a constant in the local pool
    /// and append a load of it to a method.
    pub fn load_constant(
        &mut self,
        method: MethodId,
        target: Register,
        constant: Constant,
    ) -> SlotRef
    {
        let slot = self.pool.intern(constant);
        assert_eq!(method.unit, self.id, "Method belongs to another unit");
        let method = &mut self.methods[method.index as usize];
        self.pool.emit_load(method, target, slot);
        slot
    }

    /// Verify the methods, close the pool, and serialize the unit.
    pub fn close(mut self) -> Result<ClosedUnit, VerifyError>
    {
        for method in &self.methods {
            verify(method)?;
        }

        for method in &self.methods {
            self.writer.write_method(method);
        }

        let pool = self.pool.close();
        self.writer.write_pool(&pool);

        log::debug!(
            "Closed unit `{}` with {} methods, {} fields, {} pool segments",
            self.name, self.methods.len(), self.fields.len(),
            pool.segment_count(),
        );

        let bytes = self.writer.finish();
        Ok(ClosedUnit{id: self.id, name: self.name, bytes})
    }

    fn push_method(
        &mut self,
        kind: MemberKind,
        flags: AccessFlags,
        name: &str,
        signature: &str,
    ) -> MethodId
    {
        // The number of methods is bounded by the method limit
        // plus the number of constructors, which both fit u32.
        let index = self.methods.len() as u32;
        let id = MethodId{unit: self.id, index};
        let method = Method::new(id, kind, flags, name.into(), signature.into());
        self.methods.push(method);
        id
    }
}
