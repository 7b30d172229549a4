//! Allocation of methods across units.

use {
    crate::{
        flags::{AccessFlags, FlagsError, MemberKind},
        instruction::Register,
        limits::{Limits, LimitsError},
        method::MethodId,
        pool::{ClosedPool, Constant, EmitLoad, SharedPool, SlotRef},
        unit::{ClosedUnit, CodeUnit, UnitId},
        verify::VerifyError,
        writer::{BinaryWriter, TargetWriter},
    },
    std::sync::Arc,
};

/// All units produced for one compilation.
///
/// There is always exactly one main unit, which is the first unit.
/// Ordinary methods go to the active unit until it is full,
/// after which a new unit is opened and made active.
/// Constructors always go to the main unit.
pub struct CodeSession<W = BinaryWriter>
{
    name: Arc<str>,
    limits: Limits,
    // INVARIANT: Non-empty; the main unit is the first element.
    // INVARIANT: Each unit's id is its position.
    units: Vec<CodeUnit<W>>,
    // INVARIANT: Points at the last element of units.
    active: usize,
    shared: Option<SharedPool>,
}

/// Everything a session produced, in creation order.
#[derive(Debug)]
pub struct Artifact
{
    /// Every unit, starting with the main unit.
    pub units: Vec<ClosedUnit>,

    /// The shared pool, if any unit requested it.
    pub shared_pool: Option<ClosedPool>,
}

impl CodeSession
{
    /// Create a session with the default limits.
    pub fn new(name: &str) -> Self
    {
        Self::with_limits(name, Limits::default())
            .expect("Default limits are valid")
    }
}

impl<W> CodeSession<W>
    where W: TargetWriter
{
    /// Create a session with the given limits.
    ///
    /// The main unit is named after the session.
    pub fn with_limits(name: &str, limits: Limits) -> Result<Self, LimitsError>
    {
        limits.validate()?;
        let name: Arc<str> = name.into();
        let main = CodeUnit::new(UnitId::MAIN, name.clone(), limits);
        Ok(Self{name, limits, units: vec![main], active: 0, shared: None})
    }

    /// The limits this session was created with.
    pub fn limits(&self) -> Limits
    {
        self.limits
    }

    /// Every unit, in creation order.
    pub fn units(&self) -> &[CodeUnit<W>]
    {
        &self.units
    }

    #[allow(missing_docs)]
    pub fn unit(&self, id: UnitId) -> &CodeUnit<W>
    {
        &self.units[id.0 as usize]
    }

    #[allow(missing_docs)]
    pub fn unit_mut(&mut self, id: UnitId) -> &mut CodeUnit<W>
    {
        &mut self.units[id.0 as usize]
    }

    /// The main unit.
    pub fn main_unit(&mut self) -> &mut CodeUnit<W>
    {
        &mut self.units[0]
    }

    /// The unit that received the most recent ordinary method.
    pub fn active_unit(&self) -> &CodeUnit<W>
    {
        &self.units[self.active]
    }

    /// The unit that should receive the next ordinary method.
    ///
    /// If the active unit is full, a new unit is opened first.
    /// The new unit starts with an empty pool of its own.
    pub fn request_method_slot(&mut self) -> &mut CodeUnit<W>
    {
        if self.units[self.active].is_full() {
            self.roll_over();
        }
        &mut self.units[self.active]
    }

    /// Add an ordinary method to the unit with room for it.
    ///
    /// Rejected flags leave the session unchanged.
    pub fn add_method(&mut self, flags: AccessFlags, name: &str, signature: &str)
        -> Result<MethodId, FlagsError>
    {
        flags.validate(MemberKind::Method)?;
        self.request_method_slot().add_method(flags, name, signature)
    }

    /// Add a constructor to the main unit.
    ///
    /// Rollover never affects where constructors go.
    pub fn add_constructor(&mut self, flags: AccessFlags, signature: &str)
        -> Result<MethodId, FlagsError>
    {
        self.main_unit().add_constructor(flags, signature)
    }

    /// The pool shared by every unit, created on first use.
    pub fn shared_pool(&mut self) -> &mut SharedPool
    {
        let capacity = self.limits.pool_capacity;
        self.shared.get_or_insert_with(|| {
            log::debug!("Creating shared pool with capacity {}", capacity);
            SharedPool::new(capacity)
        })
    }

    /// Intern a constant in the shared pool
    /// and append a load of it to a method in any unit.
    pub fn load_shared(
        &mut self,
        method: MethodId,
        target: Register,
        constant: Constant,
    ) -> SlotRef
    {
        let slot = self.shared_pool().intern(constant);
        // shared_pool has created the pool if it did not exist yet.
        if let Some(shared) = &self.shared {
            let method = self.units[method.unit.0 as usize].method_mut(method);
            shared.emit_load(method, target, slot);
        }
        slot
    }

    /// Close every unit and the shared pool.
    ///
    /// On success, the units are returned in creation order.
    pub fn finish(self) -> Result<Artifact, VerifyError>
    {
        let units =
            self.units.into_iter()
            .map(CodeUnit::close)
            .collect::<Result<Vec<_>, _>>()?;
        let shared_pool = self.shared.map(SharedPool::close);
        Ok(Artifact{units, shared_pool})
    }

    fn roll_over(&mut self)
    {
        // Unit count is bounded by methods, which fit u32.
        let ordinal = self.units.len() as u32;
        let name: Arc<str> = format!("{}~{}", self.name, ordinal).into();
        log::debug!(
            "Unit `{}` is full at {} methods; opening unit `{}`",
            self.units[self.active].name(), self.limits.max_methods, name,
        );
        self.units.push(CodeUnit::new(UnitId(ordinal), name, self.limits));
        self.active = self.units.len() - 1;
    }
}

#[cfg(test)]
mod tests
{
    use {
        super::*,
        crate::{
            flags::AccessFlags as F,
            instruction::Instruction as I,
            pool::PoolId,
        },
        proptest::{collection::vec, prelude::*, proptest},
    };

    use Register as R;

    fn session(max_methods: u32) -> CodeSession
    {
        let _ = env_logger::builder().is_test(true).try_init();
        let limits = Limits{max_methods, pool_capacity: 4};
        CodeSession::with_limits("Script", limits).unwrap()
    }

    /// Add a method that loads a constant and returns it.
    fn add_returning(session: &mut CodeSession, name: &str) -> MethodId
    {
        let unit = session.request_method_slot();
        let id = unit.add_method(F::STATIC, name, "()V").unwrap();
        unit.load_constant(id, R(0), Constant::String(name.into()));
        unit.method_mut(id).build(I::Return{result: R(0)});
        id
    }

    #[test]
    fn main_unit()
    {
        let mut session = session(2);
        assert_eq!(session.units().len(), 1);
        assert_eq!(session.main_unit().name(), "Script");
        assert!(session.main_unit().is_main());
    }

    #[test]
    fn method_rollover()
    {
        let mut session = session(3);
        let ids: Vec<MethodId> =
            (0 .. 4).map(|i| add_returning(&mut session, &format!("m{i}")))
            .collect();

        for id in &ids[.. 3] {
            assert_eq!(id.unit, UnitId(0));
        }
        assert_eq!(ids[3].unit, UnitId(1));
        assert_eq!(session.units().len(), 2);
        assert_eq!(session.unit(UnitId(1)).name(), "Script~1");
        assert_eq!(session.active_unit().id(), UnitId(1));
    }

    #[test]
    fn new_unit_has_empty_pool()
    {
        let mut session = session(1);
        add_returning(&mut session, "a");
        let unit = session.request_method_slot();
        assert_eq!(unit.id(), UnitId(1));
        assert!(unit.pool().is_empty());
        assert_eq!(unit.pool().id(), PoolId::Unit(UnitId(1)));
    }

    #[test]
    fn request_without_adding_does_not_roll_over()
    {
        let mut session = session(1);
        session.request_method_slot();
        session.request_method_slot();
        assert_eq!(session.units().len(), 1);
    }

    #[test]
    fn unit_names()
    {
        let mut session = session(1);
        for i in 0 .. 4 {
            add_returning(&mut session, &format!("m{i}"));
        }
        let names: Vec<&str> = session.units().iter().map(|u| u.name()).collect();
        assert_eq!(names, ["Script", "Script~1", "Script~2", "Script~3"]);
    }

    #[test]
    fn constructor_placement()
    {
        let mut session = session(1);
        for i in 0 .. 3 {
            add_returning(&mut session, &format!("m{i}"));
        }
        let id = session.add_constructor(F::PUBLIC, "()V").unwrap();
        assert_eq!(id.unit, UnitId::MAIN);
        assert_eq!(session.units().len(), 3);
        assert_eq!(session.active_unit().id(), UnitId(2));
    }

    #[test]
    fn illegal_flags_do_not_roll_over()
    {
        let mut session = session(1);
        add_returning(&mut session, "a");
        let result = session.add_method(F::ENUM, "b", "()V");
        assert_eq!(
            result,
            Err(FlagsError::Illegal{kind: MemberKind::Method, flags: F::ENUM}),
        );
        assert_eq!(session.units().len(), 1);
        assert_eq!(session.active_unit().id(), UnitId::MAIN);

        let id = session.add_method(F::STATIC, "c", "()V").unwrap();
        assert_eq!(id.unit, UnitId(1));
        assert_eq!(session.units().len(), 2);
    }

    #[test]
    fn constructor_illegal_flags()
    {
        let mut session = session(1);
        let result = session.add_constructor(F::STATIC, "()V");
        assert_eq!(
            result,
            Err(FlagsError::Illegal{
                kind: MemberKind::Constructor,
                flags: F::STATIC,
            }),
        );
    }

    #[test]
    fn shared_pool_across_units()
    {
        let mut session = session(1);
        let a = session.add_method(F::STATIC, "a", "()V").unwrap();
        let b = session.add_method(F::STATIC, "b", "()V").unwrap();
        assert_ne!(a.unit, b.unit);

        let slot_a = session.load_shared(a, R(0), Constant::Double(2.5));
        let slot_b = session.load_shared(b, R(0), Constant::Double(2.5));
        assert_eq!(slot_a, slot_b);
        assert_eq!(slot_a.pool, PoolId::Shared);
        assert_eq!(session.shared_pool().len(), 1);

        assert_eq!(
            session.unit(b.unit).method(b).instructions(),
            &[I::LoadShared{target: R(0), slot: slot_a}],
        );
    }

    #[test]
    fn shared_pool_is_lazy()
    {
        let mut session = session(1);
        add_returning(&mut session, "a");
        let artifact = session.finish().unwrap();
        assert!(artifact.shared_pool.is_none());
    }

    #[test]
    fn finish()
    {
        let mut session = session(2);
        for i in 0 .. 5 {
            add_returning(&mut session, &format!("m{i}"));
        }
        session.shared_pool().intern_string("shared");

        let artifact = session.finish().unwrap();
        let ids: Vec<UnitId> = artifact.units.iter().map(|u| u.id).collect();
        assert_eq!(ids, [UnitId(0), UnitId(1), UnitId(2)]);
        let shared = artifact.shared_pool.unwrap();
        assert_eq!(shared.id(), PoolId::Shared);
    }

    #[test]
    fn finish_unverified()
    {
        let mut session = session(2);
        session.add_method(F::STATIC, "f", "()V").unwrap();
        let result = session.finish();
        assert_eq!(
            result.unwrap_err(),
            VerifyError::NoInstructions("f".into()),
        );
    }

    #[test]
    fn invalid_limits()
    {
        let limits = Limits{max_methods: 0, pool_capacity: 1};
        let result = CodeSession::<BinaryWriter>::with_limits("x", limits);
        assert!(matches!(result, Err(LimitsError::ZeroMethods)));
    }

    /// Build a session from a fixed recipe and serialize it.
    fn compile(methods: usize, constants: &[i32]) -> Vec<Vec<u8>>
    {
        let mut session = session(3);
        for i in 0 .. methods {
            let unit = session.request_method_slot();
            let id = unit.add_method(F::STATIC, &format!("m{i}"), "()V").unwrap();
            for &constant in constants {
                unit.load_constant(id, R(0), Constant::Int(constant));
            }
            unit.method_mut(id).build(I::Return{result: R(0)});
        }
        session.finish().unwrap()
            .units.into_iter().map(|u| u.bytes).collect()
    }

    proptest!
    {
        #[test]
        fn rollover_count(max_methods in 1 .. 8u32, count in 1 .. 40u32)
        {
            let mut session = session(max_methods);
            for i in 0 .. count {
                let id = session.add_method(F::STATIC, "f", "()V").unwrap();
                assert_eq!(id.unit, UnitId(i / max_methods));
            }
            let expected = (count + max_methods - 1) / max_methods;
            assert_eq!(session.units().len(), expected as usize);
            for unit in session.units() {
                assert!(unit.method_count() <= max_methods);
            }
        }

        #[test]
        fn byte_identical(
            methods in 0 .. 8usize,
            constants in vec(any::<i32>(), 0 .. 16),
        )
        {
            assert_eq!(compile(methods, &constants), compile(methods, &constants));
        }
    }
}
