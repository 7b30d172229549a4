//! Modifier flags on methods, constructors, and fields.
//!
//! The bit values follow the class file format.
//! Some bits mean different things depending on the member kind;
//! for example `VOLATILE` on a field is `BRIDGE` on a method.

use {bitflags::bitflags, std::fmt, thiserror::Error};

bitflags!
{
    /// Modifier bits of a member.
    #[derive(Default)]
    pub struct AccessFlags: u16
    {
        #[allow(missing_docs)] const PUBLIC       = 0x0001;
        #[allow(missing_docs)] const PRIVATE      = 0x0002;
        #[allow(missing_docs)] const PROTECTED    = 0x0004;
        #[allow(missing_docs)] const STATIC       = 0x0008;
        #[allow(missing_docs)] const FINAL        = 0x0010;
        #[allow(missing_docs)] const SYNCHRONIZED = 0x0020;
        #[allow(missing_docs)] const VOLATILE     = 0x0040;
        #[allow(missing_docs)] const BRIDGE       = 0x0040;
        #[allow(missing_docs)] const TRANSIENT    = 0x0080;
        #[allow(missing_docs)] const VARARGS      = 0x0080;
        #[allow(missing_docs)] const NATIVE       = 0x0100;
        #[allow(missing_docs)] const ABSTRACT     = 0x0400;
        #[allow(missing_docs)] const STRICT       = 0x0800;
        #[allow(missing_docs)] const SYNTHETIC    = 0x1000;
        #[allow(missing_docs)] const ENUM         = 0x4000;
    }
}

/// The kind of member that flags are attached to.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MemberKind
{
    Method,
    Constructor,
    Field,
}

/// Returned when flags are not legal for a member.
#[allow(missing_docs)]
#[derive(Debug, Eq, Error, PartialEq)]
pub enum FlagsError
{
    /// Some bits are never legal on this kind of member.
    #[error("Flags {flags:?} are not allowed on a {kind}")]
    Illegal{kind: MemberKind, flags: AccessFlags},

    /// More than one of public, private, and protected is set.
    #[error("Conflicting access modifiers {0:?}")]
    ConflictingAccess(AccessFlags),

    /// The bits are individually legal but not together.
    #[error("Flags {flags:?} cannot be combined on a {kind}")]
    Conflicting{kind: MemberKind, flags: AccessFlags},
}

impl MemberKind
{
    /// Every bit that may appear on this kind of member.
    pub fn legal(self) -> AccessFlags
    {
        type F = AccessFlags;
        let access = F::PUBLIC | F::PRIVATE | F::PROTECTED;
        match self {
            Self::Method =>
                access | F::STATIC | F::FINAL | F::SYNCHRONIZED | F::BRIDGE
                | F::VARARGS | F::NATIVE | F::ABSTRACT | F::STRICT
                | F::SYNTHETIC,
            Self::Constructor =>
                access | F::VARARGS | F::STRICT | F::SYNTHETIC,
            Self::Field =>
                access | F::STATIC | F::FINAL | F::VOLATILE | F::TRANSIENT
                | F::SYNTHETIC | F::ENUM,
        }
    }
}

impl AccessFlags
{
    /// Check that the flags may be attached to the given kind of member.
    ///
    /// Only the first problem found is reported.
    pub fn validate(self, kind: MemberKind) -> Result<(), FlagsError>
    {
        let illegal = self - kind.legal();
        if !illegal.is_empty() {
            return Err(FlagsError::Illegal{kind, flags: illegal});
        }

        let access = self & (Self::PUBLIC | Self::PRIVATE | Self::PROTECTED);
        if access.bits().count_ones() > 1 {
            return Err(FlagsError::ConflictingAccess(access));
        }

        let conflicting = match kind {
            MemberKind::Method if self.contains(Self::ABSTRACT) =>
                self & (Self::PRIVATE | Self::STATIC | Self::FINAL
                        | Self::SYNCHRONIZED | Self::NATIVE | Self::STRICT),
            MemberKind::Field if self.contains(Self::FINAL | Self::VOLATILE) =>
                Self::FINAL | Self::VOLATILE,
            _ =>
                Self::empty(),
        };
        if !conflicting.is_empty() {
            let flags = conflicting | (self & Self::ABSTRACT);
            return Err(FlagsError::Conflicting{kind, flags});
        }

        Ok(())
    }

    /// Whether a method with these flags has a body.
    pub fn has_body(self) -> bool
    {
        !self.intersects(Self::ABSTRACT | Self::NATIVE)
    }
}

impl fmt::Display for MemberKind
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        match self {
            Self::Method      => write!(f, "method"),
            Self::Constructor => write!(f, "constructor"),
            Self::Field       => write!(f, "field"),
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    use AccessFlags as F;
    use FlagsError as E;
    use MemberKind as K;

    #[test]
    fn legal_combinations()
    {
        assert_eq!(F::PUBLIC.validate(K::Method), Ok(()));
        assert_eq!((F::PRIVATE | F::STATIC | F::FINAL).validate(K::Method), Ok(()));
        assert_eq!((F::PUBLIC | F::ABSTRACT).validate(K::Method), Ok(()));
        assert_eq!((F::PUBLIC | F::VARARGS).validate(K::Constructor), Ok(()));
        assert_eq!((F::PRIVATE | F::STATIC | F::FINAL).validate(K::Field), Ok(()));
        assert_eq!(F::empty().validate(K::Field), Ok(()));
    }

    #[test]
    fn illegal_bits()
    {
        assert_eq!(
            (F::PUBLIC | F::STATIC).validate(K::Constructor),
            Err(E::Illegal{kind: K::Constructor, flags: F::STATIC}),
        );
        assert_eq!(
            F::ABSTRACT.validate(K::Field),
            Err(E::Illegal{kind: K::Field, flags: F::ABSTRACT}),
        );
        assert_eq!(
            F::ENUM.validate(K::Method),
            Err(E::Illegal{kind: K::Method, flags: F::ENUM}),
        );
    }

    #[test]
    fn conflicting_access()
    {
        assert_eq!(
            (F::PUBLIC | F::PRIVATE).validate(K::Method),
            Err(E::ConflictingAccess(F::PUBLIC | F::PRIVATE)),
        );
        assert_eq!(
            (F::PROTECTED | F::PRIVATE).validate(K::Field),
            Err(E::ConflictingAccess(F::PROTECTED | F::PRIVATE)),
        );
    }

    #[test]
    fn conflicting_modifiers()
    {
        assert_eq!(
            (F::ABSTRACT | F::STATIC).validate(K::Method),
            Err(E::Conflicting{kind: K::Method, flags: F::ABSTRACT | F::STATIC}),
        );
        assert_eq!(
            (F::FINAL | F::VOLATILE).validate(K::Field),
            Err(E::Conflicting{kind: K::Field, flags: F::FINAL | F::VOLATILE}),
        );
        // The same bit means bridge on a method, which final may accompany.
        assert_eq!((F::FINAL | F::BRIDGE).validate(K::Method), Ok(()));
    }

    #[test]
    fn has_body()
    {
        assert!(F::PUBLIC.has_body());
        assert!(!(F::PUBLIC | F::ABSTRACT).has_body());
        assert!(!F::NATIVE.has_body());
    }

    #[test]
    fn error_message()
    {
        let error = E::Illegal{kind: K::Constructor, flags: F::STATIC};
        assert_eq!(
            error.to_string(),
            "Flags STATIC are not allowed on a constructor",
        );
    }
}
