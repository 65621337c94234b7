//! Attribute flags for types, methods and fields, plus the visibility narrowing lattice.
//!
//! # Key Types
//! - [`TypeAttributes`]: Raw type attribute constants
//! - [`FieldAttributes`]: Raw field attribute constants
//! - [`MemberAccessFlags`]: Accessibility of methods and fields
//! - [`MethodModifiers`]: Method attribute modifiers
//!
//! Narrowing never widens: applying [`MemberAccessFlags::narrowed`] or
//! [`narrow_type_visibility`] to an already internal value returns it unchanged.

use bitflags::bitflags;

/// Bitmask for `ACCESS` extraction from method and field attributes
pub const MEMBER_ACCESS_MASK: u32 = 0x0007;

#[allow(non_snake_case)]
/// All possible flags for `TypeAttributes`
pub mod TypeAttributes {
    /// Use this mask to retrieve visibility information. These 3 bits contain one of the following values:
    pub const VISIBILITY_MASK: u32 = 0x0000_0007;
    /// Class has no public scope
    pub const NOT_PUBLIC: u32 = 0x0000_0000;
    /// Class has public scope
    pub const PUBLIC: u32 = 0x0000_0001;
    /// Class is nested with public visibility
    pub const NESTED_PUBLIC: u32 = 0x0000_0002;
    /// Class is nested with private visibility
    pub const NESTED_PRIVATE: u32 = 0x0000_0003;
    /// Class is nested with family visibility
    pub const NESTED_FAMILY: u32 = 0x0000_0004;
    /// Class is nested with assembly visibility
    pub const NESTED_ASSEMBLY: u32 = 0x0000_0005;
    /// Class is nested with family and assembly visibility
    pub const NESTED_FAM_AND_ASSEM: u32 = 0x0000_0006;
    /// Class is nested with family or assembly visibility
    pub const NESTED_FAM_OR_ASSEM: u32 = 0x0000_0007;
    /// Use this mask to retrieve class semantics information.
    pub const CLASS_SEMANTICS_MASK: u32 = 0x0000_0020;
    /// Type is a class
    pub const CLASS: u32 = 0x0000_0000;
    /// Type is an interface
    pub const INTERFACE: u32 = 0x0000_0020;
    /// Class is abstract
    pub const ABSTRACT: u32 = 0x0000_0080;
    /// Class cannot be extended
    pub const SEALED: u32 = 0x0000_0100;
    /// Class name is special
    pub const SPECIAL_NAME: u32 = 0x0000_0400;
    /// Class/Interface is imported
    pub const IMPORT: u32 = 0x0000_1000;
    /// Class is serializable
    pub const SERIALIZABLE: u32 = 0x0000_2000;
    /// Initialize the class before first static field access
    pub const BEFORE_FIELD_INIT: u32 = 0x0010_0000;
    /// CLI provides 'special' behavior, depending upon the name of the type
    pub const RTSPECIAL_NAME: u32 = 0x0000_0800;
    /// Type has security associate with it
    pub const HAS_SECURITY: u32 = 0x0004_0000;
}

#[allow(non_snake_case)]
/// All possible flags for `FieldAttributes`, excluding the access bits
/// (see [`MemberAccessFlags`])
pub mod FieldAttributes {
    /// Defined on type, else per instance
    pub const STATIC: u32 = 0x0010;
    /// Field can only be initialized, not written to after init
    pub const INIT_ONLY: u32 = 0x0020;
    /// Value is compile time constant
    pub const LITERAL: u32 = 0x0040;
    /// Reserved (to indicate this field should not be serialized when type is remoted)
    pub const NOT_SERIALIZED: u32 = 0x0080;
    /// Field is special
    pub const SPECIAL_NAME: u32 = 0x0200;
    /// CLI provides 'special' behavior, depending upon the name of the field
    pub const RTSPECIAL_NAME: u32 = 0x0400;
    /// Field has default
    pub const HAS_DEFAULT: u32 = 0x8000;
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Member access flags, shared by methods and fields
    pub struct MemberAccessFlags: u32 {
        /// Member not referenceable
        const COMPILER_CONTROLLED = 0x0000;
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessible by sub-types only in this Assembly
        const FAM_AND_ASSEM = 0x0002;
        /// Accessibly by anyone in the Assembly
        const ASSEM = 0x0003;
        /// Accessible only by type and sub-types
        const FAMILY = 0x0004;
        /// Accessibly by sub-types anywhere, plus anyone in assembly
        const FAM_OR_ASSEM = 0x0005;
        /// Accessibly by anyone who has visibility to this scope
        const PUBLIC = 0x0006;
    }
}

impl MemberAccessFlags {
    /// Extract access flags from raw method or field attributes
    #[must_use]
    pub fn from_member_flags(flags: u32) -> Self {
        let access = flags & MEMBER_ACCESS_MASK;
        Self::from_bits_truncate(access)
    }

    /// `true` if the member is only reachable from inside its assembly
    #[must_use]
    pub fn is_internal(self) -> bool {
        self == Self::ASSEM || self == Self::FAM_AND_ASSEM
    }

    /// Apply the narrowing lattice: `Public` and `FamOrAssem` become `Assem`, `Family` becomes
    /// `FamAndAssem`, everything else is unchanged.
    #[must_use]
    pub fn narrowed(self) -> Self {
        if self == Self::PUBLIC || self == Self::FAM_OR_ASSEM {
            Self::ASSEM
        } else if self == Self::FAMILY {
            Self::FAM_AND_ASSEM
        } else {
            self
        }
    }

    /// Position in the accessibility partial order, for comparing how far a member reaches.
    ///
    /// `Private` < `FamAndAssem` < `Assem` = `Family` < `FamOrAssem` < `Public`; the two
    /// middle values are incomparable and share a rank.
    #[must_use]
    pub fn rank(self) -> u8 {
        if self == Self::PUBLIC {
            4
        } else if self == Self::FAM_OR_ASSEM {
            3
        } else if self == Self::ASSEM || self == Self::FAMILY {
            2
        } else if self == Self::FAM_AND_ASSEM {
            1
        } else {
            0
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Method modifiers and properties
    pub struct MethodModifiers: u32 {
        /// Defined on type, else per instance
        const STATIC = 0x0010;
        /// Method cannot be overridden
        const FINAL = 0x0020;
        /// Method is virtual
        const VIRTUAL = 0x0040;
        /// Method hides by name+sig, else just by name
        const HIDE_BY_SIG = 0x0080;
        /// Method always gets a new slot in the vtable
        const NEW_SLOT = 0x0100;
        /// Method does not provide an implementation
        const ABSTRACT = 0x0400;
        /// Method is special
        const SPECIAL_NAME = 0x0800;
        /// Implementation is forwarded through `PInvoke`
        const PINVOKE_IMPL = 0x2000;
        /// CLI provides 'special' behavior, depending upon the name of the method
        const RTSPECIAL_NAME = 0x1000;
        /// Method has security associate with it
        const HAS_SECURITY = 0x4000;
    }
}

impl MethodModifiers {
    /// Extract method modifiers from raw method attributes
    #[must_use]
    pub fn from_method_flags(flags: u32) -> Self {
        Self::from_bits_truncate(flags & !MEMBER_ACCESS_MASK)
    }
}

/// `true` if the visibility bits of `flags` describe a nested type.
#[must_use]
pub fn is_nested_visibility(flags: u32) -> bool {
    (flags & TypeAttributes::VISIBILITY_MASK) >= TypeAttributes::NESTED_PUBLIC
}

/// Narrow the visibility bits of type attributes `flags`.
///
/// Namespace-level types lose their public scope. Nested types follow the member lattice:
/// `NestedPublic` and `NestedFamOrAssem` become `NestedAssembly`, `NestedFamily` becomes
/// `NestedFamAndAssem`. All other bits are preserved.
#[must_use]
pub fn narrow_type_visibility(flags: u32) -> u32 {
    let visibility = flags & TypeAttributes::VISIBILITY_MASK;
    let narrowed = match visibility {
        TypeAttributes::PUBLIC => TypeAttributes::NOT_PUBLIC,
        TypeAttributes::NESTED_PUBLIC | TypeAttributes::NESTED_FAM_OR_ASSEM => {
            TypeAttributes::NESTED_ASSEMBLY
        }
        TypeAttributes::NESTED_FAMILY => TypeAttributes::NESTED_FAM_AND_ASSEM,
        other => other,
    };

    (flags & !TypeAttributes::VISIBILITY_MASK) | narrowed
}

/// Position of the visibility bits of `flags` in the accessibility partial order, see
/// [`MemberAccessFlags::rank`].
#[must_use]
pub fn type_visibility_rank(flags: u32) -> u8 {
    match flags & TypeAttributes::VISIBILITY_MASK {
        TypeAttributes::PUBLIC | TypeAttributes::NESTED_PUBLIC => 4,
        TypeAttributes::NESTED_FAM_OR_ASSEM => 3,
        TypeAttributes::NOT_PUBLIC | TypeAttributes::NESTED_ASSEMBLY | TypeAttributes::NESTED_FAMILY => 2,
        TypeAttributes::NESTED_FAM_AND_ASSEM => 1,
        _ => 0,
    }
}
