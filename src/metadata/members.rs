//! Members of a type definition: methods, fields, properties, events and explicit method
//! implementations.
//!
//! Properties and events carry no accessibility of their own; their accessor methods do.

use crate::metadata::{
    customattributes::CustomAttribute,
    flags::{FieldAttributes, MemberAccessFlags, MethodModifiers},
    security::SecurityDeclaration,
    signatures::{MemberRef, MethodSignature, TypeSignature},
};

/// Name of instance constructors
pub const CTOR: &str = ".ctor";
/// Name of type initializers
pub const CCTOR: &str = ".cctor";
/// The `ret` opcode
pub const OPCODE_RET: u8 = 0x2A;

/// An IL method body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodBody {
    /// Maximum evaluation stack depth
    pub max_stack: u16,
    /// Zero-initialize locals
    pub init_locals: bool,
    /// Raw IL
    pub code: Vec<u8>,
}

impl MethodBody {
    /// A body consisting of a single `ret`
    #[must_use]
    pub fn ret() -> Self {
        MethodBody {
            max_stack: 8,
            init_locals: false,
            code: vec![OPCODE_RET],
        }
    }
}

/// A method definition.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDef {
    /// Method name
    pub name: String,
    /// Accessibility
    pub access: MemberAccessFlags,
    /// Modifiers (static, virtual, special name, ...)
    pub modifiers: MethodModifiers,
    /// Signature
    pub signature: MethodSignature,
    /// Parameter names, parallel to `signature.params`
    pub param_names: Vec<String>,
    /// IL body; `None` for abstract, runtime and P/Invoke methods
    pub body: Option<MethodBody>,
    /// Custom attributes
    pub custom_attributes: Vec<CustomAttribute>,
    /// Declarative security
    pub security: Vec<SecurityDeclaration>,
}

impl MethodDef {
    /// Instance constructor (`.ctor`, not static)
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name == CTOR && !self.modifiers.contains(MethodModifiers::STATIC)
    }

    /// Virtual method, eligible to implement interface methods
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.modifiers.contains(MethodModifiers::VIRTUAL)
    }
}

/// A field definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Accessibility
    pub access: MemberAccessFlags,
    /// Remaining [`FieldAttributes`] bits
    pub flags: u32,
    /// Field type
    pub field_type: TypeSignature,
    /// Custom attributes
    pub custom_attributes: Vec<CustomAttribute>,
}

impl FieldDef {
    /// A private instance field
    pub fn new(name: impl Into<String>, field_type: TypeSignature) -> Self {
        FieldDef {
            name: name.into(),
            access: MemberAccessFlags::PRIVATE,
            flags: 0,
            field_type,
            custom_attributes: Vec::new(),
        }
    }

    /// Field is marked `NotSerialized`
    #[must_use]
    pub fn is_not_serialized(&self) -> bool {
        self.flags & FieldAttributes::NOT_SERIALIZED != 0
    }
}

/// A property definition.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDef {
    /// Property name
    pub name: String,
    /// Property type
    pub property_type: TypeSignature,
    /// Name of the getter method
    pub getter: Option<String>,
    /// Name of the setter method
    pub setter: Option<String>,
    /// Custom attributes
    pub custom_attributes: Vec<CustomAttribute>,
}

impl PropertyDef {
    /// A property without accessors
    pub fn new(name: impl Into<String>, property_type: TypeSignature) -> Self {
        PropertyDef {
            name: name.into(),
            property_type,
            getter: None,
            setter: None,
            custom_attributes: Vec::new(),
        }
    }
}

/// An event definition.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDef {
    /// Event name
    pub name: String,
    /// Delegate type of the event
    pub event_type: TypeSignature,
    /// Name of the add accessor
    pub add_method: Option<String>,
    /// Name of the remove accessor
    pub remove_method: Option<String>,
    /// Custom attributes
    pub custom_attributes: Vec<CustomAttribute>,
}

impl EventDef {
    /// An event without accessors
    pub fn new(name: impl Into<String>, event_type: TypeSignature) -> Self {
        EventDef {
            name: name.into(),
            event_type,
            add_method: None,
            remove_method: None,
            custom_attributes: Vec::new(),
        }
    }
}

/// An explicit method implementation (`MethodImpl` row): `implementing` provides the body for
/// `implemented`, typically an interface method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodImpl {
    /// The method providing the implementation, declared on the owning type
    pub implementing: MemberRef,
    /// The method being implemented or overridden
    pub implemented: MemberRef,
}

/// A borrowed view of anything that can be looked up as a member of a type.
#[derive(Debug, Clone, Copy)]
pub enum TypeMember<'a> {
    /// A field definition
    Field(&'a FieldDef),
    /// A method definition
    Method(&'a MethodDef),
    /// A property definition
    Property(&'a PropertyDef),
    /// An event definition
    Event(&'a EventDef),
    /// A method or field reference, as found in method implementations
    Reference(&'a MemberRef),
}

impl TypeMember<'_> {
    /// The member's simple name
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            TypeMember::Field(field) => &field.name,
            TypeMember::Method(method) => &method.name,
            TypeMember::Property(property) => &property.name,
            TypeMember::Event(event) => &event.name,
            TypeMember::Reference(reference) => &reference.name,
        }
    }
}

/// Builder for [`MethodDef`].
///
/// Methods start out as private, non-virtual instance methods returning `void`, with a `ret`
/// body.
///
/// # Examples
///
/// ```rust
/// use dottrim::metadata::{MethodDefBuilder, TypeSignature};
///
/// let method = MethodDefBuilder::new("Add")
///     .public()
///     .returns(TypeSignature::I4)
///     .param("a", TypeSignature::I4)
///     .param("b", TypeSignature::I4)
///     .build();
/// assert_eq!(method.signature.params.len(), 2);
/// ```
pub struct MethodDefBuilder {
    method: MethodDef,
}

impl MethodDefBuilder {
    /// Start building a method named `name`
    pub fn new(name: impl Into<String>) -> Self {
        MethodDefBuilder {
            method: MethodDef {
                name: name.into(),
                access: MemberAccessFlags::PRIVATE,
                modifiers: MethodModifiers::HIDE_BY_SIG,
                signature: MethodSignature::instance(TypeSignature::Void, Vec::new()),
                param_names: Vec::new(),
                body: Some(MethodBody::ret()),
                custom_attributes: Vec::new(),
                security: Vec::new(),
            },
        }
    }

    /// Start building an instance constructor
    #[must_use]
    pub fn constructor() -> Self {
        Self::new(CTOR).modifiers(MethodModifiers::SPECIAL_NAME | MethodModifiers::RTSPECIAL_NAME)
    }

    /// Sets the accessibility.
    #[must_use]
    pub fn access(mut self, access: MemberAccessFlags) -> Self {
        self.method.access = access;
        self
    }

    /// Convenience for [`MemberAccessFlags::PUBLIC`]
    #[must_use]
    pub fn public(self) -> Self {
        self.access(MemberAccessFlags::PUBLIC)
    }

    /// Adds modifiers.
    #[must_use]
    pub fn modifiers(mut self, modifiers: MethodModifiers) -> Self {
        self.method.modifiers |= modifiers;
        self
    }

    /// Make this a static method (no `this`).
    #[must_use]
    pub fn static_method(mut self) -> Self {
        self.method.modifiers |= MethodModifiers::STATIC;
        self.method.signature.has_this = false;
        self
    }

    /// Make this a virtual method.
    #[must_use]
    pub fn virtual_method(self) -> Self {
        self.modifiers(MethodModifiers::VIRTUAL | MethodModifiers::NEW_SLOT)
    }

    /// Make this an abstract virtual method without a body, as declared on interfaces.
    #[must_use]
    pub fn abstract_method(mut self) -> Self {
        self.method.modifiers |= MethodModifiers::VIRTUAL
            | MethodModifiers::NEW_SLOT
            | MethodModifiers::ABSTRACT;
        self.method.body = None;
        self
    }

    /// Sets the return type.
    #[must_use]
    pub fn returns(mut self, return_type: TypeSignature) -> Self {
        self.method.signature.return_type = return_type;
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, param_type: TypeSignature) -> Self {
        self.method.signature.params.push(param_type);
        self.method.param_names.push(name.into());
        self
    }

    /// Sets the number of generic parameters.
    #[must_use]
    pub fn generic_params(mut self, count: u32) -> Self {
        self.method.signature.generic_param_count = count;
        self
    }

    /// Adds a custom attribute.
    #[must_use]
    pub fn attribute(mut self, attribute: CustomAttribute) -> Self {
        self.method.custom_attributes.push(attribute);
        self
    }

    /// Adds a security declaration and sets `HasSecurity`.
    #[must_use]
    pub fn security(mut self, declaration: SecurityDeclaration) -> Self {
        self.method.security.push(declaration);
        self.method.modifiers |= MethodModifiers::HAS_SECURITY;
        self
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> MethodDef {
        self.method
    }
}
