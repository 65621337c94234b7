//! Type definitions.
//!
//! A [`TypeDef`] owns its nested types and members, so a module's type list is a forest rooted
//! at the namespace-level types. The qualified name of a nested type therefore depends on the
//! path that reaches it; see [`TypeDef::qualified_name`].

use crate::metadata::{
    customattributes::CustomAttribute,
    flags::{MemberAccessFlags, TypeAttributes},
    members::{EventDef, FieldDef, MethodDef, MethodImpl, PropertyDef},
    security::SecurityDeclaration,
    signatures::{qualified_name, TypeRef, TypeSignature},
};

/// A type definition.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    /// Namespace; empty for nested types
    pub namespace: String,
    /// Name in metadata spelling, including the generic arity suffix
    pub name: String,
    /// Raw [`TypeAttributes`]
    pub flags: u32,
    /// Names of the generic parameters
    pub generic_params: Vec<String>,
    /// Base type
    pub extends: Option<TypeSignature>,
    /// Implemented interfaces
    pub interfaces: Vec<TypeSignature>,
    /// Nested types
    pub nested_types: Vec<TypeDef>,
    /// Fields
    pub fields: Vec<FieldDef>,
    /// Methods
    pub methods: Vec<MethodDef>,
    /// Properties
    pub properties: Vec<PropertyDef>,
    /// Events
    pub events: Vec<EventDef>,
    /// Explicit method implementations
    pub method_impls: Vec<MethodImpl>,
    /// Custom attributes
    pub custom_attributes: Vec<CustomAttribute>,
    /// Declarative security
    pub security: Vec<SecurityDeclaration>,
}

impl TypeDef {
    /// Qualified name of this type when reached through `enclosing` (the qualified name of the
    /// enclosing type, for nested types).
    #[must_use]
    pub fn qualified_name(&self, enclosing: Option<&str>) -> String {
        match enclosing {
            Some(enclosing) => format!("{}+{}", enclosing, self.name),
            None => qualified_name(&self.namespace, &self.name),
        }
    }

    /// A reference to this type, defined in `assembly`, nested in `enclosing`
    #[must_use]
    pub fn type_ref(&self, assembly: &str, enclosing: Option<&TypeRef>) -> TypeRef {
        match enclosing {
            Some(enclosing) => enclosing.nested(self.name.clone()),
            None => TypeRef::new(assembly, self.namespace.clone(), self.name.clone()),
        }
    }

    /// Type is an interface
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.flags & TypeAttributes::INTERFACE != 0
    }

    /// Type is a C# `static class` (abstract and sealed)
    #[must_use]
    pub fn is_static(&self) -> bool {
        let static_class = TypeAttributes::ABSTRACT | TypeAttributes::SEALED;
        self.flags & static_class == static_class
    }

    /// Type derives from `System.ValueType` or `System.Enum`
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        match self.extends.as_ref().and_then(TypeSignature::type_ref) {
            Some(base) => {
                let name = base.full_name();
                name == "System.ValueType" || name == "System.Enum"
            }
            None => false,
        }
    }

    /// Type is a class: neither an interface nor a value type
    #[must_use]
    pub fn is_class(&self) -> bool {
        !self.is_interface() && !self.is_value_type()
    }

    /// Type carries the `Serializable` flag
    #[must_use]
    pub fn is_serializable(&self) -> bool {
        self.flags & TypeAttributes::SERIALIZABLE != 0
    }

    /// Type declares at least one instance constructor
    #[must_use]
    pub fn has_instance_constructor(&self) -> bool {
        self.methods.iter().any(MethodDef::is_constructor)
    }
}

/// Builder for [`TypeDef`].
///
/// Types start out as non-public classes deriving from `System.Object` in the global
/// namespace.
///
/// # Examples
///
/// ```rust
/// use dottrim::metadata::{MethodDefBuilder, TypeDefBuilder};
///
/// let widget = TypeDefBuilder::new("Widget")
///     .namespace("Contoso")
///     .public()
///     .method(MethodDefBuilder::new("Spin").public().build())
///     .build();
/// assert_eq!(widget.qualified_name(None), "Contoso.Widget");
/// ```
pub struct TypeDefBuilder {
    type_def: TypeDef,
}

impl TypeDefBuilder {
    /// Start building a type named `name`
    pub fn new(name: impl Into<String>) -> Self {
        TypeDefBuilder {
            type_def: TypeDef {
                namespace: String::new(),
                name: name.into(),
                flags: TypeAttributes::NOT_PUBLIC | TypeAttributes::BEFORE_FIELD_INIT,
                generic_params: Vec::new(),
                extends: Some(TypeSignature::Object),
                interfaces: Vec::new(),
                nested_types: Vec::new(),
                fields: Vec::new(),
                methods: Vec::new(),
                properties: Vec::new(),
                events: Vec::new(),
                method_impls: Vec::new(),
                custom_attributes: Vec::new(),
                security: Vec::new(),
            },
        }
    }

    /// Sets the type namespace.
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.type_def.namespace = namespace.into();
        self
    }

    /// Sets the raw type attributes, replacing any visibility and semantics set so far.
    #[must_use]
    pub fn flags(mut self, flags: u32) -> Self {
        self.type_def.flags = flags;
        self
    }

    /// Replaces the visibility bits.
    #[must_use]
    pub fn visibility(mut self, visibility: u32) -> Self {
        self.type_def.flags = (self.type_def.flags & !TypeAttributes::VISIBILITY_MASK)
            | (visibility & TypeAttributes::VISIBILITY_MASK);
        self
    }

    /// Convenience for [`TypeAttributes::PUBLIC`]
    #[must_use]
    pub fn public(self) -> Self {
        self.visibility(TypeAttributes::PUBLIC)
    }

    /// Convenience for [`TypeAttributes::NESTED_PUBLIC`]
    #[must_use]
    pub fn nested_public(self) -> Self {
        self.visibility(TypeAttributes::NESTED_PUBLIC)
    }

    /// Make this an interface: abstract, no base type.
    #[must_use]
    pub fn interface(mut self) -> Self {
        self.type_def.flags |= TypeAttributes::INTERFACE | TypeAttributes::ABSTRACT;
        self.type_def.flags &= !TypeAttributes::BEFORE_FIELD_INIT;
        self.type_def.extends = None;
        self
    }

    /// Make this a static class (abstract and sealed).
    #[must_use]
    pub fn static_class(mut self) -> Self {
        self.type_def.flags |= TypeAttributes::ABSTRACT | TypeAttributes::SEALED;
        self
    }

    /// Make this a sealed value type.
    #[must_use]
    pub fn value_type(mut self) -> Self {
        self.type_def.flags |= TypeAttributes::SEALED;
        self.type_def.extends = Some(TypeSignature::Class(TypeRef::new(
            "mscorlib",
            "System",
            "ValueType",
        )));
        self
    }

    /// Sets the `Serializable` flag.
    #[must_use]
    pub fn serializable(mut self) -> Self {
        self.type_def.flags |= TypeAttributes::SERIALIZABLE;
        self
    }

    /// Sets the base type.
    #[must_use]
    pub fn extends(mut self, base: TypeSignature) -> Self {
        self.type_def.extends = Some(base);
        self
    }

    /// Declares a generic parameter.
    #[must_use]
    pub fn generic_param(mut self, name: impl Into<String>) -> Self {
        self.type_def.generic_params.push(name.into());
        self
    }

    /// Adds an implemented interface.
    #[must_use]
    pub fn implements(mut self, interface: TypeSignature) -> Self {
        self.type_def.interfaces.push(interface);
        self
    }

    /// Adds a nested type.
    #[must_use]
    pub fn nested(mut self, nested: TypeDef) -> Self {
        self.type_def.nested_types.push(nested);
        self
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.type_def.fields.push(field);
        self
    }

    /// Adds a public field of the given type.
    #[must_use]
    pub fn public_field(self, name: impl Into<String>, field_type: TypeSignature) -> Self {
        let mut field = FieldDef::new(name, field_type);
        field.access = MemberAccessFlags::PUBLIC;
        self.field(field)
    }

    /// Adds a method.
    #[must_use]
    pub fn method(mut self, method: MethodDef) -> Self {
        self.type_def.methods.push(method);
        self
    }

    /// Adds a property.
    #[must_use]
    pub fn property(mut self, property: PropertyDef) -> Self {
        self.type_def.properties.push(property);
        self
    }

    /// Adds an event.
    #[must_use]
    pub fn event(mut self, event: EventDef) -> Self {
        self.type_def.events.push(event);
        self
    }

    /// Adds an explicit method implementation.
    #[must_use]
    pub fn method_impl(mut self, method_impl: MethodImpl) -> Self {
        self.type_def.method_impls.push(method_impl);
        self
    }

    /// Adds a custom attribute.
    #[must_use]
    pub fn attribute(mut self, attribute: CustomAttribute) -> Self {
        self.type_def.custom_attributes.push(attribute);
        self
    }

    /// Adds a security declaration and sets `HasSecurity`.
    #[must_use]
    pub fn security(mut self, declaration: SecurityDeclaration) -> Self {
        self.type_def.security.push(declaration);
        self.type_def.flags |= TypeAttributes::HAS_SECURITY;
        self
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> TypeDef {
        self.type_def
    }
}
