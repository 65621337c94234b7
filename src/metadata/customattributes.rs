//! Custom attributes attached to assemblies, types and members.
//!
//! Attributes are identified by the [`TypeRef`] of their attribute class. The trim engine only
//! ever inspects the attribute type; argument values are carried through unchanged.

use crate::metadata::signatures::{MethodSignature, TypeRef, TypeSignature};

/// A custom attribute instance.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomAttribute {
    /// The attribute class
    pub attribute_type: TypeRef,
    /// Signature of the attribute constructor that is invoked
    pub constructor: MethodSignature,
    /// Positional constructor arguments
    pub fixed_args: Vec<CustomAttributeArgument>,
    /// Named field and property arguments
    pub named_args: Vec<CustomAttributeNamedArgument>,
}

impl CustomAttribute {
    /// An attribute created through its parameterless constructor.
    #[must_use]
    pub fn new(attribute_type: TypeRef) -> Self {
        CustomAttribute {
            attribute_type,
            constructor: MethodSignature::instance(TypeSignature::Void, Vec::new()),
            fixed_args: Vec::new(),
            named_args: Vec::new(),
        }
    }

    /// Fully qualified name of the attribute class
    #[must_use]
    pub fn type_name(&self) -> String {
        self.attribute_type.full_name()
    }

    /// `true` if the attribute class has the given fully qualified name
    #[must_use]
    pub fn is(&self, full_name: &str) -> bool {
        self.type_name() == full_name
    }
}

/// Represents a single custom attribute argument value
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum CustomAttributeArgument {
    Void,
    Bool(bool),
    Char(char),
    I1(i8),
    U1(u8),
    I2(i16),
    U2(u16),
    I4(i32),
    U4(u32),
    I8(i64),
    U8(u64),
    R4(f32),
    R8(f64),
    String(String),
    /// A `System.Type` argument, by name
    Type(String),
    Array(Vec<CustomAttributeArgument>),
    /// Enum type name and underlying value
    Enum(String, Box<CustomAttributeArgument>),
}

/// Represents a named argument (field or property) in a custom attribute
#[derive(Debug, Clone, PartialEq)]
pub struct CustomAttributeNamedArgument {
    /// Whether this is a field (true) or property (false)
    pub is_field: bool,
    /// Name of the field or property
    pub name: String,
    /// Type of the argument
    pub arg_type: String,
    /// Value of the argument
    pub value: CustomAttributeArgument,
}

/// `true` if any attribute in `attributes` is of the given class
#[must_use]
pub fn has_attribute(attributes: &[CustomAttribute], attribute_type: &TypeRef) -> bool {
    attributes
        .iter()
        .any(|attribute| attribute.attribute_type.full_name() == attribute_type.full_name())
}
