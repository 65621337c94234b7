//! Type references and signatures.
//!
//! Types are referenced by name rather than by token: a [`TypeRef`] carries the simple name of
//! the assembly that defines the type, its namespace and name, and the enclosing type for nested
//! types. Names use the metadata spelling, including the backtick arity of generic types
//! (``List`1``).
//!
//! # Key Types
//! - [`TypeRef`]: A named reference to a type definition
//! - [`TypeSignature`]: A type as it appears in signatures
//! - [`MethodSignature`]: Calling convention, parameters and return type of a method
//! - [`MemberRef`] / [`MemberRefSignature`]: A reference to a method or field on some type

use std::fmt;

/// A reference to a type definition by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    /// Simple name of the assembly defining the type
    pub assembly: String,
    /// Namespace; empty for nested types and for types in the global namespace
    pub namespace: String,
    /// Type name in metadata spelling
    pub name: String,
    /// The enclosing type, for nested types
    pub enclosing: Option<Box<TypeRef>>,
}

impl TypeRef {
    /// Reference a namespace-level type
    pub fn new(
        assembly: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        TypeRef {
            assembly: assembly.into(),
            namespace: namespace.into(),
            name: name.into(),
            enclosing: None,
        }
    }

    /// Reference a type nested inside `self`
    #[must_use]
    pub fn nested(&self, name: impl Into<String>) -> Self {
        TypeRef {
            assembly: self.assembly.clone(),
            namespace: String::new(),
            name: name.into(),
            enclosing: Some(Box::new(self.clone())),
        }
    }

    /// Fully qualified name, with `+` separating nested types from their enclosing type.
    ///
    /// ```rust
    /// use dottrim::metadata::TypeRef;
    ///
    /// let outer = TypeRef::new("mscorlib", "System.Collections.Generic", "Dictionary`2");
    /// assert_eq!(outer.nested("Enumerator").full_name(), "System.Collections.Generic.Dictionary`2+Enumerator");
    /// ```
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.enclosing {
            Some(enclosing) => format!("{}+{}", enclosing.full_name(), self.name),
            None => qualified_name(&self.namespace, &self.name),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]{}", self.assembly, self.full_name())
    }
}

/// Join a namespace and a type name the way metadata does
#[must_use]
pub fn qualified_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}

/// A type as it appears in a signature blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[allow(missing_docs)]
pub enum TypeSignature {
    #[default]
    Void,
    Boolean,
    Char,
    I1,
    U1,
    I2,
    U2,
    I4,
    U4,
    I8,
    U8,
    R4,
    R8,
    String,
    I,
    U,
    Object,
    TypedByRef,
    /// Unmanaged pointer to the inner type
    Ptr(Box<TypeSignature>),
    /// Managed reference to the inner type
    ByRef(Box<TypeSignature>),
    /// A value type
    ValueType(TypeRef),
    /// A reference type
    Class(TypeRef),
    /// A generic parameter of the enclosing type, by index
    GenericParamType(u32),
    /// A generic parameter of the enclosing method, by index
    GenericParamMethod(u32),
    /// Multi-dimensional array of the given rank
    Array(Box<TypeSignature>, u32),
    /// Single-dimensional, zero-based array
    SzArray(Box<TypeSignature>),
    /// Instantiation of a generic type definition with type arguments
    GenericInst(Box<TypeSignature>, Vec<TypeSignature>),
}

impl TypeSignature {
    /// The named type definition behind this signature, looking through generic instantiations.
    #[must_use]
    pub fn type_ref(&self) -> Option<&TypeRef> {
        match self {
            TypeSignature::Class(type_ref) | TypeSignature::ValueType(type_ref) => Some(type_ref),
            TypeSignature::GenericInst(base, _) => base.type_ref(),
            _ => None,
        }
    }

    /// Type arguments of a generic instantiation, empty otherwise
    #[must_use]
    pub fn type_args(&self) -> &[TypeSignature] {
        match self {
            TypeSignature::GenericInst(_, args) => args,
            _ => &[],
        }
    }

    /// Replace type-level generic parameters with the given instantiation arguments.
    ///
    /// Parameters without a matching argument are left in place.
    #[must_use]
    pub fn substitute(&self, type_args: &[TypeSignature]) -> TypeSignature {
        if type_args.is_empty() {
            return self.clone();
        }

        match self {
            TypeSignature::GenericParamType(index) => type_args
                .get(*index as usize)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            TypeSignature::Ptr(inner) => TypeSignature::Ptr(Box::new(inner.substitute(type_args))),
            TypeSignature::ByRef(inner) => {
                TypeSignature::ByRef(Box::new(inner.substitute(type_args)))
            }
            TypeSignature::SzArray(inner) => {
                TypeSignature::SzArray(Box::new(inner.substitute(type_args)))
            }
            TypeSignature::Array(inner, rank) => {
                TypeSignature::Array(Box::new(inner.substitute(type_args)), *rank)
            }
            TypeSignature::GenericInst(base, args) => TypeSignature::GenericInst(
                base.clone(),
                args.iter().map(|arg| arg.substitute(type_args)).collect(),
            ),
            other => other.clone(),
        }
    }

    /// Reflection-style name of the type, as used in policy documents.
    #[must_use]
    pub fn full_name(&self) -> String {
        match self {
            TypeSignature::Void => "System.Void".to_string(),
            TypeSignature::Boolean => "System.Boolean".to_string(),
            TypeSignature::Char => "System.Char".to_string(),
            TypeSignature::I1 => "System.SByte".to_string(),
            TypeSignature::U1 => "System.Byte".to_string(),
            TypeSignature::I2 => "System.Int16".to_string(),
            TypeSignature::U2 => "System.UInt16".to_string(),
            TypeSignature::I4 => "System.Int32".to_string(),
            TypeSignature::U4 => "System.UInt32".to_string(),
            TypeSignature::I8 => "System.Int64".to_string(),
            TypeSignature::U8 => "System.UInt64".to_string(),
            TypeSignature::R4 => "System.Single".to_string(),
            TypeSignature::R8 => "System.Double".to_string(),
            TypeSignature::String => "System.String".to_string(),
            TypeSignature::I => "System.IntPtr".to_string(),
            TypeSignature::U => "System.UIntPtr".to_string(),
            TypeSignature::Object => "System.Object".to_string(),
            TypeSignature::TypedByRef => "System.TypedReference".to_string(),
            TypeSignature::Ptr(inner) => format!("{}*", inner.full_name()),
            TypeSignature::ByRef(inner) => format!("{}@", inner.full_name()),
            TypeSignature::ValueType(type_ref) | TypeSignature::Class(type_ref) => {
                type_ref.full_name()
            }
            TypeSignature::GenericParamType(index) => format!("!{}", index),
            TypeSignature::GenericParamMethod(index) => format!("!!{}", index),
            TypeSignature::Array(inner, rank) => {
                let commas = ",".repeat(rank.saturating_sub(1) as usize);
                format!("{}[{}]", inner.full_name(), commas)
            }
            TypeSignature::SzArray(inner) => format!("{}[]", inner.full_name()),
            TypeSignature::GenericInst(base, args) => {
                let args: Vec<String> = args.iter().map(TypeSignature::full_name).collect();
                format!("{}<{}>", base.full_name(), args.join(","))
            }
        }
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Signature of a method definition or reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MethodSignature {
    /// Instance method taking an implicit `this`
    pub has_this: bool,
    /// Number of generic parameters declared by the method
    pub generic_param_count: u32,
    /// Return type
    pub return_type: TypeSignature,
    /// Parameter types, in order
    pub params: Vec<TypeSignature>,
}

impl MethodSignature {
    /// Instance method returning `return_type` with the given parameters
    #[must_use]
    pub fn instance(return_type: TypeSignature, params: Vec<TypeSignature>) -> Self {
        MethodSignature {
            has_this: true,
            generic_param_count: 0,
            return_type,
            params,
        }
    }

    /// Static method returning `return_type` with the given parameters
    #[must_use]
    pub fn static_method(return_type: TypeSignature, params: Vec<TypeSignature>) -> Self {
        MethodSignature {
            has_this: false,
            generic_param_count: 0,
            return_type,
            params,
        }
    }
}

/// Signature part of a [`MemberRef`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberRefSignature {
    /// Reference to a method
    Method(MethodSignature),
    /// Reference to a field of the given type
    Field(TypeSignature),
    /// A signature blob whose calling convention is neither a method nor a field
    Other(u8),
}

/// A reference to a method or field declared on some type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberRef {
    /// The declaring type, possibly a generic instantiation
    pub declaring_type: TypeSignature,
    /// Member name
    pub name: String,
    /// Member signature
    pub signature: MemberRefSignature,
}

impl MemberRef {
    /// Reference a method on `declaring_type`
    pub fn method(
        declaring_type: TypeSignature,
        name: impl Into<String>,
        signature: MethodSignature,
    ) -> Self {
        MemberRef {
            declaring_type,
            name: name.into(),
            signature: MemberRefSignature::Method(signature),
        }
    }

    /// Reference a field on `declaring_type`
    pub fn field(declaring_type: TypeSignature, name: impl Into<String>, field_type: TypeSignature) -> Self {
        MemberRef {
            declaring_type,
            name: name.into(),
            signature: MemberRefSignature::Field(field_type),
        }
    }

    /// The method signature, if this references a method
    #[must_use]
    pub fn method_signature(&self) -> Option<&MethodSignature> {
        match &self.signature {
            MemberRefSignature::Method(signature) => Some(signature),
            _ => None,
        }
    }
}

impl fmt::Display for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.declaring_type, self.name)
    }
}
