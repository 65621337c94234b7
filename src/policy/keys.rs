//! Derivation of the string keys that address policy entries.
//!
//! Keys depend only on the syntactic identity of the item itself, never on how the item was
//! reached, so a key computed while reading a policy document matches the key computed for the
//! same item while walking a metadata graph.
//!
//! | Item          | Key                                                   |
//! |---------------|-------------------------------------------------------|
//! | Type          | `Namespace.Name`, nested types as `Outer+Inner`       |
//! | Member        | `Kind : Name`, or `Kind : Name : ReturnType`           |
//! | Type forwarder| `Assembly Namespace.Name`                             |
//!
//! Method keys spell instance constructors `#ctor`. The return type is only part of the key for
//! the conversion operators `op_Explicit` and `op_Implicit`, which are the only methods that
//! overload on return type. Parameter types are not part of any key, so overloads that share a
//! name collapse onto one entry.

use crate::{
    metadata::{MemberRef, MemberRefSignature, MethodDef, TypeDef, TypeMember, TypeRef, CTOR},
    policy::MemberKind,
    Error, Result,
};

const CTOR_KEY: &str = "#ctor";

/// Key of `type_def`, reached through the enclosing type with key `enclosing`
#[must_use]
pub fn type_key(type_def: &TypeDef, enclosing: Option<&str>) -> String {
    type_def.qualified_name(enclosing)
}

/// Key of the type referenced by `type_ref`
#[must_use]
pub fn type_ref_key(type_ref: &TypeRef) -> String {
    type_ref.full_name()
}

/// Member key from its parts, as written in a policy document.
///
/// ```rust
/// use dottrim::policy::{keys, MemberKind};
///
/// assert_eq!(keys::member_key_from_parts(MemberKind::Field, "_count", None), "Field : _count");
/// assert_eq!(
///     keys::member_key_from_parts(MemberKind::Method, "op_Explicit", Some("System.Int32")),
///     "Method : op_Explicit : System.Int32"
/// );
/// ```
#[must_use]
pub fn member_key_from_parts(kind: MemberKind, name: &str, return_type: Option<&str>) -> String {
    match return_type {
        Some(return_type) => format!("{} : {} : {}", kind, name, return_type),
        None => format!("{} : {}", kind, name),
    }
}

/// Key of a member of a type definition.
///
/// # Errors
/// Returns [`Error::UnsupportedMemberKind`] for a member reference whose signature is neither a
/// method nor a field.
pub fn member_key(member: TypeMember<'_>) -> Result<String> {
    match member {
        TypeMember::Field(field) => Ok(member_key_from_parts(MemberKind::Field, &field.name, None)),
        TypeMember::Property(property) => Ok(member_key_from_parts(
            MemberKind::Property,
            &property.name,
            None,
        )),
        TypeMember::Event(event) => Ok(member_key_from_parts(MemberKind::Event, &event.name, None)),
        TypeMember::Method(method) => Ok(method_key(method)),
        TypeMember::Reference(reference) => member_ref_key(reference),
    }
}

/// Key of a method definition
#[must_use]
pub fn method_key(method: &MethodDef) -> String {
    method_key_from_signature(&method.name, &method.signature.return_type.full_name())
}

/// Key of a method or field reference.
///
/// # Errors
/// Returns [`Error::UnsupportedMemberKind`] if the reference is neither a method nor a field.
pub fn member_ref_key(reference: &MemberRef) -> Result<String> {
    match &reference.signature {
        MemberRefSignature::Method(signature) => Ok(method_key_from_signature(
            &reference.name,
            &signature.return_type.full_name(),
        )),
        MemberRefSignature::Field(_) => {
            Ok(member_key_from_parts(MemberKind::Field, &reference.name, None))
        }
        MemberRefSignature::Other(calling_convention) => Err(Error::UnsupportedMemberKind(format!(
            "{} (calling convention 0x{:02X})",
            reference, calling_convention
        ))),
    }
}

fn method_key_from_signature(name: &str, return_type: &str) -> String {
    let name = name.replace(CTOR, CTOR_KEY);
    if name == "op_Explicit" || name == "op_Implicit" {
        member_key_from_parts(MemberKind::Method, &name, Some(return_type))
    } else {
        member_key_from_parts(MemberKind::Method, &name, None)
    }
}

/// Key of a forwarder for `type_name` to `assembly`
#[must_use]
pub fn type_forwarder_key(assembly: &str, type_name: &str) -> String {
    format!("{} {}", assembly, type_name)
}
