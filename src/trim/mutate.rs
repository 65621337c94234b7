//! Mutation policies applied to the elements that survive pruning.
//!
//! Every function here assumes the element is kept. Which policies run is decided by
//! [`TrimOptions`]; the policy entry of the element decides what they do.

use log::debug;

use crate::{
    metadata::{
        has_attribute, is_nested_visibility, narrow_type_visibility, type_visibility_rank,
        CustomAttribute, EventDef, FieldAttributes, FieldDef, MemberAccessFlags, MethodDef,
        MethodDefBuilder, MethodModifiers, PropertyDef, SecurityDeclaration, TypeAttributes,
        TypeDef,
    },
    policy::{MemberEntry, PolicyElement, SecurityTransparencyStatus, TypeEntry},
    trim::{annotations, context::TrimContext, TrimOptions},
};

const NON_SERIALIZED: &str = "System.NonSerializedAttribute";
const OPTIONAL_FIELD: &str = "System.Runtime.Serialization.OptionalFieldAttribute";
const SUPPRESS_UNMANAGED_CODE_SECURITY: &str =
    "System.Security.SuppressUnmanagedCodeSecurityAttribute";
const HOST_PROTECTION: &str = "System.Security.Permissions.HostProtectionAttribute";

/// Drop the serialization and legacy security attributes the options ask to remove.
pub(crate) fn strip_custom_attributes(attributes: &mut Vec<CustomAttribute>, options: &TrimOptions) {
    attributes.retain(|attribute| {
        if options.remove_serializability_info
            && (attribute.is(NON_SERIALIZED) || attribute.is(OPTIONAL_FIELD))
        {
            return false;
        }
        !(options.remove_desktop_security && attribute.is(SUPPRESS_UNMANAGED_CODE_SECURITY))
    });
}

/// Drop legacy link and inheritance demands, unless they carry a host protection attribute.
pub(crate) fn strip_security(declarations: &mut Vec<SecurityDeclaration>, options: &TrimOptions) {
    if !options.remove_desktop_security {
        return;
    }

    declarations.retain(|declaration| {
        !declaration.is_legacy_demand()
            || declaration
                .attributes
                .iter()
                .any(|attribute| attribute.is(HOST_PROTECTION))
    });
}

/// Make `attributes` carry `FriendAccessAllowedAttribute`, if the core library defines it.
pub(crate) fn allow_friend_access(cx: &TrimContext<'_>, attributes: &mut Vec<CustomAttribute>) {
    if let Some(attribute_type) = cx.friend_access_attribute() {
        if !has_attribute(attributes, attribute_type) {
            attributes.push(CustomAttribute::new(attribute_type.clone()));
        }
    }
}

fn annotate(
    cx: &TrimContext<'_>,
    attributes: &mut Vec<CustomAttribute>,
    target: SecurityTransparencyStatus,
) {
    if cx.options.apply_annotations {
        annotations::reconcile(attributes, target, cx.host.core_assembly_name());
    }
}

/// Transparency and friend access shared by every kind of member.
fn mutate_member_attributes(
    cx: &TrimContext<'_>,
    attributes: &mut Vec<CustomAttribute>,
    entry: &MemberEntry,
    friend_access: bool,
) {
    strip_custom_attributes(attributes, cx.options);
    annotate(cx, attributes, entry.security);

    if friend_access && PolicyElement::Member(entry).is_friend_access_allowed() {
        allow_friend_access(cx, attributes);
    }
}

/// `true` if visibility changes are enabled and `entry` asks to become internal
pub(crate) fn should_narrow(cx: &TrimContext<'_>, element: PolicyElement<'_>) -> bool {
    cx.options.change_visibility && element.should_make_internal()
}

pub(crate) fn mutate_field(cx: &TrimContext<'_>, field: &mut FieldDef, entry: &MemberEntry) {
    mutate_member_attributes(cx, &mut field.custom_attributes, entry, true);

    if should_narrow(cx, PolicyElement::Member(entry)) && !field.access.is_internal() {
        field.access = narrow_access(field.access);
    }
    if cx.options.remove_serializability_info {
        field.flags &= !FieldAttributes::NOT_SERIALIZED;
    }
}

/// Attribute, annotation and security changes of a kept method. Narrowing is done by the caller,
/// after explicit implementations have been added.
pub(crate) fn mutate_method(cx: &TrimContext<'_>, method: &mut MethodDef, entry: &MemberEntry) {
    strip_security(&mut method.security, cx.options);
    mutate_member_attributes(cx, &mut method.custom_attributes, entry, true);

    if method.security.is_empty() {
        method.modifiers.remove(MethodModifiers::HAS_SECURITY);
    }
}

pub(crate) fn mutate_property(cx: &TrimContext<'_>, property: &mut PropertyDef, entry: &MemberEntry) {
    mutate_member_attributes(cx, &mut property.custom_attributes, entry, false);
}

pub(crate) fn mutate_event(cx: &TrimContext<'_>, event: &mut EventDef, entry: &MemberEntry) {
    mutate_member_attributes(cx, &mut event.custom_attributes, entry, true);
}

/// Type-level mutations, run once the type's children have been rewritten.
pub(crate) fn mutate_type(cx: &TrimContext<'_>, type_def: &mut TypeDef, entry: &TypeEntry) {
    if entry.security != SecurityTransparencyStatus::Transparent {
        annotate(cx, &mut type_def.custom_attributes, entry.security);
    }

    let element = PolicyElement::Type(entry);
    if element.is_friend_access_allowed() {
        allow_friend_access(cx, &mut type_def.custom_attributes);
    }
    if should_narrow(cx, element) {
        type_def.flags = narrow_type(type_def.flags);
    }
}

/// Narrow member accessibility one step down the lattice.
pub(crate) fn narrow_access(access: MemberAccessFlags) -> MemberAccessFlags {
    let narrowed = access.narrowed();
    debug_assert!(narrowed.rank() <= access.rank(), "{:?} widened to {:?}", access, narrowed);
    narrowed
}

fn narrow_type(flags: u32) -> u32 {
    let narrowed = narrow_type_visibility(flags);
    debug_assert!(type_visibility_rank(narrowed) <= type_visibility_rank(flags));
    debug_assert_eq!(is_nested_visibility(narrowed), is_nested_visibility(flags));
    narrowed
}

/// Clear the `Serializable` flag if the options ask for it.
pub(crate) fn strip_serializable(type_def: &mut TypeDef, options: &TrimOptions) {
    if options.remove_serializability_info {
        type_def.flags &= !TypeAttributes::SERIALIZABLE;
    }
}

/// Give a class without instance constructor a private parameterless one.
///
/// Static classes, interfaces and value types are left alone. Returns `true` if a constructor
/// was added.
pub(crate) fn ensure_constructor(type_def: &mut TypeDef, key: &str) -> bool {
    if type_def.has_instance_constructor() || !type_def.is_class() || type_def.is_static() {
        return false;
    }

    debug!("Adding default constructor to {}", key);
    type_def.methods.push(MethodDefBuilder::constructor().build());
    true
}
