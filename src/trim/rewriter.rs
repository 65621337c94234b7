//! Depth-first rewrite of one assembly's metadata graph.
//!
//! Every node is looked up in the policy by its derived key. A node without entry is removed
//! together with everything below it; a kept node has its children rewritten, its
//! cross-references repaired and the enabled mutation policies applied.

use log::debug;

use crate::{
    metadata::{
        Assembly, ExportedType, MethodDef, MethodImpl, Module, TypeAttributes, TypeDef,
        TypeMember, TypeRef, TypeSignature,
    },
    policy::{keys, MemberEntry, PolicyElement},
    trim::{
        context::{is_special_type_name, TrimContext, TypeContext, TypeScope, MODULE_TYPE},
        interfaces, mutate,
    },
    Result,
};

/// Rewrite `assembly` in place. The caller has checked that `cx` describes this assembly.
pub(crate) fn rewrite_assembly(cx: &mut TrimContext<'_>, assembly: &mut Assembly) -> Result<()> {
    mutate::strip_custom_attributes(&mut assembly.custom_attributes, cx.options);
    mutate::strip_security(&mut assembly.security, cx.options);

    rewrite_module(cx, &mut assembly.module)
}

fn is_module_type(type_def: &TypeDef) -> bool {
    type_def.namespace.is_empty() && type_def.name == MODULE_TYPE
}

fn rewrite_module(cx: &mut TrimContext<'_>, module: &mut Module) -> Result<()> {
    let mut types = std::mem::take(&mut module.types);
    types.sort_by_key(|type_def| !is_module_type(type_def));

    for type_def in types {
        if let Some(type_def) = rewrite_type(cx, None, type_def)? {
            module.types.push(type_def);
        }
    }

    module.module_refs.clear();
    module.user_strings.clear();
    if cx.options.remove_manifest_resources {
        module.resources.clear();
    }

    filter_exported_types(cx, &mut module.exported_types);
    module.all_types = std::mem::take(&mut cx.emitted);
    Ok(())
}

/// Keep type forwarders the policy lists. Nested forwarders share the fate of their parent;
/// exported types that are not forwarders are left alone.
fn filter_exported_types(cx: &TrimContext<'_>, exported_types: &mut Vec<ExportedType>) {
    exported_types.retain(|exported| match &exported.forwarded_to {
        Some(assembly) => {
            let full_name = exported.full_name();
            let keep = cx.assembly.get_type_forwarder(assembly, &full_name).is_some();
            if !keep {
                debug!("Dropping type forwarder {} -> {}", full_name, assembly);
            }
            keep
        }
        None => true,
    });
}

/// The type as seen from inside itself: a class or value type, instantiated over its own
/// generic parameters.
fn self_signature(type_def: &TypeDef, scope_ref: &TypeRef) -> TypeSignature {
    let base = if type_def.is_value_type() {
        TypeSignature::ValueType(scope_ref.clone())
    } else {
        TypeSignature::Class(scope_ref.clone())
    };

    if type_def.generic_params.is_empty() {
        base
    } else {
        let count = u32::try_from(type_def.generic_params.len()).unwrap_or(u32::MAX);
        TypeSignature::GenericInst(
            Box::new(base),
            (0..count).map(TypeSignature::GenericParamType).collect(),
        )
    }
}

fn rewrite_type<'a>(
    cx: &mut TrimContext<'a>,
    parent: Option<&TypeScope<'a>>,
    mut type_def: TypeDef,
) -> Result<Option<TypeDef>> {
    let key = keys::type_key(&type_def, parent.map(|parent| parent.key.as_str()));
    let entry = cx.type_entry(&key);

    let special = match parent {
        Some(parent) => parent.is_special(),
        None => key == MODULE_TYPE || (entry.is_none() && is_special_type_name(&key)),
    };
    let context = match (special, entry) {
        (true, _) => TypeContext::Special,
        (false, Some(entry)) => TypeContext::Entry(entry),
        (false, None) => {
            debug!("Dropping type {}", key);
            return Ok(None);
        }
    };

    let type_ref = type_def.type_ref(&cx.assembly.name, parent.map(|parent| &parent.type_ref));
    let scope = TypeScope {
        signature: self_signature(&type_def, &type_ref),
        key,
        type_ref,
        context,
    };
    cx.emitted.push(scope.key.clone());

    interfaces::filter_interfaces(cx, &scope, &mut type_def.interfaces);
    mutate::strip_serializable(&mut type_def, cx.options);

    let mut nested_types = Vec::with_capacity(type_def.nested_types.len());
    for nested in std::mem::take(&mut type_def.nested_types) {
        if let Some(nested) = rewrite_type(cx, Some(&scope), nested)? {
            nested_types.push(nested);
        }
    }
    type_def.nested_types = nested_types;

    let cx = &*cx;
    type_def.fields = prune(
        &scope,
        std::mem::take(&mut type_def.fields),
        |member| TypeMember::Field(member),
        |field, entry| {
            mutate::mutate_field(cx, field, entry);
            Ok(())
        },
    )?;
    type_def.events = prune(
        &scope,
        std::mem::take(&mut type_def.events),
        |member| TypeMember::Event(member),
        |event, entry| {
            mutate::mutate_event(cx, event, entry);
            Ok(())
        },
    )?;
    type_def.properties = prune(
        &scope,
        std::mem::take(&mut type_def.properties),
        |member| TypeMember::Property(member),
        |property, entry| {
            mutate::mutate_property(cx, property, entry);
            Ok(())
        },
    )?;

    let methods = std::mem::take(&mut type_def.methods);
    let interfaces = &type_def.interfaces;
    let method_impls = &mut type_def.method_impls;
    type_def.methods = prune(&scope, methods, |member| TypeMember::Method(member), |method, entry| {
        mutate::mutate_method(cx, method, entry);
        narrow_method(cx, &scope, interfaces, method, entry, method_impls)
    })?;

    interfaces::filter_method_impls(cx, &scope, &mut type_def.method_impls)?;
    mutate::strip_custom_attributes(&mut type_def.custom_attributes, cx.options);
    mutate::strip_security(&mut type_def.security, cx.options);

    if type_def.security.is_empty() {
        type_def.flags &= !TypeAttributes::HAS_SECURITY;
    }
    if cx.options.ensure_constructors_present && !scope.is_special() {
        mutate::ensure_constructor(&mut type_def, &scope.key);
    }
    if let Some(entry) = scope.entry() {
        mutate::mutate_type(cx, &mut type_def, entry);
    }

    Ok(Some(type_def))
}

/// Narrow a kept method, adding explicit interface implementations first.
fn narrow_method(
    cx: &TrimContext<'_>,
    scope: &TypeScope<'_>,
    interfaces: &[TypeSignature],
    method: &mut MethodDef,
    entry: &MemberEntry,
    method_impls: &mut Vec<MethodImpl>,
) -> Result<()> {
    if !mutate::should_narrow(cx, PolicyElement::Member(entry)) || method.access.is_internal() {
        return Ok(());
    }

    interfaces::add_explicit_impls(cx, scope, interfaces, method, method_impls)?;
    method.access = mutate::narrow_access(method.access);
    Ok(())
}

/// Keep the members of `scope` that the policy lists, mutating each one that survives.
fn prune<T>(
    scope: &TypeScope<'_>,
    members: Vec<T>,
    view: impl for<'r> Fn(&'r T) -> TypeMember<'r>,
    mut mutate: impl FnMut(&mut T, &MemberEntry) -> Result<()>,
) -> Result<Vec<T>> {
    let mut kept = Vec::with_capacity(members.len());

    for mut member in members {
        let Some(entry) = scope.member(view(&member))? else {
            debug!("Dropping member {}::{}", scope.key, view(&member).name());
            continue;
        };

        mutate(&mut member, &*entry)?;
        kept.push(member);
    }

    Ok(kept)
}
