//! Repair of the edges between a type and the interfaces it implements.
//!
//! Pruning may remove an interface, or an interface method, while the implementing type
//! survives. Interface lists and explicit method implementations are filtered so that no edge
//! points at something the policy removed. Narrowing a method that implicitly implements an
//! interface method would break the implementation, so such methods get an explicit edge first.

use log::debug;

use crate::{
    metadata::{MethodDef, MethodImpl, MemberRef, TypeMember, TypeRef, TypeSignature},
    policy::keys,
    trim::context::{TrimContext, TypeScope},
    Result,
};

/// `true` if `type_ref` survives: it has an entry in the current assembly, or it lives in an
/// assembly outside the run.
fn is_kept_type(cx: &TrimContext<'_>, type_ref: &TypeRef) -> bool {
    cx.type_entry(&keys::type_ref_key(type_ref)).is_some() || !cx.is_in_run(&type_ref.assembly)
}

/// `true` if `member` of `type_ref` survives, by the same rule as [`is_kept_type`].
fn is_kept_member(cx: &TrimContext<'_>, type_ref: &TypeRef, member: TypeMember<'_>) -> Result<bool> {
    if let Some(entry) = cx.type_entry(&keys::type_ref_key(type_ref)) {
        if entry.get_member(member)?.is_some() {
            return Ok(true);
        }
    }
    Ok(!cx.is_in_run(&type_ref.assembly))
}

/// Drop implemented interfaces the policy removed.
pub(crate) fn filter_interfaces(
    cx: &TrimContext<'_>,
    scope: &TypeScope<'_>,
    interfaces: &mut Vec<TypeSignature>,
) {
    interfaces.retain(|interface| match interface.type_ref() {
        Some(type_ref) => {
            let keep = is_kept_type(cx, type_ref);
            if !keep {
                debug!("Dropping interface {} from {}", interface, scope.key);
            }
            keep
        }
        None => true,
    });
}

/// Drop explicit method implementations whose implementing or implemented side was removed.
///
/// # Errors
/// Returns [`crate::Error::UnsupportedMemberKind`] for edges that reference neither methods nor
/// fields.
pub(crate) fn filter_method_impls(
    cx: &TrimContext<'_>,
    scope: &TypeScope<'_>,
    method_impls: &mut Vec<MethodImpl>,
) -> Result<()> {
    let mut kept = Vec::with_capacity(method_impls.len());

    for method_impl in method_impls.drain(..) {
        let implementing = scope
            .member(TypeMember::Reference(&method_impl.implementing))?
            .is_some();
        let implemented = match method_impl.implemented.declaring_type.type_ref() {
            Some(type_ref) => {
                is_kept_member(cx, type_ref, TypeMember::Reference(&method_impl.implemented))?
            }
            None => true,
        };

        if implementing && implemented {
            kept.push(method_impl);
        } else {
            debug!(
                "Dropping method impl {} -> {} from {}",
                method_impl.implementing, method_impl.implemented, scope.key
            );
        }
    }

    *method_impls = kept;
    Ok(())
}

/// `candidate`, declared on an interface instantiated with `type_args`, has the shape of
/// `method`.
fn implements(method: &MethodDef, candidate: &MethodDef, type_args: &[TypeSignature]) -> bool {
    let (signature, other) = (&method.signature, &candidate.signature);

    candidate.name == method.name
        && other.has_this
        && other.generic_param_count == signature.generic_param_count
        && other.return_type.substitute(type_args) == signature.return_type
        && other.params.len() == signature.params.len()
        && other
            .params
            .iter()
            .zip(&signature.params)
            .all(|(param, expected)| param.substitute(type_args) == *expected)
}

/// Add an explicit implementation edge from `method` to each interface method it implicitly
/// implements, so the method can lose its public visibility.
///
/// Only virtual methods implement interface methods. Interface methods that the policy removed
/// are skipped, and so are edges that already exist. Returns the number of edges added.
///
/// # Errors
/// Returns [`crate::Error::UnsupportedMemberKind`] if a policy lookup fails.
pub(crate) fn add_explicit_impls(
    cx: &TrimContext<'_>,
    scope: &TypeScope<'_>,
    interfaces: &[TypeSignature],
    method: &MethodDef,
    method_impls: &mut Vec<MethodImpl>,
) -> Result<usize> {
    if !method.is_virtual() {
        return Ok(0);
    }

    let mut added = 0;
    for interface in interfaces {
        let Some(type_ref) = interface.type_ref() else {
            continue;
        };
        let Some(interface_def) = cx.host.resolve_type(type_ref) else {
            continue;
        };

        for candidate in &interface_def.methods {
            if !implements(method, candidate, interface.type_args())
                || !is_kept_member(cx, type_ref, TypeMember::Method(candidate))?
            {
                continue;
            }

            let implemented =
                MemberRef::method(interface.clone(), &candidate.name, candidate.signature.clone());
            if method_impls
                .iter()
                .any(|existing| existing.implemented == implemented)
            {
                continue;
            }

            debug!("Adding explicit impl {}::{} -> {}", scope.key, method.name, implemented);
            method_impls.push(MethodImpl {
                implementing: MemberRef::method(
                    scope.signature.clone(),
                    &method.name,
                    method.signature.clone(),
                ),
                implemented,
            });
            added += 1;
        }
    }

    Ok(added)
}
