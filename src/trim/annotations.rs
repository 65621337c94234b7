//! Security transparency annotations.
//!
//! An element is `SecurityCritical`, `SecuritySafeCritical` or transparent depending on the
//! attributes it carries. Reconciling rewrites those attributes so that the element ends up with
//! the transparency the policy asks for.

use crate::{
    metadata::{CustomAttribute, TypeRef},
    policy::SecurityTransparencyStatus,
};

const SECURITY_NAMESPACE: &str = "System.Security";
const CRITICAL: &str = "SecurityCriticalAttribute";
const SAFE_CRITICAL: &str = "SecuritySafeCriticalAttribute";
const TREAT_AS_SAFE: &str = "SecurityTreatAsSafeAttribute";
// Spelling found in older framework assemblies
const TREAT_AS_SAFE_LEGACY: &str = "SecurityTreatAsSafe";

fn is_security(attribute: &CustomAttribute, name: &str) -> bool {
    attribute.attribute_type.enclosing.is_none()
        && attribute.attribute_type.namespace == SECURITY_NAMESPACE
        && attribute.attribute_type.name == name
}

fn is_treat_as_safe(attribute: &CustomAttribute) -> bool {
    is_security(attribute, TREAT_AS_SAFE) || is_security(attribute, TREAT_AS_SAFE_LEGACY)
}

fn is_transparency_attribute(attribute: &CustomAttribute) -> bool {
    is_security(attribute, CRITICAL)
        || is_security(attribute, SAFE_CRITICAL)
        || is_treat_as_safe(attribute)
}

/// Transparency currently expressed by `attributes`.
///
/// `SecuritySafeCritical` wins over everything; `SecurityCritical` together with
/// `SecurityTreatAsSafe` is safe-critical as well.
#[must_use]
pub(crate) fn current_status(attributes: &[CustomAttribute]) -> SecurityTransparencyStatus {
    let mut critical = false;
    let mut treat_as_safe = false;

    for attribute in attributes {
        if is_security(attribute, SAFE_CRITICAL) {
            return SecurityTransparencyStatus::SafeCritical;
        }
        critical |= is_security(attribute, CRITICAL);
        treat_as_safe |= is_treat_as_safe(attribute);
    }

    match (critical, treat_as_safe) {
        (true, true) => SecurityTransparencyStatus::SafeCritical,
        (true, false) => SecurityTransparencyStatus::Critical,
        _ => SecurityTransparencyStatus::Transparent,
    }
}

/// Rewrite `attributes` to express `target`.
///
/// Nothing happens for an `Undefined` target or when the attributes already express it.
/// Otherwise all transparency attributes are removed and the one for `target` is added, from the
/// core library `core_assembly`. Returns `true` if the list changed.
pub(crate) fn reconcile(
    attributes: &mut Vec<CustomAttribute>,
    target: SecurityTransparencyStatus,
    core_assembly: &str,
) -> bool {
    if target == SecurityTransparencyStatus::Undefined || current_status(attributes) == target {
        return false;
    }

    attributes.retain(|attribute| !is_transparency_attribute(attribute));

    let name = match target {
        SecurityTransparencyStatus::Critical => CRITICAL,
        SecurityTransparencyStatus::SafeCritical => SAFE_CRITICAL,
        SecurityTransparencyStatus::Transparent | SecurityTransparencyStatus::Undefined => {
            return true
        }
    };
    attributes.push(CustomAttribute::new(TypeRef::new(
        core_assembly,
        SECURITY_NAMESPACE,
        name,
    )));
    true
}
