//! Declarative security attached to assemblies, types and methods.

use crate::metadata::customattributes::CustomAttribute;

/// The different `SecurityAction` types
///
/// # Reference
/// * ECMA-335 II.22.11
/// * <https://learn.microsoft.com/en-us/dotnet/api/system.security.permissions.securityaction>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityAction {
    /// Without further checks, refuse Demand for the specified permission.
    Deny,
    /// Check that all callers in the call chain have been granted specified permission.
    Demand,
    /// Without further checks, satisfy Demand for the specified permission.
    Assert,
    /// Check that the current assembly has been granted the specified permission.
    NonCasDemand,
    /// Check that the immediate caller has been granted the specified permission.
    LinkDemand,
    /// The specified permission shall be granted in order to inherit from class or override
    /// virtual method.
    InheritanceDemand,
    /// Specify the minimum permissions required to run.
    RequestMinimum,
    /// Specify the optional permissions to grant.
    RequestOptional,
    /// Specify the permissions not to be granted.
    RequestRefuse,
    /// Reserved for implementation-specific use.
    PrejitGrant,
    /// Reserved for implementation-specific use.
    PrejitDeny,
    /// Non-CAS version of `LinkDemand`.
    NonCasLinkDemand,
    /// Non-CAS version of `InheritanceDemand`.
    NonCasInheritance,
    /// Link demand for any of the given permissions.
    LinkDemandChoice,
    /// Inheritance demand for any of the given permissions.
    InheritanceDemandChoice,
    /// Demand for any of the given permissions.
    DemandChoice,
    /// Refuse Demand for all permissions other than those specified.
    PermitOnly,
    /// Unknown security action.
    Unknown(u16),
}

impl From<u16> for SecurityAction {
    fn from(value: u16) -> Self {
        match value {
            0x0001 => SecurityAction::Deny,
            0x0002 => SecurityAction::Demand,
            0x0003 => SecurityAction::Assert,
            0x0004 => SecurityAction::NonCasDemand,
            0x0005 => SecurityAction::LinkDemand,
            0x0006 => SecurityAction::InheritanceDemand,
            0x0007 => SecurityAction::RequestMinimum,
            0x0008 => SecurityAction::RequestOptional,
            0x0009 => SecurityAction::RequestRefuse,
            0x000A => SecurityAction::PrejitGrant,
            0x000B => SecurityAction::PrejitDeny,
            0x000C => SecurityAction::NonCasLinkDemand,
            0x000D => SecurityAction::NonCasInheritance,
            0x000E => SecurityAction::LinkDemandChoice,
            0x000F => SecurityAction::InheritanceDemandChoice,
            0x0010 => SecurityAction::DemandChoice,
            0x0011 => SecurityAction::PermitOnly,
            _ => SecurityAction::Unknown(value),
        }
    }
}

/// A `DeclSecurity` entry: one security action and the permission attributes it applies to.
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityDeclaration {
    /// The action
    pub action: SecurityAction,
    /// Permission attributes, e.g. `SecurityPermissionAttribute`
    pub attributes: Vec<CustomAttribute>,
}

impl SecurityDeclaration {
    /// Create a declaration for `action` over `attributes`
    #[must_use]
    pub fn new(action: SecurityAction, attributes: Vec<CustomAttribute>) -> Self {
        SecurityDeclaration { action, attributes }
    }

    /// `true` for the legacy link-time and inheritance demands
    #[must_use]
    pub fn is_legacy_demand(&self) -> bool {
        matches!(
            self.action,
            SecurityAction::LinkDemand | SecurityAction::InheritanceDemand
        )
    }
}
