//! Per-symbol decisions carried by policy entries.

use strum::{Display, EnumCount, EnumIter, EnumString};

/// Whether a symbol survives trimming, and whether it counts as part of the public surface.
///
/// The textual form (`Display` / `FromStr`) is the spelling used by policy documents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, EnumCount,
)]
pub enum IncludeStatus {
    /// Take the status of the enclosing element. Only valid while reading a document; members
    /// must end up with a concrete status.
    #[default]
    Inherit,
    /// Public API, kept as a root
    ApiRoot,
    /// Public API, kept because a root needs it
    ApiClosure,
    /// Public in the reference surface but internal to the framework; friend access allowed
    ApiFxInternal,
    /// Implementation detail, kept as a root
    ImplRoot,
    /// Implementation detail, kept because a root needs it
    ImplClosure,
    /// Removed. The engine treats an excluded entry exactly like a missing one.
    Exclude,
}

impl IncludeStatus {
    /// `true` for `ApiRoot`, `ApiClosure` and `ApiFxInternal`
    #[must_use]
    pub fn is_visible_externally(self) -> bool {
        matches!(
            self,
            IncludeStatus::ApiRoot | IncludeStatus::ApiClosure | IncludeStatus::ApiFxInternal
        )
    }

    /// `true` for the implementation-only statuses `ImplRoot` and `ImplClosure`
    #[must_use]
    pub fn is_implementation_only(self) -> bool {
        matches!(self, IncludeStatus::ImplRoot | IncludeStatus::ImplClosure)
    }

    /// `true` for `Exclude`
    #[must_use]
    pub fn is_excluded(self) -> bool {
        self == IncludeStatus::Exclude
    }
}

/// Visibility requested for a kept symbol, independent of its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisibilityOverride {
    /// Leave visibility alone
    #[default]
    None,
    /// Narrow to assembly visibility (`VO="internal"` in policy documents)
    ForceInternal,
}

impl VisibilityOverride {
    /// Parse the `VO` attribute; anything other than `internal` means no override.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("internal") => VisibilityOverride::ForceInternal,
            _ => VisibilityOverride::None,
        }
    }
}

/// Security transparency classification of a type or member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter)]
pub enum SecurityTransparencyStatus {
    /// No requirement; the existing annotations are left alone
    #[default]
    Undefined,
    /// Transparent code, carries no annotation
    Transparent,
    /// `SecurityCritical`
    Critical,
    /// `SecuritySafeCritical`
    SafeCritical,
}

impl SecurityTransparencyStatus {
    /// Parse the `SecurityTransparencyStatus` attribute.
    ///
    /// `Critical` and `SafeCritical` are recognised; every other value means `Transparent`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "Critical" => SecurityTransparencyStatus::Critical,
            "SafeCritical" => SecurityTransparencyStatus::SafeCritical,
            _ => SecurityTransparencyStatus::Transparent,
        }
    }
}

/// The kind of a type member addressed by a policy entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum MemberKind {
    /// A field
    Field,
    /// A method, constructor or accessor
    Method,
    /// A property
    Property,
    /// An event
    Event,
}

impl MemberKind {
    /// Parse the `MemberType` attribute. Missing or unknown values mean `Method`.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        value
            .and_then(|value| value.parse().ok())
            .unwrap_or(MemberKind::Method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn include_status_text() {
        for status in IncludeStatus::iter() {
            assert_eq!(IncludeStatus::from_str(&status.to_string()).unwrap(), status);
        }
        assert_eq!(IncludeStatus::COUNT, 7);
        assert!(IncludeStatus::from_str("apiroot").is_err());
        assert!(IncludeStatus::from_str("Excluded").is_err());
    }

    #[test]
    fn include_status_classes() {
        let visible: Vec<_> = IncludeStatus::iter()
            .filter(|status| status.is_visible_externally())
            .collect();
        assert_eq!(
            visible,
            vec![
                IncludeStatus::ApiRoot,
                IncludeStatus::ApiClosure,
                IncludeStatus::ApiFxInternal
            ]
        );
        assert!(IncludeStatus::ImplClosure.is_implementation_only());
        assert!(!IncludeStatus::ApiRoot.is_implementation_only());
        assert!(IncludeStatus::Exclude.is_excluded());
    }

    #[test]
    fn overrides() {
        assert_eq!(
            VisibilityOverride::parse(Some("internal")),
            VisibilityOverride::ForceInternal
        );
        assert_eq!(VisibilityOverride::parse(Some("Internal")), VisibilityOverride::None);
        assert_eq!(VisibilityOverride::parse(None), VisibilityOverride::None);
    }

    #[test]
    fn transparency() {
        assert_eq!(
            SecurityTransparencyStatus::parse("SafeCritical"),
            SecurityTransparencyStatus::SafeCritical
        );
        assert_eq!(
            SecurityTransparencyStatus::parse("Critical"),
            SecurityTransparencyStatus::Critical
        );
        assert_eq!(
            SecurityTransparencyStatus::parse("whatever"),
            SecurityTransparencyStatus::Transparent
        );
    }

    #[test]
    fn member_kinds() {
        assert_eq!(MemberKind::parse(Some("Field")), MemberKind::Field);
        assert_eq!(MemberKind::parse(Some("Event")), MemberKind::Event);
        assert_eq!(MemberKind::parse(Some("Constructor")), MemberKind::Method);
        assert_eq!(MemberKind::parse(None), MemberKind::Method);
        assert_eq!(MemberKind::Property.to_string(), "Property");
    }
}
