//! Switches for the mutation policies of the trim engine.

/// Configuration for a [`crate::trim::Trimmer`].
///
/// Pruning and cross-reference repair always run. Each field enables one mutation policy applied
/// to the symbols that survive. Only visibility changes are on by default.
///
/// # Examples
///
/// ```rust
/// use dottrim::trim::TrimOptions;
///
/// let options = TrimOptions::default()
///     .apply_annotations(true)
///     .remove_desktop_security(true);
/// assert!(options.change_visibility);
/// assert!(options.apply_annotations);
/// assert!(!options.ensure_constructors_present);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrimOptions {
    /// Narrow the visibility of elements the policy marks internal (default: `true`).
    pub change_visibility: bool,

    /// Rewrite `SecurityCritical` / `SecuritySafeCritical` annotations to the transparency the
    /// policy requests (default: `false`).
    pub apply_annotations: bool,

    /// Drop `SuppressUnmanagedCodeSecurityAttribute` and legacy link and inheritance demands
    /// (default: `false`).
    pub remove_desktop_security: bool,

    /// Clear `Serializable` / `NotSerialized` flags and drop `NonSerializedAttribute` and
    /// `OptionalFieldAttribute` (default: `false`).
    pub remove_serializability_info: bool,

    /// Give kept classes without an instance constructor a private parameterless one
    /// (default: `false`).
    pub ensure_constructors_present: bool,

    /// Drop all manifest resources (default: `false`).
    pub remove_manifest_resources: bool,
}

impl Default for TrimOptions {
    fn default() -> Self {
        TrimOptions {
            change_visibility: true,
            apply_annotations: false,
            remove_desktop_security: false,
            remove_serializability_info: false,
            ensure_constructors_present: false,
            remove_manifest_resources: false,
        }
    }
}

impl TrimOptions {
    /// Sets [`TrimOptions::change_visibility`].
    #[must_use]
    pub fn change_visibility(mut self, enabled: bool) -> Self {
        self.change_visibility = enabled;
        self
    }

    /// Sets [`TrimOptions::apply_annotations`].
    #[must_use]
    pub fn apply_annotations(mut self, enabled: bool) -> Self {
        self.apply_annotations = enabled;
        self
    }

    /// Sets [`TrimOptions::remove_desktop_security`].
    #[must_use]
    pub fn remove_desktop_security(mut self, enabled: bool) -> Self {
        self.remove_desktop_security = enabled;
        self
    }

    /// Sets [`TrimOptions::remove_serializability_info`].
    #[must_use]
    pub fn remove_serializability_info(mut self, enabled: bool) -> Self {
        self.remove_serializability_info = enabled;
        self
    }

    /// Sets [`TrimOptions::ensure_constructors_present`].
    #[must_use]
    pub fn ensure_constructors_present(mut self, enabled: bool) -> Self {
        self.ensure_constructors_present = enabled;
        self
    }

    /// Sets [`TrimOptions::remove_manifest_resources`].
    #[must_use]
    pub fn remove_manifest_resources(mut self, enabled: bool) -> Self {
        self.remove_manifest_resources = enabled;
        self
    }
}
