//! Build filters deciding which policy elements apply to the build being trimmed.
//!
//! `<Type>`, `<TypeForwarder>` and `<Member>` elements may restrict themselves to some builds
//! with `Platform`, `Architecture` and `Flavor` attributes (comma separated lists) and a
//! `Condition` expression over build symbols. An element the predicate rejects is skipped
//! together with everything nested below it.

use crate::{policy::ConditionEvaluator, Error, Result};

/// Decides from an element's filter attributes whether the element applies.
pub trait IncludePredicate {
    /// `true` if an element with these attribute values belongs to the build.
    ///
    /// # Errors
    /// Returns an error if `condition` cannot be evaluated.
    fn include(
        &self,
        platform: Option<&str>,
        architecture: Option<&str>,
        flavor: Option<&str>,
        condition: Option<&str>,
    ) -> Result<bool>;
}

/// Accepts every element.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeAll;

impl IncludePredicate for IncludeAll {
    fn include(
        &self,
        _platform: Option<&str>,
        _architecture: Option<&str>,
        _flavor: Option<&str>,
        _condition: Option<&str>,
    ) -> Result<bool> {
        Ok(true)
    }
}

/// Filters elements against one concrete build.
///
/// An unset dimension accepts every element, and so does an element without the matching
/// attribute. Conditions are only evaluated when defines were configured.
///
/// # Examples
///
/// ```rust
/// use dottrim::policy::{BuildFilter, IncludePredicate};
///
/// let filter = BuildFilter::new()
///     .platform("win")
///     .architecture("amd64")
///     .defines("FEATURE_COMINTEROP");
///
/// assert!(filter.include(Some("unix,win"), None, None, None)?);
/// assert!(!filter.include(None, Some("x86,arm"), None, None)?);
/// assert!(filter.include(None, None, Some("chk"), Some("FEATURE_COMINTEROP"))?);
/// # Ok::<(), dottrim::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct BuildFilter {
    platform: Option<String>,
    architecture: Option<String>,
    flavor: Option<String>,
    defines: Option<ConditionEvaluator>,
}

impl BuildFilter {
    /// A filter that accepts everything until dimensions are configured
    #[must_use]
    pub fn new() -> Self {
        BuildFilter::default()
    }

    /// Target platform; an empty value leaves the dimension unset
    #[must_use]
    pub fn platform(mut self, platform: &str) -> Self {
        self.platform = non_empty(platform);
        self
    }

    /// Target architecture; an empty value leaves the dimension unset
    #[must_use]
    pub fn architecture(mut self, architecture: &str) -> Self {
        self.architecture = non_empty(architecture);
        self
    }

    /// Build flavor; an empty value leaves the dimension unset
    #[must_use]
    pub fn flavor(mut self, flavor: &str) -> Self {
        self.flavor = non_empty(flavor);
        self
    }

    /// `;`-separated build symbols. An empty value disables condition evaluation.
    #[must_use]
    pub fn defines(mut self, defines: &str) -> Self {
        self.defines = non_empty(defines).map(|defines| ConditionEvaluator::from_defines(&defines));
        self
    }
}

impl IncludePredicate for BuildFilter {
    fn include(
        &self,
        platform: Option<&str>,
        architecture: Option<&str>,
        flavor: Option<&str>,
        condition: Option<&str>,
    ) -> Result<bool> {
        if let (Some(evaluator), Some(condition)) = (&self.defines, condition) {
            if !evaluator.evaluate(condition)? {
                return Ok(false);
            }
        }

        Ok(matches(self.platform.as_deref(), platform)
            && matches(self.architecture.as_deref(), architecture)
            && matches(self.flavor.as_deref(), flavor))
    }
}

impl<P: IncludePredicate + ?Sized> IncludePredicate for &P {
    fn include(
        &self,
        platform: Option<&str>,
        architecture: Option<&str>,
        flavor: Option<&str>,
        condition: Option<&str>,
    ) -> Result<bool> {
        (**self).include(platform, architecture, flavor, condition)
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn matches(configured: Option<&str>, element: Option<&str>) -> bool {
    match (configured, element) {
        (Some(configured), Some(element)) => element.split(',').any(|item| item == configured),
        _ => true,
    }
}

/// Wraps a condition failure into the error reported for the enclosing document.
pub(crate) fn into_policy_error(error: Error) -> Error {
    match error {
        Error::Condition { .. } => Error::PolicyParse(error.to_string()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn include_all() {
        assert!(IncludeAll
            .include(Some("x"), Some("y"), Some("z"), Some("&& nonsense"))
            .unwrap());
    }

    #[test]
    fn unset_dimensions_accept() {
        let filter = BuildFilter::new().platform("").architecture("").flavor("");
        assert!(filter
            .include(Some("unix"), Some("arm"), Some("chk"), Some("NOT_EVALUATED &&"))
            .unwrap());
    }

    #[test]
    fn lists() {
        let filter = BuildFilter::new().platform("win").flavor("ret");
        assert!(filter.include(Some("win"), None, None, None).unwrap());
        assert!(filter.include(Some("unix,win"), None, Some("chk,ret"), None).unwrap());
        assert!(!filter.include(Some("unix"), None, None, None).unwrap());
        assert!(!filter.include(Some("windows"), None, None, None).unwrap());
        assert!(!filter.include(None, None, Some("chk"), None).unwrap());
    }

    #[test]
    fn conditions() {
        let filter = BuildFilter::new().defines("FEATURE_A;FEATURE_B");
        assert!(filter.include(None, None, None, Some("FEATURE_A")).unwrap());
        assert!(!filter.include(None, None, None, Some("not FEATURE_B")).unwrap());
        assert!(filter.include(None, None, None, None).unwrap());

        match filter.include(None, None, None, Some("FEATURE_A || FEATURE_B")) {
            Err(Error::Condition { .. }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn condition_errors_become_policy_errors() {
        let error = BuildFilter::new()
            .defines("A")
            .include(None, None, None, Some("A ="))
            .unwrap_err();
        match into_policy_error(error) {
            Error::PolicyParse(message) => assert_eq!(message, "Illegal character: '=': 'A ='"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
