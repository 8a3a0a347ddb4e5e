//! Matching rules deciding which calls the advice observes.
//!
//! Both rules are evaluated per call against the call's [`MethodSignature`];
//! nothing is precomputed or scanned ahead of time.

use crate::signature::{Marker, MethodSignature};

/// A rule selecting calls by their signature.
pub trait Pointcut: Send + Sync {
    fn matches(&self, method: &MethodSignature) -> bool;
}

/// Selects public methods whose declaring type lives under a path prefix.
///
/// Matching is segment aware: `billing` matches `billing::Invoice` and
/// `billing` itself but not `billingx::Invoice`. A prefix ending in `::` is
/// matched literally and an empty prefix matches every public method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceRule {
    prefix: String,
}

impl NamespaceRule {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn in_namespace(&self, path: &str) -> bool {
        if self.prefix.is_empty() || self.prefix.ends_with("::") {
            return path.starts_with(&self.prefix);
        }
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with("::") || rest.starts_with('<'),
            None => false,
        }
    }
}

impl Pointcut for NamespaceRule {
    fn matches(&self, method: &MethodSignature) -> bool {
        method.is_public() && self.in_namespace(method.declaring_type)
    }
}

/// Selects methods carrying a [`Marker`], regardless of namespace or visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerRule;

impl MarkerRule {
    /// The marker of `method`, if the rule selects it.
    pub fn marker_of(self, method: &MethodSignature) -> Option<Marker> {
        method.marker
    }
}

impl Pointcut for MarkerRule {
    fn matches(&self, method: &MethodSignature) -> bool {
        method.marker.is_some()
    }
}
