#![forbid(unsafe_code)]

//! Capabilities required from the host object model.
//!
//! The expander and binder never touch storage directly. A host plugs in by
//! implementing:
//!
//! - [`PropertyGet`] on its subject type, resolving (possibly dotted) paths.
//! - [`PropertyExpander`] for brace expansion. [`BraceExpander`] is the
//!   stock implementation; any `Fn(&str) -> Result<Vec<String>, ExpandError>`
//!   also qualifies, which keeps stub hosts in tests short.
//! - [`ComputedHost`] to accept finished descriptors. Caching and
//!   invalidation are the host's business.
//!
//! [`BraceExpander`]: crate::pattern::BraceExpander

use crate::descriptor::ComputedDescriptor;
use crate::error::ExpandError;

/// Path resolution against a subject object.
pub trait PropertyGet {
    /// Value type returned for any path.
    type Value;

    /// Resolve `path` against `self`.
    ///
    /// Paths may be dotted (`"attr.models"`). Reading a path that names a
    /// computed property is expected to evaluate it.
    fn get_property(&self, path: &str) -> Self::Value;
}

/// Brace expansion of a single dependent-key pattern.
pub trait PropertyExpander {
    /// Expand `pattern` into zero or more concrete paths, in order.
    fn expand_properties(&self, pattern: &str) -> Result<Vec<String>, ExpandError>;
}

impl<F> PropertyExpander for F
where
    F: Fn(&str) -> Result<Vec<String>, ExpandError>,
{
    fn expand_properties(&self, pattern: &str) -> Result<Vec<String>, ExpandError> {
        self(pattern)
    }
}

/// A host that turns descriptors into live computed properties.
pub trait ComputedHost: PropertyGet + Sized {
    /// What defining a property yields (a handle, a `Result`, or `()`).
    type Output;

    /// Register `descriptor` under `key`.
    ///
    /// The descriptor carries both the raw dependent keys and their
    /// expansion; which one drives dependency tracking is up to the host.
    fn define_computed(
        &self,
        key: &str,
        descriptor: ComputedDescriptor<Self, Self::Value>,
    ) -> Self::Output;
}
