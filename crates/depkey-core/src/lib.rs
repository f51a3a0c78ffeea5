#![forbid(unsafe_code)]

//! Core: dependent-key expansion and argument binding for computed properties.
//!
//! A computed property declares the keys it depends on (`"first"`,
//! `"attr.{foo,bar}"`, `"models.@each.name"`, `"models.[]"`). This crate
//! expands those declarations into concrete paths once, at definition time,
//! and wraps the user's getter/setter so that every invocation receives the
//! current values of those paths as positional arguments.
//!
//! The host object model is injected through the traits in [`host`]; the
//! host keeps responsibility for caching, invalidation, and notification.
//!
//! - [`pattern`]: brace expansion (`a.{b,c}` → `a.b`, `a.c`).
//! - [`expand`]: the dependent-key expander producing [`ExpandedPaths`].
//! - [`bind`]: getter/setter wrappers that resolve dependent values.
//! - [`descriptor`]: [`Handler`] dispatch and [`ComputedDescriptor`] building.

pub mod bind;
pub mod descriptor;
pub mod error;
pub mod expand;
pub mod host;
mod macros;
pub mod pattern;

pub use bind::{BoundGetter, BoundSetter, bind_get, bind_set, resolve_values};
pub use descriptor::{ComputedDescriptor, Handler, build, computed};
pub use error::{ComputedError, ExpandError, Result};
pub use expand::{ExpandedPaths, expand_dependent_keys};
pub use host::{ComputedHost, PropertyExpander, PropertyGet};
pub use pattern::{BraceExpander, ExpandOptions, expand_properties};
