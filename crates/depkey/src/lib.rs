#![forbid(unsafe_code)]

//! depkey public facade crate.
//!
//! Declare computed properties by their dependent keys (`"first"`,
//! `"attr.{foo,bar}"`, `"models.@each.name"`, `"models.[]"`) and a getter or
//! get/set pair. The `runtime` feature (on by default) adds an observable
//! JSON object model that hosts them.

pub use depkey_core::computed;

pub mod prelude {
    pub use depkey_core as core;
    pub use depkey_core::{ComputedDescriptor, ComputedHost, Handler, PropertyGet};
    #[cfg(feature = "runtime")]
    pub use depkey_runtime as runtime;
    #[cfg(feature = "runtime")]
    pub use depkey_runtime::{Object, RuntimeConfig, SetterFallback};
}
