#![forbid(unsafe_code)]

//! Runtime: an observable object model hosting computed properties.
//!
//! [`Object`] stores JSON properties and computed slots built with
//! `depkey-core`. Reads evaluate computed slots lazily; writes invalidate
//! the slots whose dependent paths overlap the written path.
//!
//! ```
//! use depkey_core::Handler;
//! use depkey_runtime::Object;
//! use serde_json::{Value, json};
//!
//! let person = Object::from_json(json!({ "first": "rob", "last": "jackson" }))?;
//! person.define_with(
//!     "name",
//!     ["first", "last"],
//!     Handler::getter(|_: &Object, deps: &[Value]| {
//!         let parts: Vec<&str> = deps.iter().filter_map(Value::as_str).collect();
//!         Value::from(parts.join(" "))
//!     }),
//! )?;
//!
//! assert_eq!(person.get("name"), json!("rob jackson"));
//! person.set("first", "al")?;
//! assert_eq!(person.get("name"), json!("al jackson"));
//! # Ok::<(), depkey_runtime::RuntimeError>(())
//! ```

pub mod config;
pub mod error;
pub mod reactive;

pub use config::{RuntimeConfig, SetterFallback};
pub use error::{Result, RuntimeError};
pub use reactive::{Object, Subscription};
