#![forbid(unsafe_code)]

//! Observable objects with cached computed properties.
//!
//! - [`Object`]: A shared, version-tracked bag of JSON properties, some of
//!   which may be computed from others.
//! - [`Subscription`]: RAII guard that automatically unsubscribes on drop.
//!
//! # Architecture
//!
//! `Object` uses `Rc<RefCell<..>>` for single-threaded shared ownership and
//! implements [`depkey_core::ComputedHost`], so descriptors built by
//! `depkey-core` install directly on it. Each computed slot caches its last
//! value and a dirty flag; writes mark overlapping slots dirty and the next
//! read recomputes.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per effective write.
//! 2. Subscribers are notified in registration order.
//! 3. A computed getter runs at most once between two invalidations.
//! 4. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.
//! 5. `Object::get()` never returns a stale computed value.

mod computed;
pub mod object;
mod path;

pub use object::{Object, Subscription};
