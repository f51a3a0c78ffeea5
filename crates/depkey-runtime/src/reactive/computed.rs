#![forbid(unsafe_code)]

//! Cached computed property slots.
//!
//! # Design
//!
//! A [`ComputedProperty`] owns a [`ComputedDescriptor`] and the last value
//! it produced. The owning [`Object`] marks it dirty when a dependency
//! changes; the next read re-runs the bound getter and caches the result.
//!
//! # Invariants
//!
//! 1. The getter runs at most once per dependency change cycle.
//! 2. If nothing was invalidated, a read returns the cached value without
//!    calling user code.
//! 3. Version increments by exactly 1 per recomputation or setter call.
//!
//! # Failure Modes
//!
//! - **Getter panics**: the cached value is left from the last successful
//!   computation and the dirty flag stays set, so the next read retries.
//! - **Self-dependency**: a getter that reads its own key recurses without
//!   bound. Dependency cycles are not detected.

use std::cell::{Cell, RefCell};

use depkey_core::ComputedDescriptor;
use serde_json::Value;

use super::object::Object;
use super::path;

pub(crate) struct ComputedProperty {
    descriptor: ComputedDescriptor<Object, Value>,
    /// Last produced value (None before the first computation).
    cached: RefCell<Option<Value>>,
    dirty: Cell<bool>,
    version: Cell<u64>,
}

impl std::fmt::Debug for ComputedProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputedProperty")
            .field("descriptor", &self.descriptor)
            .field("cached", &self.cached.borrow())
            .field("dirty", &self.dirty.get())
            .field("version", &self.version.get())
            .finish()
    }
}

impl ComputedProperty {
    pub(crate) fn new(descriptor: ComputedDescriptor<Object, Value>) -> Self {
        Self {
            descriptor,
            cached: RefCell::new(None),
            dirty: Cell::new(true), // computed on first read
            version: Cell::new(0),
        }
    }

    /// Current value, recomputing through the getter if stale.
    ///
    /// A property without a getter yields its last set value, or `null`.
    pub(crate) fn value(&self, subject: &Object) -> Value {
        let stale = self.dirty.get() || self.cached.borrow().is_none();
        if stale && let Some(fresh) = self.descriptor.get(subject) {
            self.store(fresh);
            tracing::trace!(
                message = "computed.recompute",
                version = self.version.get()
            );
        }
        self.cached.borrow().clone().unwrap_or(Value::Null)
    }

    /// Run the setter and cache its result as the new value.
    ///
    /// Callers check [`has_setter`](Self::has_setter) first; without a
    /// setter this caches `null`.
    pub(crate) fn assign(&self, subject: &Object, key: &str, value: Value) -> Value {
        let result = self
            .descriptor
            .set(subject, key, value)
            .unwrap_or(Value::Null);
        self.store(result.clone());
        result
    }

    fn store(&self, value: Value) {
        *self.cached.borrow_mut() = Some(value);
        self.dirty.set(false);
        self.version.set(self.version.get() + 1);
    }

    /// Whether a change at `changed` affects any dependent path.
    pub(crate) fn depends_on(&self, changed: &str) -> bool {
        self.descriptor
            .expanded_paths()
            .iter()
            .any(|dependency| path::overlaps(dependency, changed))
    }

    pub(crate) fn invalidate(&self) {
        self.dirty.set(true);
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub(crate) fn version(&self) -> u64 {
        self.version.get()
    }

    pub(crate) fn has_setter(&self) -> bool {
        self.descriptor.has_setter()
    }

    pub(crate) fn descriptor(&self) -> &ComputedDescriptor<Object, Value> {
        &self.descriptor
    }
}
