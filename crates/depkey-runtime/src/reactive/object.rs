#![forbid(unsafe_code)]

//! Observable objects holding plain values and computed properties.
//!
//! # Design
//!
//! [`Object`] keeps its slots in shared, reference-counted storage
//! (`Rc<RefCell<..>>`). A slot is either a plain JSON value or a
//! [`ComputedProperty`]. Reads resolve dotted paths and evaluate computed
//! slots lazily; writes invalidate every computed slot whose dependent paths
//! overlap the written path, transitively, and then notify subscribers.
//!
//! # Performance
//!
//! | Operation     | Complexity                                   |
//! |---------------|----------------------------------------------|
//! | `get()`       | O(depth), plus the getter if stale           |
//! | `set()`       | O(C × D) where C = computed slots, D = deps  |
//! | `subscribe()` | O(1) amortized                               |
//!
//! # Failure Modes
//!
//! - **Writes from a getter**: no borrow is held while user code runs, so a
//!   getter may call `set()`, but the value it returns is cached as fresh
//!   even if the write invalidated it. Getters are expected to be pure reads.
//! - **Subscriber leak**: callbacks whose [`Subscription`] guard is kept
//!   forever accumulate. Dead weak references are pruned during `notify()`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use depkey_core::{ComputedDescriptor, ComputedHost, Handler, PropertyGet, computed};
use serde::Serialize;
use serde_json::{Map, Value};

use super::computed::ComputedProperty;
use super::path;
use crate::config::{RuntimeConfig, SetterFallback};
use crate::error::{Result, RuntimeError};

/// A change callback stored as a strong `Rc` in the [`Subscription`],
/// handed out as `Weak` to the object.
type CallbackRc = Rc<dyn Fn(&str)>;
type CallbackWeak = Weak<dyn Fn(&str)>;

#[derive(Debug, Clone)]
enum Slot {
    Value(Value),
    Computed(Rc<ComputedProperty>),
}

struct ObjectInner {
    slots: AHashMap<String, Slot>,
    version: u64,
    config: RuntimeConfig,
    /// Dead entries are pruned on notify.
    subscribers: Vec<CallbackWeak>,
}

/// A shared object whose properties may be computed from other properties.
///
/// Cloning an `Object` creates a new handle to the **same** slots,
/// subscribers, and caches.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 on each effective write.
/// 2. With `skip_unchanged`, writing a value equal to the current one is a
///    no-op.
/// 3. After a write completes, no computed slot depending on the written
///    path returns a stale value.
/// 4. Subscribers see the written path first, then each invalidated
///    computed key in key order.
pub struct Object {
    inner: Rc<RefCell<ObjectInner>>,
}

impl Clone for Object {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        let mut keys: Vec<&String> = inner.slots.keys().collect();
        keys.sort();
        f.debug_struct("Object")
            .field("keys", &keys)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl Object {
    /// Create an empty object with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create an empty object.
    #[must_use]
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObjectInner {
                slots: AHashMap::new(),
                version: 0,
                config,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Create an object whose plain properties are the fields of `value`.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::NotAnObject`] unless `value` is a JSON object.
    pub fn from_json(value: Value) -> Result<Self> {
        Self::from_json_with_config(value, RuntimeConfig::default())
    }

    /// [`from_json`](Self::from_json) with an explicit configuration.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::NotAnObject`] unless `value` is a JSON object.
    pub fn from_json_with_config(value: Value, config: RuntimeConfig) -> Result<Self> {
        let Value::Object(fields) = value else {
            return Err(RuntimeError::NotAnObject {
                found: path::kind(&value),
            });
        };
        let object = Self::with_config(config);
        object.inner.borrow_mut().slots = fields
            .into_iter()
            .map(|(key, value)| (key, Slot::Value(value)))
            .collect();
        Ok(object)
    }

    /// Create an object from any serializable struct or map.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::Json`] if serialization fails, and
    /// [`RuntimeError::NotAnObject`] if it does not produce a JSON object.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self> {
        Self::from_json(serde_json::to_value(value)?)
    }

    #[must_use]
    pub fn config(&self) -> RuntimeConfig {
        self.inner.borrow().config
    }

    /// Number of effective writes so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Top-level keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.borrow().slots.keys().cloned().collect();
        keys.sort();
        keys
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.borrow().slots.contains_key(key)
    }

    #[must_use]
    pub fn is_computed(&self, key: &str) -> bool {
        self.computed_slot(key).is_some()
    }

    /// Whether the computed property at `key` will recompute on next read.
    /// `None` if `key` is not a computed property.
    #[must_use]
    pub fn is_dirty(&self, key: &str) -> Option<bool> {
        self.computed_slot(key).map(|slot| slot.is_dirty())
    }

    /// How many times the computed property at `key` produced a value.
    /// `None` if `key` is not a computed property.
    #[must_use]
    pub fn computed_version(&self, key: &str) -> Option<u64> {
        self.computed_slot(key).map(|slot| slot.version())
    }

    /// Raw dependent keys of the computed property at `key`.
    #[must_use]
    pub fn dependent_keys(&self, key: &str) -> Option<Vec<String>> {
        self.computed_slot(key)
            .map(|slot| slot.descriptor().dependent_keys().to_vec())
    }

    fn computed_slot(&self, key: &str) -> Option<Rc<ComputedProperty>> {
        match self.inner.borrow().slots.get(key) {
            Some(Slot::Computed(slot)) => Some(Rc::clone(slot)),
            _ => None,
        }
    }

    /// Read `path`. Missing paths read as `null`.
    ///
    /// A path through a computed property evaluates it first (cached until a
    /// dependency changes).
    #[must_use]
    pub fn get(&self, path: &str) -> Value {
        let (head, rest) = path::split_head(path);
        let slot = {
            let inner = self.inner.borrow();
            match inner.slots.get(head) {
                None => return Value::Null,
                Some(Slot::Value(value)) => {
                    return path::lookup(value, rest).cloned().unwrap_or(Value::Null);
                }
                Some(Slot::Computed(slot)) => Rc::clone(slot),
            }
        };
        let value = slot.value(self);
        path::lookup(&value, rest).cloned().unwrap_or(Value::Null)
    }

    /// Write `value` at `path` and return the value now stored there.
    ///
    /// Setting a computed key runs its setter and caches the result. Without
    /// a setter, [`SetterFallback`] decides.
    ///
    /// # Errors
    ///
    /// - [`RuntimeError::InvalidPath`] if a nested write has no container.
    /// - [`RuntimeError::NestedComputed`] for a path below a computed key.
    /// - [`RuntimeError::ReadOnly`] under [`SetterFallback::Reject`].
    pub fn set(&self, path: &str, value: impl Into<Value>) -> Result<Value> {
        let value = value.into();
        let (head, rest) = path::split_head(path);

        if let Some(slot) = self.computed_slot(head) {
            if rest.is_some() {
                return Err(RuntimeError::NestedComputed {
                    key: head.to_owned(),
                    path: path.to_owned(),
                });
            }
            return self.set_computed(head, &slot, value);
        }

        {
            let mut inner = self.inner.borrow_mut();
            let skip_unchanged = inner.config.skip_unchanged;
            match rest {
                None => {
                    if skip_unchanged
                        && let Some(Slot::Value(current)) = inner.slots.get(head)
                        && *current == value
                    {
                        return Ok(value);
                    }
                    inner
                        .slots
                        .insert(head.to_owned(), Slot::Value(value.clone()));
                }
                Some(rest) => {
                    let Some(Slot::Value(root)) = inner.slots.get_mut(head) else {
                        return Err(RuntimeError::InvalidPath {
                            path: path.to_owned(),
                        });
                    };
                    if skip_unchanged && path::lookup(root, Some(rest)) == Some(&value) {
                        return Ok(value);
                    }
                    if !path::assign(root, rest, value.clone()) {
                        return Err(RuntimeError::InvalidPath {
                            path: path.to_owned(),
                        });
                    }
                }
            }
            inner.version += 1;
        }

        self.changed(path, None);
        Ok(value)
    }

    /// Modify the value at `path` in place via a closure, then write it back
    /// through [`set`](Self::set).
    ///
    /// # Errors
    ///
    /// Same as [`set`](Self::set).
    pub fn update(&self, path: &str, f: impl FnOnce(&mut Value)) -> Result<Value> {
        let mut value = self.get(path);
        f(&mut value);
        self.set(path, value)
    }

    fn set_computed(&self, key: &str, slot: &Rc<ComputedProperty>, value: Value) -> Result<Value> {
        if slot.has_setter() {
            let result = slot.assign(self, key, value);
            self.inner.borrow_mut().version += 1;
            tracing::debug!(message = "computed.set", key);
            self.changed(key, Some(key));
            return Ok(result);
        }

        let fallback = self.inner.borrow().config.setter_fallback;
        match fallback {
            SetterFallback::Reject => Err(RuntimeError::ReadOnly {
                key: key.to_owned(),
            }),
            SetterFallback::Override => {
                {
                    let mut inner = self.inner.borrow_mut();
                    inner
                        .slots
                        .insert(key.to_owned(), Slot::Value(value.clone()));
                    inner.version += 1;
                }
                tracing::debug!(message = "computed.override", key);
                self.changed(key, None);
                Ok(value)
            }
        }
    }

    /// Define (or replace) a plain property.
    pub fn define(&self, key: &str, value: impl Into<Value>) {
        {
            let mut inner = self.inner.borrow_mut();
            inner
                .slots
                .insert(key.to_owned(), Slot::Value(value.into()));
            inner.version += 1;
        }
        self.changed(key, None);
    }

    /// Build a computed property from dependent keys and a handler, and
    /// define it under `key`.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::Computed`] if the descriptor cannot be built.
    pub fn define_with<I, K>(&self, key: &str, dependent_keys: I, handler: Handler<Self, Value>) -> Result<()>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let descriptor = computed(dependent_keys, handler)?;
        self.define_computed(key, descriptor);
        Ok(())
    }

    /// Subscribe to changes. The callback receives each written path and
    /// each computed key invalidated by the write.
    ///
    /// Returns a [`Subscription`] guard. Dropping the guard unsubscribes the
    /// callback.
    pub fn subscribe(&self, callback: impl Fn(&str) + 'static) -> Subscription {
        let strong: CallbackRc = Rc::new(callback);
        let weak = Rc::downgrade(&strong);
        self.inner.borrow_mut().subscribers.push(weak);
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Number of registered subscribers, including dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Snapshot every property, evaluating computed ones.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for key in self.keys() {
            let value = self.get(&key);
            map.insert(key, value);
        }
        Value::Object(map)
    }

    /// Invalidate dependents of `path` and notify subscribers.
    fn changed(&self, path: &str, skip: Option<&str>) {
        let invalidated = self.invalidate_dependents(path, skip);
        tracing::debug!(
            message = "object.invalidate",
            path,
            invalidated = ?invalidated
        );
        self.notify(path);
        for key in &invalidated {
            self.notify(key);
        }
    }

    /// Mark dirty every computed slot depending on `path`, then everything
    /// depending on those, and so on. Returns the invalidated keys.
    fn invalidate_dependents(&self, path: &str, skip: Option<&str>) -> Vec<String> {
        let mut computed: Vec<(String, Rc<ComputedProperty>)> = self
            .inner
            .borrow()
            .slots
            .iter()
            .filter_map(|(key, slot)| match slot {
                Slot::Computed(slot) => Some((key.clone(), Rc::clone(slot))),
                Slot::Value(_) => None,
            })
            .collect();
        computed.sort_by(|a, b| a.0.cmp(&b.0));

        let mut invalidated: Vec<String> = Vec::new();
        let mut queue = vec![path.to_owned()];
        while let Some(changed) = queue.pop() {
            for (key, slot) in &computed {
                if skip == Some(key.as_str()) || invalidated.contains(key) {
                    continue;
                }
                if slot.depends_on(&changed) {
                    slot.invalidate();
                    invalidated.push(key.clone());
                    queue.push(key.clone());
                }
            }
        }
        invalidated.sort();
        invalidated
    }

    /// Notify live subscribers and prune dead ones.
    fn notify(&self, path: &str) {
        // Collect first so no borrow is held while callbacks run.
        let callbacks: Vec<CallbackRc> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            inner
                .subscribers
                .iter()
                .filter_map(|w| w.upgrade())
                .collect()
        };
        for cb in &callbacks {
            cb(path);
        }
    }
}

impl PropertyGet for Object {
    type Value = Value;

    fn get_property(&self, path: &str) -> Value {
        self.get(path)
    }
}

impl ComputedHost for Object {
    type Output = ();

    fn define_computed(&self, key: &str, descriptor: ComputedDescriptor<Self, Value>) {
        tracing::debug!(
            message = "computed.define",
            key,
            dependent_keys = ?descriptor.dependent_keys(),
            expanded = ?descriptor.expanded_paths()
        );
        {
            let mut inner = self.inner.borrow_mut();
            inner.slots.insert(
                key.to_owned(),
                Slot::Computed(Rc::new(ComputedProperty::new(descriptor))),
            );
            inner.version += 1;
        }
        self.changed(key, Some(key));
    }
}

/// RAII guard for a change callback.
///
/// Dropping the `Subscription` drops the strong `Rc` behind the callback;
/// the `Weak` left in the object's subscriber list fails to upgrade on the
/// next notification and is pruned.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
