#![forbid(unsafe_code)]

//! Computed property descriptors.
//!
//! # Design
//!
//! A user hands over a list of dependent keys and a [`Handler`]: either a
//! single getter or a get/set pair. [`build`] expands the keys once, binds
//! each supplied function over the same [`ExpandedPaths`], and returns a
//! [`ComputedDescriptor`] for the host to register.
//!
//! # Invariants
//!
//! 1. The expanded path list is computed exactly once per descriptor and
//!    never changes afterwards.
//! 2. Getter and setter of one descriptor see the same dependent values,
//!    in the same order.
//! 3. The raw dependent keys are kept verbatim for the host.

use std::rc::Rc;

use crate::bind::{BoundGetter, BoundSetter, bind_get, bind_set};
use crate::error::{ComputedError, Result};
use crate::expand::{ExpandedPaths, expand_dependent_keys};
use crate::host::{ComputedHost, PropertyExpander, PropertyGet};
use crate::pattern::BraceExpander;

/// User getter: `(subject, dependent_values) -> R`.
pub type UserGetter<S, R> = Rc<dyn Fn(&S, &[<S as PropertyGet>::Value]) -> R>;

/// User setter: `(subject, new_value, dependent_values) -> R`.
pub type UserSetter<S, R> =
    Rc<dyn Fn(&S, <S as PropertyGet>::Value, &[<S as PropertyGet>::Value]) -> R>;

/// The user-supplied half of a computed property.
pub enum Handler<S: PropertyGet, R> {
    /// Getter-only property.
    Getter(UserGetter<S, R>),
    /// Explicit get/set pair; either side may be absent, not both.
    GetSet {
        get: Option<UserGetter<S, R>>,
        set: Option<UserSetter<S, R>>,
    },
}

impl<S: PropertyGet + 'static, R: 'static> Handler<S, R> {
    /// Getter-only handler.
    #[must_use]
    pub fn getter(get: impl Fn(&S, &[S::Value]) -> R + 'static) -> Self {
        Self::Getter(Rc::new(get))
    }

    /// Empty get/set handler, to be filled with [`with_get`](Self::with_get)
    /// and [`with_set`](Self::with_set).
    #[must_use]
    pub fn get_set() -> Self {
        Self::GetSet {
            get: None,
            set: None,
        }
    }

    /// Supply the getter. A getter-only handler is replaced.
    #[must_use]
    pub fn with_get(self, get: impl Fn(&S, &[S::Value]) -> R + 'static) -> Self {
        let get: UserGetter<S, R> = Rc::new(get);
        match self {
            Self::Getter(_) => Self::GetSet {
                get: Some(get),
                set: None,
            },
            Self::GetSet { set, .. } => Self::GetSet {
                get: Some(get),
                set,
            },
        }
    }

    /// Supply the setter. A getter-only handler keeps its getter.
    #[must_use]
    pub fn with_set(self, set: impl Fn(&S, S::Value, &[S::Value]) -> R + 'static) -> Self {
        let set: UserSetter<S, R> = Rc::new(set);
        match self {
            Self::Getter(get) => Self::GetSet {
                get: Some(get),
                set: Some(set),
            },
            Self::GetSet { get, .. } => Self::GetSet {
                get,
                set: Some(set),
            },
        }
    }
}

impl<S: PropertyGet, R> Clone for Handler<S, R> {
    fn clone(&self) -> Self {
        match self {
            Self::Getter(get) => Self::Getter(Rc::clone(get)),
            Self::GetSet { get, set } => Self::GetSet {
                get: get.clone(),
                set: set.clone(),
            },
        }
    }
}

impl<S: PropertyGet, R> std::fmt::Debug for Handler<S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Getter(_) => f.write_str("Handler::Getter"),
            Self::GetSet { get, set } => f
                .debug_struct("Handler::GetSet")
                .field("get", &get.is_some())
                .field("set", &set.is_some())
                .finish(),
        }
    }
}

/// A computed property ready to be registered with a host.
///
/// Cloning shares the bound functions and the expanded path list.
pub struct ComputedDescriptor<S: PropertyGet, R> {
    dependent_keys: Vec<String>,
    expanded: ExpandedPaths,
    get: Option<BoundGetter<S, R>>,
    set: Option<BoundSetter<S, R>>,
}

impl<S: PropertyGet, R> Clone for ComputedDescriptor<S, R> {
    fn clone(&self) -> Self {
        Self {
            dependent_keys: self.dependent_keys.clone(),
            expanded: self.expanded.clone(),
            get: self.get.clone(),
            set: self.set.clone(),
        }
    }
}

impl<S: PropertyGet, R> std::fmt::Debug for ComputedDescriptor<S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputedDescriptor")
            .field("dependent_keys", &self.dependent_keys)
            .field("expanded", &self.expanded)
            .field("get", &self.get.is_some())
            .field("set", &self.set.is_some())
            .finish()
    }
}

impl<S: PropertyGet, R> ComputedDescriptor<S, R> {
    /// Dependent keys exactly as declared.
    #[must_use]
    pub fn dependent_keys(&self) -> &[String] {
        &self.dependent_keys
    }

    /// Concrete paths whose values are passed to user code, in argument order.
    #[must_use]
    pub fn expanded_paths(&self) -> &ExpandedPaths {
        &self.expanded
    }

    #[must_use]
    pub fn has_getter(&self) -> bool {
        self.get.is_some()
    }

    #[must_use]
    pub fn has_setter(&self) -> bool {
        self.set.is_some()
    }

    #[must_use]
    pub fn getter(&self) -> Option<&BoundGetter<S, R>> {
        self.get.as_ref()
    }

    #[must_use]
    pub fn setter(&self) -> Option<&BoundSetter<S, R>> {
        self.set.as_ref()
    }

    /// Run the bound getter, if any.
    pub fn get(&self, subject: &S) -> Option<R> {
        self.get.as_ref().map(|get| get(subject))
    }

    /// Run the bound setter, if any.
    pub fn set(&self, subject: &S, key: &str, value: S::Value) -> Option<R> {
        self.set.as_ref().map(|set| set(subject, key, value))
    }
}

impl<S: ComputedHost> ComputedDescriptor<S, S::Value> {
    /// Register this descriptor on `host` under `key`.
    pub fn install(self, host: &S, key: &str) -> S::Output {
        host.define_computed(key, self)
    }
}

/// Build a descriptor, expanding `dependent_keys` with `expander`.
///
/// # Errors
///
/// [`ComputedError::Expand`] if a key fails to expand, and
/// [`ComputedError::EmptyHandler`] for a get/set handler with neither side.
pub fn build<S, R, E, I, K>(
    expander: &E,
    dependent_keys: I,
    handler: Handler<S, R>,
) -> Result<ComputedDescriptor<S, R>>
where
    S: PropertyGet + 'static,
    R: 'static,
    E: PropertyExpander + ?Sized,
    I: IntoIterator<Item = K>,
    K: Into<String>,
{
    let dependent_keys: Vec<String> = dependent_keys.into_iter().map(Into::into).collect();
    let expanded = expand_dependent_keys(expander, &dependent_keys)?;

    let (get, set) = match handler {
        Handler::Getter(user) => (Some(bind_user_get(&expanded, user)), None),
        Handler::GetSet {
            get: None,
            set: None,
        } => return Err(ComputedError::EmptyHandler),
        Handler::GetSet { get, set } => (
            get.map(|user| bind_user_get(&expanded, user)),
            set.map(|user| bind_user_set(&expanded, user)),
        ),
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(
        message = "computed.build",
        keys = ?dependent_keys,
        expanded = ?expanded,
        get = get.is_some(),
        set = set.is_some()
    );

    Ok(ComputedDescriptor {
        dependent_keys,
        expanded,
        get,
        set,
    })
}

/// [`build`] with the default strict [`BraceExpander`].
///
/// # Errors
///
/// Same as [`build`].
pub fn computed<S, R, I, K>(dependent_keys: I, handler: Handler<S, R>) -> Result<ComputedDescriptor<S, R>>
where
    S: PropertyGet + 'static,
    R: 'static,
    I: IntoIterator<Item = K>,
    K: Into<String>,
{
    build(&BraceExpander::default(), dependent_keys, handler)
}

fn bind_user_get<S, R>(paths: &ExpandedPaths, user: UserGetter<S, R>) -> BoundGetter<S, R>
where
    S: PropertyGet + 'static,
    R: 'static,
{
    bind_get(paths.clone(), move |subject: &S, values: &[S::Value]| {
        user(subject, values)
    })
}

fn bind_user_set<S, R>(paths: &ExpandedPaths, user: UserSetter<S, R>) -> BoundSetter<S, R>
where
    S: PropertyGet + 'static,
    R: 'static,
{
    bind_set(
        paths.clone(),
        move |subject: &S, value: S::Value, values: &[S::Value]| user(subject, value, values),
    )
}
