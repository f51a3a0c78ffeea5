#![forbid(unsafe_code)]

//! Runtime configuration.

use std::env;
use std::str::FromStr;

use crate::error::RuntimeError;

/// What `set` does on a computed property that has no setter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SetterFallback {
    /// Replace the computed property with the plain value.
    #[default]
    Override,
    /// Fail with [`RuntimeError::ReadOnly`].
    Reject,
}

impl FromStr for SetterFallback {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("override") {
            Ok(Self::Override)
        } else if s.eq_ignore_ascii_case("reject") {
            Ok(Self::Reject)
        } else {
            Err(RuntimeError::InvalidConfig {
                name: "setter_fallback",
                value: s.to_owned(),
            })
        }
    }
}

/// Configuration for an [`Object`](crate::Object).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Behavior when setting a computed property without a setter.
    pub setter_fallback: SetterFallback,
    /// Treat setting a plain value equal to the current one as a no-op
    /// (no version bump, no invalidation, no notification).
    pub skip_unchanged: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            setter_fallback: SetterFallback::Override,
            skip_unchanged: true,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by `DEPKEY_SETTER_FALLBACK` (`override` | `reject`)
    /// and `DEPKEY_SKIP_UNCHANGED` (`1`/`true` or `0`/`false`).
    ///
    /// Unparseable values are ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// [`from_env`](Self::from_env) with an arbitrary variable source.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(val) = lookup("DEPKEY_SETTER_FALLBACK")
            && let Ok(fallback) = val.parse()
        {
            config.setter_fallback = fallback;
        }
        if let Some(val) = lookup("DEPKEY_SKIP_UNCHANGED") {
            if val == "1" || val.eq_ignore_ascii_case("true") {
                config.skip_unchanged = true;
            } else if val == "0" || val.eq_ignore_ascii_case("false") {
                config.skip_unchanged = false;
            }
        }
        config
    }

    #[must_use]
    pub fn with_setter_fallback(mut self, fallback: SetterFallback) -> Self {
        self.setter_fallback = fallback;
        self
    }

    #[must_use]
    pub fn with_skip_unchanged(mut self, enabled: bool) -> Self {
        self.skip_unchanged = enabled;
        self
    }
}
