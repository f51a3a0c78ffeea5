#![forbid(unsafe_code)]

//! Dependent-key expansion.
//!
//! Turns the dependent keys declared on a computed property into the
//! ordered list of concrete paths whose values are handed to user code.
//!
//! | Declared key             | Expanded path(s)      |
//! |--------------------------|-----------------------|
//! | `first`                  | `first`               |
//! | `attr.models.@each.name` | `attr.models`         |
//! | `attr.@each.{foo,bar}`   | `attr`                |
//! | `models.[]`              | `models`              |
//! | `attr.{foo,bar}`         | `attr.foo`, `attr.bar`|
//!
//! `@each` and `[]` keys collapse to the collection itself; anything else
//! goes through the injected [`PropertyExpander`]. Keys contribute their
//! expansion in place, left to right, without deduplication.

use std::ops::Deref;
use std::rc::Rc;

use crate::error::ExpandError;
use crate::host::PropertyExpander;

const EACH_MARKER: &str = ".@each";
const ARRAY_MARKER: &str = "[]";

/// Immutable, ordered list of expanded dependent paths.
///
/// Cloning is O(1) and shares the same list. The order is the positional
/// argument order seen by user getters and setters.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct ExpandedPaths {
    paths: Rc<[String]>,
}

impl ExpandedPaths {
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.paths
    }
}

impl Deref for ExpandedPaths {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.paths
    }
}

impl From<Vec<String>> for ExpandedPaths {
    fn from(paths: Vec<String>) -> Self {
        Self {
            paths: paths.into(),
        }
    }
}

impl<'a> IntoIterator for &'a ExpandedPaths {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

impl std::fmt::Debug for ExpandedPaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.paths.iter()).finish()
    }
}

/// Expand `keys` in order.
///
/// The only error source is `expander`; `@each` and `[]` keys never reach it.
///
/// ```
/// use depkey_core::{BraceExpander, expand_dependent_keys};
///
/// let paths = expand_dependent_keys(
///     &BraceExpander::default(),
///     ["first", "attr.{foo,bar}", "todos.@each.done", "tags.[]"],
/// )
/// .unwrap();
/// assert_eq!(paths.as_slice(), ["first", "attr.foo", "attr.bar", "todos", "tags"]);
/// ```
pub fn expand_dependent_keys<E, I, K>(expander: &E, keys: I) -> Result<ExpandedPaths, ExpandError>
where
    E: PropertyExpander + ?Sized,
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    let mut expanded = Vec::new();
    for key in keys {
        let key = key.as_ref();
        if let Some(idx) = key.find(EACH_MARKER) {
            expanded.push(key[..idx].to_owned());
        } else if let Some(stem) = key.strip_suffix(ARRAY_MARKER) {
            expanded.push(stem.strip_suffix('.').unwrap_or(stem).to_owned());
        } else {
            expanded.extend(expander.expand_properties(key)?);
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!(message = "computed.expand", paths = ?expanded);

    Ok(ExpandedPaths::from(expanded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::BraceExpander;
    use std::cell::RefCell;

    fn expand(keys: &[&str]) -> Vec<String> {
        expand_dependent_keys(&BraceExpander::default(), keys)
            .unwrap()
            .to_vec()
    }

    #[test]
    fn empty_input_expands_to_nothing() {
        assert!(expand(&[]).is_empty());
    }

    #[test]
    fn plain_keys_pass_through() {
        assert_eq!(expand(&["first", "last"]), vec!["first", "last"]);
        assert_eq!(expand(&["attr.foo"]), vec!["attr.foo"]);
    }

    #[test]
    fn each_key_collapses_to_collection() {
        assert_eq!(expand(&["attr.models.@each.name"]), vec!["attr.models"]);
        assert_eq!(expand(&["attr.@each.{foo,bar}"]), vec!["attr"]);
    }

    #[test]
    fn array_key_collapses_to_collection() {
        assert_eq!(expand(&["models.[]"]), vec!["models"]);
        assert_eq!(expand(&["attr.models.[]"]), vec!["attr.models"]);
        assert_eq!(expand(&["models[]"]), vec!["models"]);
    }

    #[test]
    fn brace_keys_expand_in_place() {
        assert_eq!(
            expand(&["a", "attr.{foo,bar}", "z"]),
            vec!["a", "attr.foo", "attr.bar", "z"]
        );
    }

    #[test]
    fn duplicates_are_kept() {
        assert_eq!(
            expand(&["a", "{a,b}", "a.[]"]),
            vec!["a", "a", "b", "a"]
        );
    }

    #[test]
    fn marker_keys_never_reach_the_expander() {
        let seen = RefCell::new(Vec::new());
        let stub = |pattern: &str| -> Result<Vec<String>, ExpandError> {
            seen.borrow_mut().push(pattern.to_owned());
            Ok(vec![pattern.to_owned()])
        };
        let paths = expand_dependent_keys(&stub, ["a.@each.b", "c.[]", "d.{e,f}"]).unwrap();
        assert_eq!(paths.as_slice(), ["a", "c", "d.{e,f}"]);
        assert_eq!(*seen.borrow(), vec!["d.{e,f}"]);
    }

    #[test]
    fn expander_may_yield_nothing() {
        let stub = |_: &str| -> Result<Vec<String>, ExpandError> { Ok(Vec::new()) };
        let paths = expand_dependent_keys(&stub, ["a", "b.[]"]).unwrap();
        assert_eq!(paths.as_slice(), ["b"]);
    }

    #[test]
    fn expander_errors_propagate() {
        let err = expand_dependent_keys(&BraceExpander::default(), ["ok", "a.{b"]).unwrap_err();
        assert_eq!(err.pattern(), "a.{b");
    }

    #[test]
    fn clones_share_storage() {
        let paths = expand_dependent_keys(&BraceExpander::default(), ["a", "b"]).unwrap();
        let copy = paths.clone();
        assert!(std::ptr::eq(paths.as_slice(), copy.as_slice()));
        assert_eq!(format!("{copy:?}"), r#"["a", "b"]"#);
    }

    #[test]
    fn iterates_by_reference() {
        let paths = ExpandedPaths::from(vec!["x".to_owned(), "y".to_owned()]);
        let joined: Vec<&str> = (&paths).into_iter().map(String::as_str).collect();
        assert_eq!(joined, ["x", "y"]);
        assert_eq!(paths.len(), 2);
    }
}
