#![forbid(unsafe_code)]

//! Brace expansion for dependent-key patterns.
//!
//! # Grammar
//!
//! A pattern is a dotted path in which any number of non-nested
//! `{alt,alt,...}` groups may appear. Each group is distributed over the
//! rest of the pattern:
//!
//! | Pattern            | Expansion                               |
//! |--------------------|-----------------------------------------|
//! | `a.b`              | `a.b`                                   |
//! | `a.{b,c}`          | `a.b`, `a.c`                            |
//! | `a.{b,c}.{d,e}`    | `a.b.d`, `a.b.e`, `a.c.d`, `a.c.e`      |
//! | `a.{b,}`           | `a.b`, `a.`                             |
//! | `a.@each`          | `a.[]`                                  |
//!
//! # Invariants
//!
//! 1. Output order follows the written order; the leftmost group varies
//!    slowest.
//! 2. A pattern without `{` expands to exactly one path.
//! 3. Each output path ending in `.@each` is rewritten to end in `.[]`.
//!
//! # Failure Modes
//!
//! In strict mode (the default) a space, a nested group, a stray `}` or an
//! unclosed `{` is an [`ExpandError`]. Lax mode skips validation and hands
//! a malformed pattern back verbatim.

use crate::error::ExpandError;
use crate::host::PropertyExpander;

const EACH_SUFFIX: &str = ".@each";
const ARRAY_SUFFIX: &str = ".[]";

/// Options for [`expand_properties`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Reject spaces and unbalanced or nested braces.
    pub strict: bool,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self { strict: true }
    }
}

impl ExpandOptions {
    /// Validating options (the default).
    #[must_use]
    pub fn strict() -> Self {
        Self::default()
    }

    /// Non-validating options: malformed patterns pass through unchanged.
    #[must_use]
    pub fn lax() -> Self {
        Self { strict: false }
    }

    /// Toggle validation.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// A piece of a validated pattern.
#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Group(Vec<&'a str>),
}

/// Expand every brace group in `pattern`.
///
/// ```
/// use depkey_core::pattern::{ExpandOptions, expand_properties};
///
/// let paths = expand_properties("user.{first,last}", &ExpandOptions::default()).unwrap();
/// assert_eq!(paths, vec!["user.first", "user.last"]);
/// ```
pub fn expand_properties(
    pattern: &str,
    options: &ExpandOptions,
) -> Result<Vec<String>, ExpandError> {
    if options.strict {
        if pattern.contains(' ') {
            return Err(ExpandError::ContainsSpace {
                pattern: pattern.to_owned(),
            });
        }
        check_balanced(pattern)?;
    } else if check_balanced(pattern).is_err() {
        return Ok(vec![pattern.to_owned()]);
    }

    let mut expanded = vec![String::new()];
    for segment in segments(pattern) {
        match segment {
            Segment::Literal(text) => {
                for prefix in &mut expanded {
                    prefix.push_str(text);
                }
            }
            Segment::Group(alternatives) => {
                expanded = expanded
                    .iter()
                    .flat_map(|prefix| {
                        alternatives
                            .iter()
                            .map(move |alt| format!("{prefix}{alt}"))
                    })
                    .collect();
            }
        }
    }

    for path in &mut expanded {
        rewrite_trailing_each(path);
    }
    Ok(expanded)
}

/// `a.@each` → `a.[]`.
fn rewrite_trailing_each(path: &mut String) {
    if path.ends_with(EACH_SUFFIX) {
        path.truncate(path.len() - EACH_SUFFIX.len());
        path.push_str(ARRAY_SUFFIX);
    }
}

fn check_balanced(pattern: &str) -> Result<(), ExpandError> {
    let unbalanced = |position| ExpandError::Unbalanced {
        pattern: pattern.to_owned(),
        position,
    };

    let mut open = false;
    for (idx, ch) in pattern.char_indices() {
        match ch {
            '{' if open => return Err(unbalanced(idx)),
            '{' => open = true,
            '}' if !open => return Err(unbalanced(idx)),
            '}' => open = false,
            _ => {}
        }
    }
    if open {
        return Err(unbalanced(pattern.len()));
    }
    Ok(())
}

/// Split a balanced pattern into literals and groups.
fn segments(pattern: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = pattern;
    while !rest.is_empty() {
        let Some(open) = rest.find('{') else {
            out.push(Segment::Literal(rest));
            break;
        };
        let Some(close) = rest[open..].find('}').map(|len| open + len) else {
            out.push(Segment::Literal(rest));
            break;
        };
        if open > 0 {
            out.push(Segment::Literal(&rest[..open]));
        }
        out.push(Segment::Group(rest[open + 1..close].split(',').collect()));
        rest = &rest[close + 1..];
    }
    out
}

/// The stock [`PropertyExpander`]: [`expand_properties`] with fixed options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BraceExpander {
    options: ExpandOptions,
}

impl BraceExpander {
    #[must_use]
    pub fn new(options: ExpandOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> ExpandOptions {
        self.options
    }
}

impl PropertyExpander for BraceExpander {
    fn expand_properties(&self, pattern: &str) -> Result<Vec<String>, ExpandError> {
        expand_properties(pattern, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict(pattern: &str) -> Vec<String> {
        expand_properties(pattern, &ExpandOptions::default()).unwrap()
    }

    #[test]
    fn plain_path_is_unchanged() {
        assert_eq!(strict("a.b.c"), vec!["a.b.c"]);
        assert_eq!(strict("first"), vec!["first"]);
    }

    #[test]
    fn empty_pattern_yields_single_empty_path() {
        assert_eq!(strict(""), vec![""]);
    }

    #[test]
    fn single_group() {
        assert_eq!(strict("a.{b,c}"), vec!["a.b", "a.c"]);
    }

    #[test]
    fn group_in_the_middle() {
        assert_eq!(strict("a.{b,c}.d"), vec!["a.b.d", "a.c.d"]);
    }

    #[test]
    fn leftmost_group_varies_slowest() {
        assert_eq!(
            strict("a.{b,c}.{d,e}"),
            vec!["a.b.d", "a.b.e", "a.c.d", "a.c.e"]
        );
    }

    #[test]
    fn leading_group() {
        assert_eq!(strict("{foo,bar}.baz"), vec!["foo.baz", "bar.baz"]);
    }

    #[test]
    fn empty_alternatives_are_kept() {
        assert_eq!(strict("a.{b,}"), vec!["a.b", "a."]);
        assert_eq!(strict("a.{}"), vec!["a."]);
    }

    #[test]
    fn trailing_each_becomes_array_marker() {
        assert_eq!(strict("todos.@each"), vec!["todos.[]"]);
        assert_eq!(strict("{a,b}.@each"), vec!["a.[]", "b.[]"]);
        assert_eq!(strict("a.@each.done"), vec!["a.@each.done"]);
    }

    #[test]
    fn each_with_group_suffix_distributes() {
        assert_eq!(
            strict("a.@each.{foo,bar}"),
            vec!["a.@each.foo", "a.@each.bar"]
        );
    }

    #[test]
    fn space_is_rejected_in_strict_mode() {
        let err = expand_properties("a. b", &ExpandOptions::strict()).unwrap_err();
        assert_eq!(
            err,
            ExpandError::ContainsSpace {
                pattern: "a. b".into()
            }
        );
    }

    #[test]
    fn nested_group_is_rejected() {
        let err = expand_properties("a.{b,{c,d}}", &ExpandOptions::strict()).unwrap_err();
        assert!(matches!(err, ExpandError::Unbalanced { position: 5, .. }));
    }

    #[test]
    fn unclosed_group_is_rejected() {
        let err = expand_properties("a.{b,c", &ExpandOptions::strict()).unwrap_err();
        assert!(matches!(err, ExpandError::Unbalanced { position: 6, .. }));
    }

    #[test]
    fn stray_close_is_rejected() {
        let err = expand_properties("a.b}", &ExpandOptions::strict()).unwrap_err();
        assert!(matches!(err, ExpandError::Unbalanced { position: 3, .. }));
    }

    #[test]
    fn lax_mode_passes_malformed_patterns_through() {
        let lax = ExpandOptions::lax();
        assert_eq!(expand_properties("a.{b", &lax).unwrap(), vec!["a.{b"]);
        assert_eq!(expand_properties("a.{b,{c}}", &lax).unwrap(), vec!["a.{b,{c}}"]);
    }

    #[test]
    fn lax_mode_still_expands_well_formed_groups() {
        let lax = ExpandOptions::lax();
        assert_eq!(
            expand_properties("a b.{c,d}", &lax).unwrap(),
            vec!["a b.c", "a b.d"]
        );
    }

    #[test]
    fn brace_expander_uses_its_options() {
        let expander = BraceExpander::new(ExpandOptions::lax());
        assert!(!expander.options().strict);
        assert_eq!(expander.expand_properties("x y").unwrap(), vec!["x y"]);

        let expander = BraceExpander::default();
        assert!(expander.expand_properties("x y").is_err());
    }

    #[test]
    fn options_builders() {
        assert_eq!(ExpandOptions::strict().with_strict(false), ExpandOptions::lax());
        assert!(ExpandOptions::default().strict);
    }

    #[test]
    fn segments_split_literals_and_groups() {
        assert_eq!(
            segments("a.{b,c}.d"),
            vec![
                Segment::Literal("a."),
                Segment::Group(vec!["b", "c"]),
                Segment::Literal(".d"),
            ]
        );
    }
}
