#![forbid(unsafe_code)]

//! Dotted-path traversal over JSON values.
//!
//! Segments address object keys or array indices. The `[]` segment on an
//! array yields the array itself, so `models.[]` reads the same value as
//! `models`.

use serde_json::Value;

const ARRAY_SEGMENT: &str = "[]";
const EACH_SEGMENT: &str = "@each";

/// `"a.b.c"` → `("a", Some("b.c"))`.
pub(crate) fn split_head(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}

/// Resolve `rest` below `value`. `None` for `rest` is the value itself.
pub(crate) fn lookup<'a>(value: &'a Value, rest: Option<&str>) -> Option<&'a Value> {
    let Some(rest) = rest else {
        return Some(value);
    };
    rest.split('.').try_fold(value, step)
}

fn step<'a>(current: &'a Value, segment: &str) -> Option<&'a Value> {
    match current {
        Value::Array(_) if segment == ARRAY_SEGMENT => Some(current),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|idx| items.get(idx)),
        Value::Object(map) => map.get(segment),
        _ => None,
    }
}

fn step_mut<'a>(current: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    if segment == ARRAY_SEGMENT && current.is_array() {
        return Some(current);
    }
    match current {
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(move |idx| items.get_mut(idx)),
        Value::Object(map) => map.get_mut(segment),
        _ => None,
    }
}

/// Write `new` at `rest` below `root`.
///
/// The parent container must exist. Object parents gain or replace the key;
/// array parents accept an existing index or exactly `len` (append).
/// Returns `false` when nothing was written.
pub(crate) fn assign(root: &mut Value, rest: &str, new: Value) -> bool {
    let (parent, last) = match rest.rsplit_once('.') {
        Some((parent, last)) => (Some(parent), last),
        None => (None, rest),
    };
    let target = match parent {
        Some(parent) => parent.split('.').try_fold(root, step_mut),
        None => Some(root),
    };
    match target {
        Some(Value::Object(map)) => {
            map.insert(last.to_owned(), new);
            true
        }
        Some(Value::Array(items)) => match last.parse::<usize>() {
            Ok(idx) if idx < items.len() => {
                items[idx] = new;
                true
            }
            Ok(idx) if idx == items.len() => {
                items.push(new);
                true
            }
            _ => false,
        },
        _ => false,
    }
}

/// Whether a change at one path can affect a value read at the other:
/// one is a segment prefix of the other. `[]` and `@each` segments are
/// ignored.
pub(crate) fn overlaps(a: &str, b: &str) -> bool {
    let significant = |segment: &&str| *segment != ARRAY_SEGMENT && *segment != EACH_SEGMENT;
    let mut left = a.split('.').filter(significant);
    let mut right = b.split('.').filter(significant);
    loop {
        match (left.next(), right.next()) {
            (Some(x), Some(y)) if x == y => {}
            (Some(_), Some(_)) => return false,
            _ => return true,
        }
    }
}

/// Short JSON type name for diagnostics.
pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
