#![forbid(unsafe_code)]

//! Argument binding for user getters and setters.
//!
//! The host calls a bound getter with only the subject, and a bound setter
//! with the subject, the key being set, and the new value. The wrappers
//! resolve every expanded path against the subject, in order, and forward
//! the values to user code:
//!
//! | Host call                     | User call                         |
//! |-------------------------------|-----------------------------------|
//! | `getter(subject)`             | `f(subject, &[v1, .., vn])`       |
//! | `setter(subject, key, value)` | `f(subject, value, &[v1, .., vn])`|
//!
//! Whatever the user function returns is returned unchanged, so a
//! `Result`-returning function has its errors surface at the host's call
//! site untouched.

use std::rc::Rc;

use crate::expand::ExpandedPaths;
use crate::host::PropertyGet;

/// Getter as invoked by the host.
pub type BoundGetter<S, R> = Rc<dyn Fn(&S) -> R>;

/// Setter as invoked by the host: `(subject, key, new_value)`.
pub type BoundSetter<S, R> = Rc<dyn Fn(&S, &str, <S as PropertyGet>::Value) -> R>;

/// Read the current value of every path, in order.
pub fn resolve_values<S>(subject: &S, paths: &[String]) -> Vec<S::Value>
where
    S: PropertyGet + ?Sized,
{
    paths.iter().map(|path| subject.get_property(path)).collect()
}

/// Wrap a user getter so it receives the dependent values.
pub fn bind_get<S, R, F>(paths: ExpandedPaths, user: F) -> BoundGetter<S, R>
where
    S: PropertyGet + 'static,
    R: 'static,
    F: Fn(&S, &[S::Value]) -> R + 'static,
{
    Rc::new(move |subject: &S| {
        #[cfg(feature = "tracing")]
        tracing::trace!(message = "computed.get", dependencies = paths.len());

        let values = resolve_values(subject, &paths);
        user(subject, &values)
    })
}

/// Wrap a user setter so it receives the new value followed by the
/// dependent values. The key is not forwarded.
pub fn bind_set<S, R, F>(paths: ExpandedPaths, user: F) -> BoundSetter<S, R>
where
    S: PropertyGet + 'static,
    R: 'static,
    F: Fn(&S, S::Value, &[S::Value]) -> R + 'static,
{
    Rc::new(move |subject: &S, _key: &str, value: S::Value| {
        #[cfg(feature = "tracing")]
        tracing::trace!(message = "computed.set", key = _key, dependencies = paths.len());

        let values = resolve_values(subject, &paths);
        user(subject, value, &values)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    /// Subject backed by a flat map, recording every read.
    struct Record {
        fields: HashMap<&'static str, i64>,
        reads: RefCell<Vec<String>>,
    }

    impl Record {
        fn new(fields: &[(&'static str, i64)]) -> Self {
            Self {
                fields: fields.iter().copied().collect(),
                reads: RefCell::new(Vec::new()),
            }
        }
    }

    impl PropertyGet for Record {
        type Value = Option<i64>;

        fn get_property(&self, path: &str) -> Option<i64> {
            self.reads.borrow_mut().push(path.to_owned());
            self.fields.get(path).copied()
        }
    }

    fn paths(list: &[&str]) -> ExpandedPaths {
        ExpandedPaths::from(list.iter().map(|p| (*p).to_owned()).collect::<Vec<_>>())
    }

    #[test]
    fn resolve_values_preserves_order() {
        let record = Record::new(&[("a", 1), ("b", 2)]);
        let values = resolve_values(&record, &paths(&["b", "missing", "a"]));
        assert_eq!(values, vec![Some(2), None, Some(1)]);
    }

    #[test]
    fn getter_receives_values_in_path_order() {
        let record = Record::new(&[("first", 1), ("last", 2)]);
        let getter = bind_get(
            paths(&["last", "first"]),
            |_: &Record, deps: &[Option<i64>]| deps.to_vec(),
        );
        assert_eq!(getter(&record), vec![Some(2), Some(1)]);
        assert_eq!(*record.reads.borrow(), vec!["last", "first"]);
    }

    #[test]
    fn getter_without_dependencies_reads_nothing() {
        let record = Record::new(&[("a", 1)]);
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let getter = bind_get(paths(&[]), move |_: &Record, deps: &[Option<i64>]| {
            counter.set(counter.get() + 1);
            deps.len()
        });
        assert_eq!(getter(&record), 0);
        assert_eq!(calls.get(), 1);
        assert!(record.reads.borrow().is_empty());
    }

    #[test]
    fn getter_sees_the_subject() {
        let record = Record::new(&[("a", 5)]);
        let getter = bind_get(paths(&["a"]), |subject: &Record, deps: &[Option<i64>]| {
            subject.fields.len() as i64 + deps[0].unwrap_or_default()
        });
        assert_eq!(getter(&record), 6);
    }

    #[test]
    fn setter_receives_new_value_first() {
        let record = Record::new(&[("first", 1), ("last", 2)]);
        let setter = bind_set(
            paths(&["first", "last"]),
            |_: &Record, value: Option<i64>, deps: &[Option<i64>]| {
                let mut args = vec![value];
                args.extend_from_slice(deps);
                args
            },
        );
        assert_eq!(
            setter(&record, "name", Some(9)),
            vec![Some(9), Some(1), Some(2)]
        );
    }

    #[test]
    fn setter_and_getter_share_dependent_values() {
        let record = Record::new(&[("x", 3), ("y", 4)]);
        let list = paths(&["x", "y"]);
        let getter = bind_get(list.clone(), |_: &Record, deps: &[Option<i64>]| deps.to_vec());
        let setter = bind_set(list, |_: &Record, _: Option<i64>, deps: &[Option<i64>]| {
            deps.to_vec()
        });
        assert_eq!(getter(&record), setter(&record, "k", None));
    }

    #[test]
    fn user_errors_pass_through_unchanged() {
        #[derive(Debug, PartialEq)]
        struct Boom(&'static str);

        let record = Record::new(&[]);
        let getter = bind_get(paths(&["a"]), |_: &Record, _: &[Option<i64>]| {
            Err::<i64, _>(Boom("getter"))
        });
        assert_eq!(getter(&record), Err(Boom("getter")));

        let setter = bind_set(paths(&[]), |_: &Record, _: Option<i64>, _: &[Option<i64>]| {
            Err::<i64, _>(Boom("setter"))
        });
        assert_eq!(setter(&record, "k", Some(1)), Err(Boom("setter")));
    }

    #[test]
    fn each_invocation_reads_live_values() {
        let record = RefCell::new(Record::new(&[("n", 1)]));
        let getter = bind_get(paths(&["n"]), |_: &Record, deps: &[Option<i64>]| deps[0]);
        assert_eq!(getter(&record.borrow()), Some(1));
        record.borrow_mut().fields.insert("n", 2);
        assert_eq!(getter(&record.borrow()), Some(2));
    }
}
