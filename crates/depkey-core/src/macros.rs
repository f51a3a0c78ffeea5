#![forbid(unsafe_code)]

/// Build a [`ComputedDescriptor`](crate::ComputedDescriptor) from dependent
/// keys and a handler, in call order.
///
/// - `computed!("a", "b" => getter)` wraps `getter` in [`Handler::getter`](crate::Handler::getter).
/// - `computed!("a", "b"; handler)` takes a ready [`Handler`](crate::Handler).
///
/// Keys are expanded with the default strict brace expander. Evaluates to
/// `depkey_core::Result<ComputedDescriptor<_, _>>`.
///
/// ```
/// use depkey_core::{PropertyGet, computed};
///
/// struct Person;
///
/// impl PropertyGet for Person {
///     type Value = &'static str;
///     fn get_property(&self, path: &str) -> &'static str {
///         match path {
///             "first" => "rob",
///             "last" => "jackson",
///             _ => "",
///         }
///     }
/// }
///
/// let name = computed!("first", "last" => |_: &Person, deps: &[&'static str]| deps.join(" ")).unwrap();
/// assert_eq!(name.get(&Person).as_deref(), Some("rob jackson"));
/// ```
#[macro_export]
macro_rules! computed {
    ($($key:expr),* => $getter:expr $(,)?) => {
        $crate::descriptor::computed(
            {
                let keys: ::std::vec::Vec<::std::string::String> =
                    ::std::vec![$(::std::string::String::from($key)),*];
                keys
            },
            $crate::descriptor::Handler::getter($getter),
        )
    };
    ($($key:expr),* ; $handler:expr $(,)?) => {
        $crate::descriptor::computed(
            {
                let keys: ::std::vec::Vec<::std::string::String> =
                    ::std::vec![$(::std::string::String::from($key)),*];
                keys
            },
            $handler,
        )
    };
}

#[cfg(test)]
mod tests {
    use crate::descriptor::Handler;
    use crate::host::PropertyGet;

    struct Counter(i32);

    impl PropertyGet for Counter {
        type Value = i32;

        fn get_property(&self, path: &str) -> i32 {
            self.0 * path.len() as i32
        }
    }

    #[test]
    fn getter_arm() {
        let desc = computed!("a", "bb" => |_: &Counter, deps: &[i32]| deps.iter().sum::<i32>()).unwrap();
        assert_eq!(desc.get(&Counter(2)), Some(6));
        assert_eq!(desc.dependent_keys(), ["a", "bb"]);
    }

    #[test]
    fn getter_arm_without_keys() {
        let desc = computed!(=> |_: &Counter, deps: &[i32]| deps.len()).unwrap();
        assert_eq!(desc.get(&Counter(1)), Some(0));
        assert!(desc.expanded_paths().is_empty());
    }

    #[test]
    fn handler_arm() {
        let handler = Handler::get_set()
            .with_get(|c: &Counter, _: &[i32]| c.0)
            .with_set(|_: &Counter, v: i32, deps: &[i32]| v + deps[0]);
        let desc = computed!("abc"; handler).unwrap();
        assert_eq!(desc.get(&Counter(4)), Some(4));
        assert_eq!(desc.set(&Counter(4), "k", 1), Some(13));
    }

    #[test]
    fn accepts_owned_keys_and_trailing_comma() {
        let key = String::from("x.{y,z}");
        let desc = computed!(key => |_: &Counter, deps: &[i32]| deps.to_vec(),).unwrap();
        assert_eq!(desc.expanded_paths().as_slice(), ["x.y", "x.z"]);
    }
}
