#![no_main]

use arbitrary::Arbitrary;
use depkey_core::Handler;
use depkey_runtime::Object;
use libfuzzer_sys::fuzz_target;
use serde_json::{Value, json};

const KEYS: [&str; 4] = ["a", "b", "list", "nested"];
const PATHS: [&str; 6] = ["a", "b", "list.0", "list.[]", "nested.x", "nested.@each.x"];

#[derive(Arbitrary, Debug)]
enum Op {
    Set { key: u8, value: i8 },
    SetPath { path: u8, value: i8 },
    Define { name: u8, deps: Vec<u8> },
    Get { name: u8 },
    Snapshot,
}

fn computed_name(n: u8) -> String {
    format!("c{}", n % 4)
}

fuzz_target!(|ops: Vec<Op>| {
    let Ok(obj) = Object::from_json(json!({
        "a": 0, "b": 0, "list": [0], "nested": { "x": 0 }
    })) else {
        return;
    };

    for op in ops.iter().take(64) {
        match op {
            Op::Set { key, value } => {
                let _ = obj.set(KEYS[*key as usize % KEYS.len()], i64::from(*value));
            }
            Op::SetPath { path, value } => {
                let _ = obj.set(PATHS[*path as usize % PATHS.len()], i64::from(*value));
            }
            Op::Define { name, deps } => {
                // Only depend on plain keys and earlier computed names, so no
                // getter reads itself.
                let own = name % 4;
                let deps: Vec<String> = deps
                    .iter()
                    .take(4)
                    .filter_map(|d| match d % 8 {
                        n @ 0..4 if n < own => Some(computed_name(n)),
                        n @ 4..8 => Some(PATHS[(n - 4) as usize].to_owned()),
                        _ => None,
                    })
                    .collect();
                let _ = obj.define_with(
                    &computed_name(own),
                    deps,
                    Handler::getter(|_: &Object, deps: &[Value]| Value::Array(deps.to_vec())),
                );
            }
            Op::Get { name } => {
                let _ = obj.get(&computed_name(*name));
            }
            Op::Snapshot => {
                let _ = obj.to_json();
            }
        }
    }

    // Every computed value is fresh after the op sequence.
    for n in 0..4 {
        let name = computed_name(n);
        if obj.is_computed(&name) {
            let first = obj.get(&name);
            assert_eq!(obj.is_dirty(&name), Some(false));
            assert_eq!(obj.get(&name), first);
        }
    }
});
