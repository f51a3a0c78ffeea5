#![no_main]

use depkey_core::{ExpandOptions, expand_properties};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(pattern) = std::str::from_utf8(data) else {
        return;
    };
    // Brace groups multiply; keep the product small.
    if pattern.len() > 256 || pattern.matches('{').count() > 4 || pattern.matches(',').count() > 12 {
        return;
    }
    let strict = expand_properties(pattern, &ExpandOptions::strict());
    let lax = expand_properties(pattern, &ExpandOptions::lax());
    assert!(lax.is_ok());
    if let Ok(paths) = strict {
        assert!(!paths.is_empty());
        assert_eq!(Ok(paths), lax);
    }
});
