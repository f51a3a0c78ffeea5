#![no_main]

use arbitrary::Arbitrary;
use depkey_core::{BraceExpander, expand_dependent_keys};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Piece {
    Ident(u8),
    Dot,
    Each,
    Array,
    Group(Vec<u8>),
    Raw(u8),
}

impl Piece {
    fn push_to(&self, out: &mut String) {
        match self {
            Piece::Ident(b) => out.push((b'a' + b % 26) as char),
            Piece::Dot => out.push('.'),
            Piece::Each => out.push_str(".@each"),
            Piece::Array => out.push_str("[]"),
            Piece::Group(alts) => {
                out.push('{');
                let alts: Vec<String> = alts
                    .iter()
                    .take(4)
                    .map(|b| ((b'a' + b % 26) as char).to_string())
                    .collect();
                out.push_str(&alts.join(","));
                out.push('}');
            }
            Piece::Raw(b) => out.push((*b & 0x7f) as char),
        }
    }
}

fuzz_target!(|input: Vec<Vec<Piece>>| {
    let keys: Vec<String> = input
        .iter()
        .take(8)
        .map(|pieces| {
            let mut key = String::new();
            for piece in pieces.iter().take(16) {
                piece.push_to(&mut key);
            }
            key
        })
        .filter(|key| key.matches('{').count() <= 3)
        .collect();

    let whole = expand_dependent_keys(&BraceExpander::default(), &keys);
    let Ok(whole) = whole else {
        return;
    };
    // Expansion distributes over the key list.
    let mut pieces = Vec::new();
    for key in &keys {
        if let Ok(paths) = expand_dependent_keys(&BraceExpander::default(), [key.as_str()]) {
            pieces.extend(paths.iter().cloned());
        }
    }
    assert_eq!(whole.to_vec(), pieces);
});
