#![no_main]

use ctlog::{Adjudicator, PayloadCipher};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // arbitrary claims against a fixed authority must never be granted
    let adj = Adjudicator::new([3u8; 32], PayloadCipher::new(&[4u8; 32]));
    let third = data.len() / 3;
    let (a, rest) = data.split_at(third);
    let (b, sig) = rest.split_at(third);
    assert!(!adj.claim_public(a, b, sig).granted);
});
