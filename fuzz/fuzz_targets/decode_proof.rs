#![no_main]

use libfuzzer_sys::fuzz_target;
use ctlog::ser::{decode_proof, encode_proof};

fuzz_target!(|data: &[u8]| {
    if let Ok(proof) = decode_proof(data) {
        // zone offset is not kept, so compare values rather than bytes
        let again = encode_proof(&proof).expect("decoded value re-encodes");
        assert_eq!(decode_proof(&again).ok(), Some(proof));
    }
});
