#![no_main]

use libfuzzer_sys::fuzz_target;
use ctlog::ser::{decode_sot, encode_sot};

fuzz_target!(|data: &[u8]| {
    if let Ok(sot) = decode_sot(data) {
        // zone offset is not kept, so compare values rather than bytes
        let again = encode_sot(&sot).expect("decoded value re-encodes");
        assert_eq!(decode_sot(&again).ok(), Some(sot));
    }
});
